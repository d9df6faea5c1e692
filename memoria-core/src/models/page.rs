use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Allowed page sizes for listing facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    One,
    #[default]
    Ten,
    Hundred,
    Thousand,
}

impl PageSize {
    pub const CHOICES: [u32; 4] = [1, 10, 100, 1000];

    pub fn get(self) -> u32 {
        match self {
            PageSize::One => 1,
            PageSize::Ten => 10,
            PageSize::Hundred => 100,
            PageSize::Thousand => 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPageSize(pub u32);

impl fmt::Display for InvalidPageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is not a valid choice, expected one of {:?}",
            self.0,
            PageSize::CHOICES
        )
    }
}

impl std::error::Error for InvalidPageSize {}

impl TryFrom<u32> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PageSize::One),
            10 => Ok(PageSize::Ten),
            100 => Ok(PageSize::Hundred),
            1000 => Ok(PageSize::Thousand),
            other => Err(InvalidPageSize(other)),
        }
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    /// 1-based page number that was requested.
    pub page: u32,
    pub pages: u64,
    /// One of 1, 10, 100 or 1000.
    pub per_page: u32,
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(page: u32, per_page: PageSize, total: u64, items: Vec<T>) -> Self {
        Self {
            page,
            pages: page_count(total, per_page),
            per_page: per_page.get(),
            total,
            items,
        }
    }
}

/// Number of pages needed for `total` items; zero for an empty collection.
pub fn page_count(total: u64, per_page: PageSize) -> u64 {
    total.div_ceil(u64::from(per_page.get()))
}

/// Zero-based offset of the first item on `page`.
pub fn page_offset(page: u32, per_page: PageSize) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(per_page.get())
}
