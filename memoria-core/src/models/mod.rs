pub mod fact;
pub mod page;

pub use fact::{Fact, FactPayload};
pub use page::{InvalidPageSize, Page, PageSize};
