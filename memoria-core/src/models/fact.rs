use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Current time at the precision PostgreSQL `TIMESTAMPTZ` stores (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A question/answer pair owned by someone, optionally labelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Fact {
    #[schema(read_only)]
    pub uuid: String,
    #[schema(read_only)]
    pub created_at: DateTime<Utc>,
    #[schema(read_only)]
    pub modified_at: DateTime<Utc>,
    pub owner: String,
    pub question: String,
    pub answer: String,
    pub labels: Vec<String>,
}

/// Client-supplied fact fields. `uuid` and timestamps are server-owned,
/// so any such keys in the request body are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FactPayload {
    pub owner: String,
    pub question: String,
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub labels: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Fact {
    /// Build a fact, generating a v4 uuid when none is given.
    pub fn new(
        owner: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        labels: Vec<String>,
        uuid: Option<String>,
    ) -> Self {
        let now = now();
        Self {
            uuid: uuid.unwrap_or_else(|| Uuid::new_v4().to_string()),
            created_at: now,
            modified_at: now,
            owner: owner.into(),
            question: question.into(),
            answer: answer.into(),
            labels,
        }
    }

    pub fn from_payload(payload: FactPayload) -> Self {
        Self::new(
            payload.owner,
            payload.question,
            payload.answer,
            payload.labels,
            None,
        )
    }

    /// Overwrite every mutable field from `payload` and refresh `modified_at`.
    pub fn apply(&mut self, payload: FactPayload) {
        self.owner = payload.owner;
        self.question = payload.question;
        self.answer = payload.answer;
        self.labels = payload.labels;
        self.touch();
    }

    /// Refresh `modified_at`, never moving it before `created_at`.
    pub fn touch(&mut self) {
        self.modified_at = now().max(self.created_at);
    }
}
