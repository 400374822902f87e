use super::ProductId;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The public part of a reviewer's account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentUser {
    pub id: u64,
    #[serde(default)]
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product review together with its author.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithUser {
    pub id: u64,
    /// Star rating, 1 to 5.
    pub scoring: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product_id: ProductId,
    pub user: CommentUser,
}

impl CommentWithUser {
    pub fn author_name(&self) -> &str {
        self.user.full_name.as_deref().unwrap_or("Anonymous")
    }
}
