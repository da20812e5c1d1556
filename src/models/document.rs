use chrono::{DateTime, Utc};

use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentCategory {
    Contract,
    Invoice,
    Manual,
    Evidence,
    Other,
}

text_enum!(DocumentCategory, "document category", {
    Contract => "contract",
    Invoice => "invoice",
    Manual => "manual",
    Evidence => "evidence",
    Other => "other",
});

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Document {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub category: DocumentCategory,
    /// Public URL handed back by the blob store
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}
