use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct AuditLogEntry {
    pub id: i32,
    pub user_id: Option<i32>,
    pub action: String,
    pub entity: String,
    pub entity_id: i32,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}
