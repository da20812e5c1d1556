use anyhow::Result;

use super::Database;
use crate::models::{AuditLogEntry, Notification};

impl Database {
    pub async fn insert_audit_entry(
        &self,
        user_id: Option<i32>,
        action: &str,
        entity: &str,
        entity_id: i32,
        details: Option<&str>,
    ) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO audit_log (user_id, action, entity, entity_id, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(entity)
        .bind(entity_id)
        .bind(details)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    pub async fn get_audit_log(&self, entity: Option<&str>, limit: i64) -> Result<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT * FROM audit_log
            WHERE ($1::text IS NULL OR entity = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(entity)
        .bind(limit)
        .fetch_all(self.get_pool())
        .await?;

        Ok(entries)
    }

    pub async fn insert_notification(&self, user_id: Option<i32>, title: &str, message: &str) -> Result<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO notifications (user_id, title, message)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    /// Notifications addressed to `user_id` plus broadcasts, newest first
    pub async fn get_notifications(&self, user_id: Option<i32>, unread_only: bool) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE (user_id IS NULL OR user_id = $1)
              AND (NOT $2 OR read = FALSE)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(self.get_pool())
        .await?;

        Ok(notifications)
    }

    pub async fn mark_notification_read(&self, id: i32) -> Result<()> {
        sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }
}
