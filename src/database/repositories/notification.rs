use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::Notifier;
use crate::database::{models::NewNotification, utils::sql};
use crate::error::AppError;

/// Stores notifications for the notification service to deliver.
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Notifier for PgNotificationRepository {
    async fn notify(&self, notification: &NewNotification) -> Result<(), AppError> {
        sqlx::query(&sql(r#"
            INSERT INTO
                notifications (
                    id,
                    user_id,
                    kind,
                    related_entry_id,
                    title,
                    message,
                    is_read,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, FALSE, ?)
        "#))
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(notification.kind)
        .bind(notification.related_entry_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
