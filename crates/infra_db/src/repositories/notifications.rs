//! Notification store
//!
//! One row per addressed message. Rows are written before any delivery
//! attempt and updated as the dispatcher walks the lifecycle, so the
//! table is the durable record of what was promised to whom.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{DocumentRequestId, DomainPort, EmployeeId, NotificationId, PortError};
use domain_notifications::{DeliveryState, InboxFilter, Notification, NotificationStore};

use crate::error::DatabaseError;
use crate::legacy;
use crate::pool::DatabasePool;

const SELECT_NOTIFICATION: &str = r#"
    SELECT id, recipient_id, category, subject, body, state, sent_at,
           read_at, related_request, retry_count
    FROM notifications
"#;

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient_id: Uuid,
    category: String,
    subject: String,
    body: String,
    state: String,
    sent_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
    related_request: Option<Uuid>,
    retry_count: i32,
}

impl NotificationRow {
    fn into_domain(self) -> Result<Notification, DatabaseError> {
        Ok(Notification {
            id: NotificationId::from(self.id),
            recipient_id: EmployeeId::from(self.recipient_id),
            category: legacy::decode_category(&self.category)?,
            subject: self.subject,
            body: self.body,
            state: legacy::decode_delivery_state(&self.state)?,
            sent_at: self.sent_at,
            read_at: self.read_at,
            related_request: self.related_request.map(DocumentRequestId::from),
            retry_count: self.retry_count as u32,
        })
    }
}

async fn insert_notification<'e>(
    executor: impl PgExecutor<'e>,
    notification: &Notification,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO notifications (
            id, recipient_id, category, subject, body, state, sent_at,
            read_at, related_request, retry_count
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(Uuid::from(notification.id))
    .bind(Uuid::from(notification.recipient_id))
    .bind(notification.category.as_str())
    .bind(&notification.subject)
    .bind(&notification.body)
    .bind(notification.state.as_str())
    .bind(notification.sent_at)
    .bind(notification.read_at)
    .bind(notification.related_request.map(Uuid::from))
    .bind(notification.retry_count as i32)
    .execute(executor)
    .await?;

    Ok(())
}

/// PostgreSQL-backed implementation of [`NotificationStore`]
#[derive(Debug, Clone)]
pub struct PostgresNotificationStore {
    pool: DatabasePool,
}

impl PostgresNotificationStore {
    /// Creates a new store over the given connection pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn read_tokens() -> Vec<String> {
        legacy::delivery_tokens(DeliveryState::Read)
            .into_iter()
            .map(String::from)
            .collect()
    }
}

impl DomainPort for PostgresNotificationStore {}

#[async_trait]
impl NotificationStore for PostgresNotificationStore {
    #[instrument(skip_all, fields(notification = %notification.id))]
    async fn create(&self, notification: &Notification) -> Result<(), PortError> {
        Ok(insert_notification(&self.pool, notification).await?)
    }

    #[instrument(skip_all, fields(notification = %notification.id, state = %notification.state))]
    async fn update(&self, notification: &Notification) -> Result<(), PortError> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET body = $1, state = $2, sent_at = $3, read_at = $4, retry_count = $5
            WHERE id = $6
            "#,
        )
        .bind(&notification.body)
        .bind(notification.state.as_str())
        .bind(notification.sent_at)
        .bind(notification.read_at)
        .bind(notification.retry_count as i32)
        .bind(Uuid::from(notification.id))
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("notification", notification.id).into());
        }
        Ok(())
    }

    async fn get(&self, id: NotificationId) -> Result<Notification, PortError> {
        let sql = format!("{SELECT_NOTIFICATION} WHERE id = $1");
        let row = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::not_found("notification", id))?;

        Ok(row.into_domain()?)
    }

    #[instrument(skip(self, filter), fields(recipient = %recipient))]
    async fn list_by_recipient(
        &self,
        recipient: EmployeeId,
        filter: InboxFilter,
    ) -> Result<Vec<Notification>, PortError> {
        // An empty exclusion list matches nothing, so the same statement
        // serves both the full inbox and the unread view. LIMIT NULL means
        // no limit in Postgres.
        let excluded = if filter.unread_only {
            Self::read_tokens()
        } else {
            Vec::new()
        };
        let sql = format!(
            "{SELECT_NOTIFICATION} WHERE recipient_id = $1 AND NOT (state = ANY($2)) \
             ORDER BY sent_at DESC, id DESC LIMIT $3 OFFSET $4"
        );

        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(Uuid::from(recipient))
            .bind(excluded)
            .bind(filter.limit.map(i64::from))
            .bind(i64::from(filter.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let notifications = rows
            .into_iter()
            .map(NotificationRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notifications)
    }

    async fn unread_count(&self, recipient: EmployeeId) -> Result<u64, PortError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND NOT (state = ANY($2))",
        )
        .bind(Uuid::from(recipient))
        .bind(Self::read_tokens())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(count as u64)
    }
}
