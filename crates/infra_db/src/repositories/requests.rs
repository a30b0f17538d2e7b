//! Document request repository
//!
//! Request rows commit together with their claim-side effects: batch
//! creation, fulfillment, and escalation each run as one transaction so a
//! crash can never leave a request without its matching claim state or
//! audit record.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgExecutor;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{DocumentRequestId, DomainPort, IncapacityId, PortError};
use domain_incapacity::{Document, Incapacity, StateTransitionRecord};
use domain_requests::{DocumentRequest, DocumentRequestRepository, RequestStatus};

use crate::error::DatabaseError;
use crate::legacy;
use crate::pool::DatabasePool;
use crate::repositories::incapacities::{insert_document, insert_transition, update_claim_checked};

const SELECT_REQUEST: &str = r#"
    SELECT id, incapacity_id, kind, note, status, deadline, reminder_count,
           escalation_count, extension_granted, extension_justification,
           fulfilled_at, created_at, updated_at
    FROM document_requests
"#;

#[derive(Debug, sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    incapacity_id: Uuid,
    kind: String,
    note: Option<String>,
    status: String,
    deadline: NaiveDate,
    reminder_count: i32,
    escalation_count: i32,
    extension_granted: bool,
    extension_justification: Option<String>,
    fulfilled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RequestRow {
    fn into_domain(self) -> Result<DocumentRequest, DatabaseError> {
        Ok(DocumentRequest {
            id: DocumentRequestId::from(self.id),
            incapacity_id: IncapacityId::from(self.incapacity_id),
            kind: legacy::decode_document_kind(&self.kind)?,
            note: self.note,
            status: legacy::decode_request_status(&self.status)?,
            deadline: self.deadline,
            reminder_count: self.reminder_count as u32,
            escalation_count: self.escalation_count as u32,
            extension_granted: self.extension_granted,
            extension_justification: self.extension_justification,
            fulfilled_at: self.fulfilled_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

async fn insert_request<'e>(
    executor: impl PgExecutor<'e>,
    request: &DocumentRequest,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO document_requests (
            id, incapacity_id, kind, note, status, deadline, reminder_count,
            escalation_count, extension_granted, extension_justification,
            fulfilled_at, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(Uuid::from(request.id))
    .bind(Uuid::from(request.incapacity_id))
    .bind(request.kind.as_str())
    .bind(&request.note)
    .bind(request.status.as_str())
    .bind(request.deadline)
    .bind(request.reminder_count as i32)
    .bind(request.escalation_count as i32)
    .bind(request.extension_granted)
    .bind(&request.extension_justification)
    .bind(request.fulfilled_at)
    .bind(request.created_at)
    .bind(request.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

async fn update_request<'e>(
    executor: impl PgExecutor<'e>,
    request: &DocumentRequest,
) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        r#"
        UPDATE document_requests
        SET status = $1,
            deadline = $2,
            reminder_count = $3,
            escalation_count = $4,
            extension_granted = $5,
            extension_justification = $6,
            fulfilled_at = $7,
            updated_at = $8
        WHERE id = $9
        "#,
    )
    .bind(request.status.as_str())
    .bind(request.deadline)
    .bind(request.reminder_count as i32)
    .bind(request.escalation_count as i32)
    .bind(request.extension_granted)
    .bind(&request.extension_justification)
    .bind(request.fulfilled_at)
    .bind(request.updated_at)
    .bind(Uuid::from(request.id))
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("document request", request.id));
    }
    Ok(())
}

/// PostgreSQL-backed implementation of [`DocumentRequestRepository`]
#[derive(Debug, Clone)]
pub struct PostgresDocumentRequestRepository {
    pool: DatabasePool,
}

impl PostgresDocumentRequestRepository {
    /// Creates a new repository over the given connection pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn pending_tokens() -> Vec<String> {
        legacy::status_tokens(RequestStatus::Pending)
            .into_iter()
            .map(String::from)
            .collect()
    }
}

impl DomainPort for PostgresDocumentRequestRepository {}

#[async_trait]
impl DocumentRequestRepository for PostgresDocumentRequestRepository {
    #[instrument(skip_all, fields(claim = %claim.id, requests = requests.len()))]
    async fn create_batch(
        &self,
        requests: &[DocumentRequest],
        claim: &Incapacity,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError> {
        debug!("Committing request batch with claim transition");

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        for request in requests {
            insert_request(&mut *tx, request).await?;
        }
        update_claim_checked(&mut tx, claim).await?;
        insert_transition(&mut *tx, record).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    #[instrument(skip(self), fields(request = %id))]
    async fn get(&self, id: DocumentRequestId) -> Result<DocumentRequest, PortError> {
        let sql = format!("{SELECT_REQUEST} WHERE id = $1");
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::not_found("document request", id))?;

        Ok(row.into_domain()?)
    }

    async fn update(&self, request: &DocumentRequest) -> Result<(), PortError> {
        Ok(update_request(&self.pool, request).await?)
    }

    #[instrument(skip_all, fields(request = %request.id))]
    async fn update_with_audit(
        &self,
        request: &DocumentRequest,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        update_request(&mut *tx, request).await?;
        insert_transition(&mut *tx, record).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    #[instrument(skip_all, fields(request = %request.id, document = %document.id))]
    async fn fulfill(
        &self,
        request: &DocumentRequest,
        document: &Document,
    ) -> Result<(), PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        insert_document(&mut *tx, document).await?;
        update_request(&mut *tx, request).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    #[instrument(skip_all, fields(request = %request.id, claim = %claim.id))]
    async fn escalate(
        &self,
        request: &DocumentRequest,
        claim: &Incapacity,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError> {
        debug!("Committing escalation with claim rejection");

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;
        update_request(&mut *tx, request).await?;
        update_claim_checked(&mut tx, claim).await?;
        insert_transition(&mut *tx, record).await?;
        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    #[instrument(skip(self), fields(claim = %claim))]
    async fn list_pending_by_claim(
        &self,
        claim: IncapacityId,
    ) -> Result<Vec<DocumentRequest>, PortError> {
        let sql = format!(
            "{SELECT_REQUEST} WHERE incapacity_id = $1 AND status = ANY($2) ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(Uuid::from(claim))
            .bind(Self::pending_tokens())
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let requests = rows
            .into_iter()
            .map(RequestRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(requests)
    }

    #[instrument(skip(self), fields(today = %today))]
    async fn list_due(&self, today: NaiveDate) -> Result<Vec<DocumentRequest>, PortError> {
        let sql = format!(
            "{SELECT_REQUEST} WHERE deadline <= $1 AND status = ANY($2) ORDER BY deadline, created_at, id"
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(today)
            .bind(Self::pending_tokens())
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let requests = rows
            .into_iter()
            .map(RequestRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(requests)
    }
}
