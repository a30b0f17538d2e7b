//! Incapacity claim repository
//!
//! Persists claims, their append-only audit trail, and attached documents.
//! Claim row updates are optimistic: the `UPDATE` is conditional on the
//! version the claim was loaded with, and a missed update distinguishes a
//! concurrent writer from a missing row before reporting either.
//!
//! The row-level helpers are `pub(crate)` so the document request
//! repository can commit claim changes inside its own transactions.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgExecutor};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{DocumentId, DomainPort, EmployeeId, IncapacityId, PortError, TransitionId};
use domain_incapacity::{
    CompletenessReport, Document, Incapacity, IncapacityRepository, IncapacityState,
    StateTransitionRecord,
};

use crate::error::DatabaseError;
use crate::legacy;
use crate::pool::DatabasePool;

const SELECT_CLAIM: &str = r#"
    SELECT id, employee_id, leave_type, start_date, end_date, duration_days,
           state, rejection_reason, validation_complete, validation_missing,
           validation_evaluated_at, version, created_at, updated_at
    FROM incapacities
"#;

/// Raw claim row as stored
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct IncapacityRow {
    id: Uuid,
    employee_id: Uuid,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    duration_days: i64,
    state: String,
    rejection_reason: Option<String>,
    validation_complete: Option<bool>,
    validation_missing: Option<Vec<String>>,
    validation_evaluated_at: Option<DateTime<Utc>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IncapacityRow {
    pub(crate) fn into_domain(self) -> Result<Incapacity, DatabaseError> {
        let validation_outcome = match (self.validation_complete, self.validation_evaluated_at) {
            (Some(complete), Some(evaluated_at)) => {
                let missing = self
                    .validation_missing
                    .unwrap_or_default()
                    .iter()
                    .map(|token| legacy::decode_document_kind(token))
                    .collect::<Result<Vec<_>, _>>()?;
                Some(CompletenessReport {
                    complete,
                    missing,
                    evaluated_at,
                })
            }
            _ => None,
        };

        Ok(Incapacity {
            id: IncapacityId::from(self.id),
            employee_id: EmployeeId::from(self.employee_id),
            leave_type: legacy::decode_leave_type(&self.leave_type)?,
            start_date: self.start_date,
            end_date: self.end_date,
            duration_days: self.duration_days,
            state: legacy::decode_state(&self.state)?,
            rejection_reason: self.rejection_reason,
            validation_outcome,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransitionRow {
    id: Uuid,
    incapacity_id: Uuid,
    previous_state: Option<String>,
    new_state: String,
    actor: Uuid,
    note: Option<String>,
    supporting_document: Option<Uuid>,
    recorded_at: DateTime<Utc>,
}

impl TransitionRow {
    fn into_domain(self) -> Result<StateTransitionRecord, DatabaseError> {
        Ok(StateTransitionRecord {
            id: TransitionId::from(self.id),
            incapacity_id: IncapacityId::from(self.incapacity_id),
            previous_state: self
                .previous_state
                .as_deref()
                .map(legacy::decode_state)
                .transpose()?,
            new_state: legacy::decode_state(&self.new_state)?,
            actor: EmployeeId::from(self.actor),
            note: self.note,
            supporting_document: self.supporting_document.map(DocumentId::from),
            recorded_at: self.recorded_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    incapacity_id: Uuid,
    kind: String,
    file_name: String,
    size_bytes: i64,
    uploaded_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_domain(self) -> Result<Document, DatabaseError> {
        Ok(Document {
            id: DocumentId::from(self.id),
            incapacity_id: IncapacityId::from(self.incapacity_id),
            kind: legacy::decode_document_kind(&self.kind)?,
            file_name: self.file_name,
            size_bytes: self.size_bytes as u64,
            uploaded_at: self.uploaded_at,
        })
    }
}

fn validation_columns(
    outcome: &Option<CompletenessReport>,
) -> (Option<bool>, Option<Vec<String>>, Option<DateTime<Utc>>) {
    match outcome {
        Some(report) => (
            Some(report.complete),
            Some(
                report
                    .missing
                    .iter()
                    .map(|kind| kind.as_str().to_string())
                    .collect(),
            ),
            Some(report.evaluated_at),
        ),
        None => (None, None, None),
    }
}

pub(crate) async fn insert_claim<'e>(
    executor: impl PgExecutor<'e>,
    claim: &Incapacity,
) -> Result<(), DatabaseError> {
    let (complete, missing, evaluated_at) = validation_columns(&claim.validation_outcome);

    sqlx::query(
        r#"
        INSERT INTO incapacities (
            id, employee_id, leave_type, start_date, end_date, duration_days,
            state, rejection_reason, validation_complete, validation_missing,
            validation_evaluated_at, version, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(Uuid::from(claim.id))
    .bind(Uuid::from(claim.employee_id))
    .bind(claim.leave_type.as_str())
    .bind(claim.start_date)
    .bind(claim.end_date)
    .bind(claim.duration_days)
    .bind(claim.state.as_str())
    .bind(&claim.rejection_reason)
    .bind(complete)
    .bind(missing)
    .bind(evaluated_at)
    .bind(claim.version)
    .bind(claim.created_at)
    .bind(claim.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Writes the mutable claim columns, conditional on the loaded version
///
/// Zero affected rows means either a concurrent writer got there first or
/// the row does not exist; an existence probe decides which error to raise.
pub(crate) async fn update_claim_checked(
    conn: &mut PgConnection,
    claim: &Incapacity,
) -> Result<(), DatabaseError> {
    let (complete, missing, evaluated_at) = validation_columns(&claim.validation_outcome);

    let result = sqlx::query(
        r#"
        UPDATE incapacities
        SET state = $1,
            rejection_reason = $2,
            validation_complete = $3,
            validation_missing = $4,
            validation_evaluated_at = $5,
            updated_at = $6,
            version = version + 1
        WHERE id = $7 AND version = $8
        "#,
    )
    .bind(claim.state.as_str())
    .bind(&claim.rejection_reason)
    .bind(complete)
    .bind(missing)
    .bind(evaluated_at)
    .bind(claim.updated_at)
    .bind(Uuid::from(claim.id))
    .bind(claim.version)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM incapacities WHERE id = $1)")
                .bind(Uuid::from(claim.id))
                .fetch_one(&mut *conn)
                .await?;
        if exists {
            return Err(DatabaseError::version_conflict(
                "incapacity",
                claim.id,
                claim.version,
            ));
        }
        return Err(DatabaseError::not_found("incapacity", claim.id));
    }

    Ok(())
}

pub(crate) async fn insert_transition<'e>(
    executor: impl PgExecutor<'e>,
    record: &StateTransitionRecord,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO incapacity_transitions (
            id, incapacity_id, previous_state, new_state, actor, note,
            supporting_document, recorded_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(Uuid::from(record.id))
    .bind(Uuid::from(record.incapacity_id))
    .bind(record.previous_state.map(|state| state.as_str()))
    .bind(record.new_state.as_str())
    .bind(Uuid::from(record.actor))
    .bind(&record.note)
    .bind(record.supporting_document.map(Uuid::from))
    .bind(record.recorded_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub(crate) async fn insert_document<'e>(
    executor: impl PgExecutor<'e>,
    document: &Document,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO documents (id, incapacity_id, kind, file_name, size_bytes, uploaded_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::from(document.id))
    .bind(Uuid::from(document.incapacity_id))
    .bind(document.kind.as_str())
    .bind(&document.file_name)
    .bind(document.size_bytes as i64)
    .bind(document.uploaded_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// PostgreSQL-backed implementation of [`IncapacityRepository`]
#[derive(Debug, Clone)]
pub struct PostgresIncapacityRepository {
    pool: DatabasePool,
}

impl PostgresIncapacityRepository {
    /// Creates a new repository over the given connection pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: IncapacityId) -> Result<Incapacity, DatabaseError> {
        let sql = format!("{SELECT_CLAIM} WHERE id = $1");
        let row = sqlx::query_as::<_, IncapacityRow>(&sql)
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("incapacity", id))?;

        row.into_domain()
    }

    async fn insert_full(
        &self,
        claim: &Incapacity,
        record: &StateTransitionRecord,
        documents: &[Document],
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        insert_claim(&mut *tx, claim).await?;
        insert_transition(&mut *tx, record).await?;
        for document in documents {
            insert_document(&mut *tx, document).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn save_checked(
        &self,
        claim: &Incapacity,
        record: Option<&StateTransitionRecord>,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        update_claim_checked(&mut tx, claim).await?;
        if let Some(record) = record {
            insert_transition(&mut *tx, record).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

impl DomainPort for PostgresIncapacityRepository {}

#[async_trait]
impl IncapacityRepository for PostgresIncapacityRepository {
    #[instrument(skip_all, fields(claim = %claim.id))]
    async fn create(
        &self,
        claim: &Incapacity,
        record: &StateTransitionRecord,
        documents: &[Document],
    ) -> Result<(), PortError> {
        debug!(documents = documents.len(), "Inserting new claim");
        Ok(self.insert_full(claim, record, documents).await?)
    }

    #[instrument(skip(self), fields(claim = %id))]
    async fn get(&self, id: IncapacityId) -> Result<Incapacity, PortError> {
        Ok(self.fetch(id).await?)
    }

    async fn exists(&self, id: IncapacityId) -> Result<bool, PortError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM incapacities WHERE id = $1)")
                .bind(Uuid::from(id))
                .fetch_one(&self.pool)
                .await
                .map_err(DatabaseError::from)?;
        Ok(exists)
    }

    #[instrument(skip_all, fields(claim = %claim.id, state = %claim.state))]
    async fn save(
        &self,
        claim: &Incapacity,
        record: Option<&StateTransitionRecord>,
    ) -> Result<(), PortError> {
        debug!(version = claim.version, "Saving claim");
        Ok(self.save_checked(claim, record).await?)
    }

    #[instrument(skip(self), fields(state = %state))]
    async fn list_by_state(&self, state: IncapacityState) -> Result<Vec<Incapacity>, PortError> {
        let tokens: Vec<String> = legacy::state_tokens(state)
            .into_iter()
            .map(String::from)
            .collect();

        let sql = format!("{SELECT_CLAIM} WHERE state = ANY($1) ORDER BY created_at");
        let rows = sqlx::query_as::<_, IncapacityRow>(&sql)
            .bind(&tokens)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let claims = rows
            .into_iter()
            .map(IncapacityRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(claims)
    }

    #[instrument(skip(self), fields(claim = %id))]
    async fn history(&self, id: IncapacityId) -> Result<Vec<StateTransitionRecord>, PortError> {
        let rows = sqlx::query_as::<_, TransitionRow>(
            r#"
            SELECT id, incapacity_id, previous_state, new_state, actor, note,
                   supporting_document, recorded_at
            FROM incapacity_transitions
            WHERE incapacity_id = $1
            ORDER BY recorded_at DESC, id DESC
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let records = rows
            .into_iter()
            .map(TransitionRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    #[instrument(skip(self), fields(claim = %id))]
    async fn list_documents(&self, id: IncapacityId) -> Result<Vec<Document>, PortError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, incapacity_id, kind, file_name, size_bytes, uploaded_at
            FROM documents
            WHERE incapacity_id = $1
            ORDER BY uploaded_at
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let documents = rows
            .into_iter()
            .map(DocumentRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(documents)
    }
}
