//! Employee directory lookups
//!
//! Read-only resolution of notification recipients from the employees
//! table. Role-scoped listings only return active employees; a departed
//! reviewer should not receive escalation mail.

use async_trait::async_trait;
use sqlx::PgExecutor;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::{DomainPort, EmployeeId, PortError};
use domain_incapacity::Role;
use domain_notifications::{Recipient, RecipientDirectory};

use crate::error::DatabaseError;
use crate::legacy;
use crate::pool::DatabasePool;

#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: Uuid,
    display_name: String,
    email: Option<String>,
}

impl EmployeeRow {
    fn into_recipient(self) -> Recipient {
        Recipient::new(EmployeeId::from(self.id), self.display_name, self.email)
    }
}

async fn list_by_role<'e>(
    executor: impl PgExecutor<'e>,
    role: Role,
) -> Result<Vec<Recipient>, DatabaseError> {
    let tokens: Vec<String> = legacy::role_tokens(role)
        .into_iter()
        .map(String::from)
        .collect();

    let rows = sqlx::query_as::<_, EmployeeRow>(
        r#"
        SELECT id, display_name, email
        FROM employees
        WHERE role = ANY($1) AND active
        ORDER BY display_name
        "#,
    )
    .bind(tokens)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(EmployeeRow::into_recipient).collect())
}

/// PostgreSQL-backed implementation of [`RecipientDirectory`]
#[derive(Debug, Clone)]
pub struct PostgresRecipientDirectory {
    pool: DatabasePool,
}

impl PostgresRecipientDirectory {
    /// Creates a new directory over the given connection pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresRecipientDirectory {}

#[async_trait]
impl RecipientDirectory for PostgresRecipientDirectory {
    #[instrument(skip(self), fields(employee = %id))]
    async fn find(&self, id: EmployeeId) -> Result<Recipient, PortError> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            "SELECT id, display_name, email FROM employees WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(|| DatabaseError::not_found("employee", id))?;

        Ok(row.into_recipient())
    }

    async fn reviewers(&self) -> Result<Vec<Recipient>, PortError> {
        Ok(list_by_role(&self.pool, Role::Reviewer).await?)
    }

    async fn administrators(&self) -> Result<Vec<Recipient>, PortError> {
        Ok(list_by_role(&self.pool, Role::Administrator).await?)
    }
}
