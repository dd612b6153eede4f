use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewShift, Shift};

#[async_trait]
pub trait ShiftStore: Send + Sync {
    async fn insert(&self, shift: NewShift) -> anyhow::Result<Shift>;
    /// Shifts where the account is primary or secondary assignee, earliest first.
    async fn list_for_account(&self, account_id: Uuid) -> anyhow::Result<Vec<Shift>>;
}

#[derive(Clone)]
pub struct PgShiftStore {
    db: PgPool,
}

impl PgShiftStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ShiftStore for PgShiftStore {
    async fn insert(&self, shift: NewShift) -> anyhow::Result<Shift> {
        let row = sqlx::query_as::<_, Shift>(
            r#"
            INSERT INTO shifts (starts_at, primary_id, secondary_id)
            VALUES ($1, $2, $3)
            RETURNING id, starts_at, primary_id, secondary_id
            "#,
        )
        .bind(shift.starts_at)
        .bind(shift.primary_id)
        .bind(shift.secondary_id)
        .fetch_one(&self.db)
        .await
        .context("insert shift")?;
        Ok(row)
    }

    async fn list_for_account(&self, account_id: Uuid) -> anyhow::Result<Vec<Shift>> {
        let rows = sqlx::query_as::<_, Shift>(
            r#"
            SELECT id, starts_at, primary_id, secondary_id
              FROM shifts
             WHERE primary_id = $1 OR secondary_id = $1
             ORDER BY starts_at ASC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await
        .context("list shifts for account")?;
        Ok(rows)
    }
}
