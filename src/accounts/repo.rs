use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    dto::Flag,
    repo_types::{Account, AccountChanges, NewAccount},
};
use crate::error::StoreError;

/// Name of the unique index on `lower(email_address)`.
pub const EMAIL_UNIQUE_INDEX: &str = "users_email_address_lower_key";

const ACCOUNT_COLUMNS: &str = r#"id, first_name, last_name, email_address, password_hash,
    admin, "primary", created_at, updated_at"#;

/// Persistence for accounts. Implementations must reject a second email that differs only
/// in case, atomically with the write.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError>;
    async fn update(&self, id: Uuid, changes: AccountChanges) -> Result<Option<Account>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>>;
    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>>;
    /// Match on the case-folded email, the same key the unique index uses.
    async fn find_by_email_ci(&self, email: &str) -> anyhow::Result<Option<Account>>;
    /// Case-insensitive existence check, optionally ignoring one account.
    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> anyhow::Result<bool>;
    /// Flip a flag in place and return the updated row.
    async fn toggle_flag(&self, id: Uuid, flag: Flag) -> anyhow::Result<Option<Account>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Turn a violation of the email index into `DuplicateEmail`.
fn map_write_error(err: sqlx::Error, what: &'static str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_UNIQUE_INDEX) {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Other(anyhow::Error::new(err).context(what))
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO users (first_name, last_name, email_address, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.email)
            .bind(&account.password_hash)
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_write_error(e, "insert account"))
    }

    async fn update(&self, id: Uuid, changes: AccountChanges) -> Result<Option<Account>, StoreError> {
        let sql = format!(
            r#"
            UPDATE users
               SET first_name = $2,
                   last_name = $3,
                   email_address = $4,
                   password_hash = $5,
                   updated_at = now()
             WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(&changes.first_name)
            .bind(&changes.last_name)
            .bind(&changes.email)
            .bind(&changes.password_hash)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| map_write_error(e, "update account"))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find account by id")?;
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE email_address = $1");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .context("find account by email")?;
        Ok(account)
    }

    async fn find_by_email_ci(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE lower(email_address) = lower($1)");
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .context("find account by folded email")?;
        Ok(account)
    }

    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> anyhow::Result<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                  FROM users
                 WHERE lower(email_address) = lower($1)
                   AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.db)
        .await
        .context("check email uniqueness")?;
        Ok(taken)
    }

    async fn toggle_flag(&self, id: Uuid, flag: Flag) -> anyhow::Result<Option<Account>> {
        let column = match flag {
            Flag::Admin => "admin",
            Flag::Primary => r#""primary""#,
        };
        let sql = format!(
            r#"
            UPDATE users
               SET {column} = NOT {column},
                   updated_at = now()
             WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("toggle {flag}"))?;
        Ok(account)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete account")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod pg_tests {
    use super::*;
    use crate::accounts::{AccountAttributes, Accounts};
    use crate::error::{AccountError, FieldError};
    use crate::shifts::PgShiftStore;
    use std::sync::Arc;

    fn services(pool: &PgPool) -> Accounts {
        Accounts::new(
            Arc::new(PgAccountStore::new(pool.clone())),
            Arc::new(PgShiftStore::new(pool.clone())),
        )
    }

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            first_name: "Justin".into(),
            last_name: "Vanderheide".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn insert_maps_unique_violation(pool: PgPool) {
        let store = PgAccountStore::new(pool);
        store.insert(new_account("user@example.com")).await.expect("insert should succeed");
        let err = store.insert(new_account("User@Example.COM")).await.expect_err("duplicate should fail");
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn toggle_and_lookup(pool: PgPool) {
        let store = PgAccountStore::new(pool);
        let account = store.insert(new_account("user@example.com")).await.expect("insert should succeed");
        assert!(!account.admin && !account.primary);

        let toggled = store
            .toggle_flag(account.id, Flag::Primary)
            .await
            .expect("toggle should succeed")
            .expect("account should exist");
        assert!(toggled.primary);
        let reloaded = store
            .find_by_id(account.id)
            .await
            .expect("find should succeed")
            .expect("account should exist");
        assert!(reloaded.primary);
        assert!(!reloaded.admin);

        assert!(store.find_by_email("USER@example.com").await.expect("query should succeed").is_none());
        let folded = store
            .find_by_email_ci("USER@example.com")
            .await
            .expect("query should succeed");
        assert_eq!(folded.map(|a| a.id), Some(account.id));
        assert!(store.email_taken("USER@example.com", None).await.expect("query should succeed"));
        assert!(!store.email_taken("USER@example.com", Some(account.id)).await.expect("query should succeed"));

        assert!(store.delete(account.id).await.expect("query should succeed"));
        assert!(store.find_by_id(account.id).await.expect("query should succeed").is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn unique_index_rejects_case_variant(pool: PgPool) {
        let accounts = services(&pool);
        let base = AccountAttributes::new("Justin", "Vanderheide", "user@example.com", "foobar");
        let (a, b) = tokio::join!(
            accounts.create(base.clone()),
            accounts.create(base.with_email("USER@EXAMPLE.COM")),
        );
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let failed = if a.is_err() { a } else { b };
        match failed {
            Err(AccountError::Validation(v)) => assert!(v.contains(&FieldError::EmailTaken)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires DATABASE_URL"]
    async fn credentials_migration_collapses_case_variant_emails(pool: PgPool) {
        use sqlx::Executor;

        pool.execute(include_str!("../../migrations/20121001000000_create_users.sql"))
            .await
            .expect("legacy schema should apply");
        pool.execute(
            r#"INSERT INTO users (first_name, last_name, email, admin) VALUES
                ('Jo', 'Doe', 'jo@example.com', false),
                ('Jo', 'Doe', 'JO@example.com', true),
                ('Al', 'Doe', 'al@example.com', false)"#,
        )
        .await
        .expect("legacy rows should insert");

        pool.execute(include_str!("../../migrations/20121105000000_add_credentials_to_users.sql"))
            .await
            .expect("credentials migration should apply over case variants");

        let emails: Vec<(String, bool)> =
            sqlx::query_as("SELECT email_address, admin FROM users ORDER BY lower(email_address)")
                .fetch_all(&pool)
                .await
                .expect("query should succeed");
        assert_eq!(
            emails,
            vec![("al@example.com".to_string(), false), ("JO@example.com".to_string(), true)]
        );
    }
}
