//! In-process stores with the same constraints as the Postgres schema.
//!
//! Used by tests and local tooling. The case-folded email index is checked and written under
//! the same lock as the row, which is what the unique index does in Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    accounts::{
        dto::Flag,
        repo::AccountStore,
        repo_types::{Account, AccountChanges, NewAccount},
    },
    error::StoreError,
    shifts::{NewShift, Shift, ShiftStore},
};

#[derive(Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    // lower(email) -> account id
    emails: HashMap<String, Uuid>,
    shifts: Vec<Shift>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_key(email: &str) -> String {
    email.to_lowercase()
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut tables = self.tables.write().await;
        let key = email_key(&account.email);
        if tables.emails.contains_key(&key) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = OffsetDateTime::now_utc();
        let row = Account {
            id: Uuid::new_v4(),
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            password_hash: account.password_hash,
            admin: false,
            primary: false,
            created_at: now,
            updated_at: now,
        };
        tables.emails.insert(key, row.id);
        tables.accounts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: AccountChanges) -> Result<Option<Account>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(old_key) = tables.accounts.get(&id).map(|a| email_key(&a.email)) else {
            return Ok(None);
        };

        let new_key = email_key(&changes.email);
        if tables.emails.get(&new_key).is_some_and(|owner| *owner != id) {
            return Err(StoreError::DuplicateEmail);
        }
        tables.emails.remove(&old_key);
        tables.emails.insert(new_key, id);

        let Some(row) = tables.accounts.get_mut(&id) else {
            return Ok(None);
        };
        row.first_name = changes.first_name;
        row.last_name = changes.last_name;
        row.email = changes.email;
        row.password_hash = changes.password_hash;
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        Ok(self.tables.read().await.accounts.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_email_ci(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let tables = self.tables.read().await;
        Ok(tables
            .emails
            .get(&email_key(email))
            .and_then(|id| tables.accounts.get(id))
            .cloned())
    }

    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> anyhow::Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .emails
            .get(&email_key(email))
            .is_some_and(|owner| Some(*owner) != except))
    }

    async fn toggle_flag(&self, id: Uuid, flag: Flag) -> anyhow::Result<Option<Account>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.accounts.get_mut(&id) else {
            return Ok(None);
        };
        match flag {
            Flag::Admin => row.admin = !row.admin,
            Flag::Primary => row.primary = !row.primary,
        }
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.accounts.remove(&id) else {
            return Ok(false);
        };
        tables.emails.remove(&email_key(&row.email));
        // ON DELETE SET NULL
        for shift in tables.shifts.iter_mut() {
            if shift.primary_id == Some(id) {
                shift.primary_id = None;
            }
            if shift.secondary_id == Some(id) {
                shift.secondary_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ShiftStore for MemoryStore {
    async fn insert(&self, shift: NewShift) -> anyhow::Result<Shift> {
        let mut tables = self.tables.write().await;
        for assignee in [shift.primary_id, shift.secondary_id].into_iter().flatten() {
            anyhow::ensure!(
                tables.accounts.contains_key(&assignee),
                "shift assignee {assignee} does not exist"
            );
        }
        let row = Shift {
            id: Uuid::new_v4(),
            starts_at: shift.starts_at,
            primary_id: shift.primary_id,
            secondary_id: shift.secondary_id,
        };
        tables.shifts.push(row.clone());
        Ok(row)
    }

    async fn list_for_account(&self, account_id: Uuid) -> anyhow::Result<Vec<Shift>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Shift> = tables
            .shifts
            .iter()
            .filter(|s| s.is_assigned_to(account_id))
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.starts_at);
        Ok(rows)
    }
}
