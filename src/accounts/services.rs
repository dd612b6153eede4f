use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{AccountAttributes, AccountUpdate, Flag},
    password::{hash_password, verify_dummy},
    repo::AccountStore,
    repo_types::{Account, AccountChanges, NewAccount},
    validation::{check_password, check_profile, is_blank},
};
use crate::{
    error::{AccountError, FieldError, ValidationErrors},
    shifts::{Shift, ShiftStore},
};

/// Account operations over a pair of stores.
#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn AccountStore>,
    shifts: Arc<dyn ShiftStore>,
}

impl Accounts {
    pub fn new(store: Arc<dyn AccountStore>, shifts: Arc<dyn ShiftStore>) -> Self {
        Self { store, shifts }
    }

    /// Validate, hash and persist a new account. Every failed check is reported at once and
    /// nothing is written.
    #[instrument(skip(self, attrs), fields(email = %attrs.email))]
    pub async fn create(&self, attrs: AccountAttributes) -> Result<Account, AccountError> {
        let mut errors = Vec::new();
        check_profile(&attrs.first_name, &attrs.last_name, &attrs.email, &mut errors);
        check_password(&attrs.password, &attrs.password_confirmation, &mut errors);
        self.check_email_free(&attrs.email, None, &mut errors).await?;
        if let Err(e) = ValidationErrors::check(errors) {
            warn!(error = %e, "account rejected");
            return Err(e.into());
        }

        let password_hash = hash_password(&attrs.password)?;
        let account = self
            .store
            .insert(NewAccount {
                first_name: attrs.first_name,
                last_name: attrs.last_name,
                email: attrs.email,
                password_hash,
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "account insert failed");
                AccountError::from(e)
            })?;

        info!(user_id = %account.id, "account created");
        Ok(account)
    }

    /// Apply `changes` over the current values, re-running the same checks. The password is
    /// only checked and re-hashed when a new one is given.
    #[instrument(skip(self, account, changes), fields(user_id = %account.id))]
    pub async fn update(
        &self,
        account: &mut Account,
        changes: AccountUpdate,
    ) -> Result<(), AccountError> {
        let first_name = changes.first_name.unwrap_or_else(|| account.first_name.clone());
        let last_name = changes.last_name.unwrap_or_else(|| account.last_name.clone());
        let email = changes.email.unwrap_or_else(|| account.email.clone());

        let mut errors = Vec::new();
        check_profile(&first_name, &last_name, &email, &mut errors);
        if let Some(pw) = &changes.password {
            check_password(&pw.password, &pw.password_confirmation, &mut errors);
        }
        self.check_email_free(&email, Some(account.id), &mut errors).await?;
        if let Err(e) = ValidationErrors::check(errors) {
            warn!(error = %e, "account update rejected");
            return Err(e.into());
        }

        let password_hash = match &changes.password {
            Some(pw) => hash_password(&pw.password)?,
            None => account.password_hash.clone(),
        };
        let updated = self
            .store
            .update(
                account.id,
                AccountChanges {
                    first_name,
                    last_name,
                    email,
                    password_hash,
                },
            )
            .await?
            .ok_or(AccountError::NotFound)?;

        info!("account updated");
        *account = updated;
        Ok(())
    }

    /// Look up by exact email and check the password. `None` for an unknown email and for a
    /// wrong password alike; both paths run one hash verification.
    #[instrument(skip(self, email, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Account>, AccountError> {
        let Some(account) = self.store.find_by_email(email).await? else {
            verify_dummy(password);
            debug!("authentication failed");
            return Ok(None);
        };

        if account.has_password(password) {
            debug!(user_id = %account.id, "authenticated");
            Ok(Some(account))
        } else {
            debug!("authentication failed");
            Ok(None)
        }
    }

    /// Flip `flag`, persist it, and refresh `account` with the stored row.
    #[instrument(skip(self, account), fields(user_id = %account.id))]
    pub async fn toggle(&self, account: &mut Account, flag: Flag) -> Result<(), AccountError> {
        let updated = self
            .store
            .toggle_flag(account.id, flag)
            .await?
            .ok_or(AccountError::NotFound)?;
        info!(%flag, admin = updated.admin, primary = updated.primary, "flag toggled");
        *account = updated;
        Ok(())
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Account>, AccountError> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        Ok(self.store.find_by_email(email).await?)
    }

    /// Lookup ignoring case, matching how uniqueness is enforced.
    pub async fn find_by_email_ci(&self, email: &str) -> Result<Option<Account>, AccountError> {
        Ok(self.store.find_by_email_ci(email).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AccountError> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            info!(user_id = %id, "account deleted");
        }
        Ok(deleted)
    }

    /// Shifts where the account is either the primary or the secondary assignee.
    pub async fn shifts(&self, account: &Account) -> Result<Vec<Shift>, AccountError> {
        Ok(self.shifts.list_for_account(account.id).await?)
    }

    async fn check_email_free(
        &self,
        email: &str,
        except: Option<Uuid>,
        errors: &mut Vec<FieldError>,
    ) -> Result<(), AccountError> {
        if is_blank(email) {
            return Ok(());
        }
        if self.store.email_taken(email, except).await? {
            errors.push(FieldError::EmailTaken);
        }
        Ok(())
    }
}
