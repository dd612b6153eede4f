//! Startup seeding.

use tracing::{info, warn};

use crate::{
    accounts::{Account, AccountAttributes, Accounts, Flag},
    config::AdminSeed,
};

/// Make sure the configured bootstrap account exists and is an admin.
///
/// An existing account is matched ignoring case, like the email index. It is only promoted when
/// the configured password already opens it; otherwise it is left untouched and `None` is
/// returned.
pub async fn seed_admin(accounts: &Accounts, seed: &AdminSeed) -> anyhow::Result<Option<Account>> {
    let mut account = match accounts.find_by_email_ci(&seed.email).await? {
        Some(existing) => {
            if !existing.has_password(&seed.password) {
                warn!(
                    user_id = %existing.id,
                    "bootstrap email belongs to an account with a different password; not promoting"
                );
                return Ok(None);
            }
            existing
        }
        None => {
            let attrs = AccountAttributes::new(
                seed.first_name.as_str(),
                seed.last_name.as_str(),
                seed.email.as_str(),
                seed.password.as_str(),
            );
            let created = accounts.create(attrs).await?;
            info!(user_id = %created.id, "bootstrap admin created");
            created
        }
    };

    if !account.admin {
        accounts.toggle(&mut account, Flag::Admin).await?;
        info!(user_id = %account.id, "bootstrap account promoted to admin");
    }
    Ok(Some(account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn seed() -> AdminSeed {
        AdminSeed {
            email: "admin@example.com".into(),
            password: "changeme".into(),
            first_name: "Admin".into(),
            last_name: "User".into(),
        }
    }

    fn state() -> AppState {
        AppState::in_memory().expect("in-memory state should build")
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let state = state();
        let first = seed_admin(&state.accounts, &seed())
            .await
            .expect("seeding should succeed")
            .expect("admin should be seeded");
        assert!(first.admin);
        assert!(first.has_password("changeme"));

        let second = seed_admin(&state.accounts, &seed())
            .await
            .expect("seeding should succeed")
            .expect("admin should be seeded");
        assert_eq!(second.id, first.id);
        assert!(second.admin);
    }

    #[tokio::test]
    async fn promotes_existing_account_with_matching_password() {
        let state = state();
        let existing = state
            .accounts
            .create(AccountAttributes::new("Jo", "Doe", "admin@example.com", "changeme"))
            .await
            .expect("create should succeed");
        assert!(!existing.admin);

        let seeded = seed_admin(&state.accounts, &seed())
            .await
            .expect("seeding should succeed")
            .expect("admin should be seeded");
        assert_eq!(seeded.id, existing.id);
        assert!(seeded.admin);
    }

    #[tokio::test]
    async fn matches_existing_account_ignoring_case() {
        let state = state();
        let existing = state
            .accounts
            .create(AccountAttributes::new("Jo", "Doe", "Admin@Example.com", "changeme"))
            .await
            .expect("create should succeed");

        let seeded = seed_admin(&state.accounts, &seed())
            .await
            .expect("seeding should not fail on a case variant")
            .expect("admin should be seeded");
        assert_eq!(seeded.id, existing.id);
        assert_eq!(seeded.email, "Admin@Example.com");
        assert!(seeded.admin);
    }

    #[tokio::test]
    async fn refuses_to_promote_account_with_other_password() {
        let state = state();
        let existing = state
            .accounts
            .create(AccountAttributes::new("Jo", "Doe", "ADMIN@example.com", "foobar"))
            .await
            .expect("create should succeed");

        let seeded = seed_admin(&state.accounts, &seed())
            .await
            .expect("seeding should succeed");
        assert!(seeded.is_none());

        let reloaded = state
            .accounts
            .find(existing.id)
            .await
            .expect("find should succeed")
            .expect("account should exist");
        assert!(!reloaded.admin);
        assert!(reloaded.has_password("foobar"));
    }

    #[tokio::test]
    async fn invalid_seed_is_an_error() {
        let state = state();
        let bad = AdminSeed {
            password: "x".into(),
            ..seed()
        };
        assert!(seed_admin(&state.accounts, &bad).await.is_err());
    }
}
