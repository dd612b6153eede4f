pub mod dto;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod validation;

pub use dto::{AccountAttributes, AccountUpdate, Flag, PasswordChange};
pub use repo::{AccountStore, PgAccountStore};
pub use repo_types::Account;
pub use services::Accounts;
