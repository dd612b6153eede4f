use std::fmt;

use thiserror::Error;

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("first name can't be blank")]
    FirstNameBlank,
    #[error("last name can't be blank")]
    LastNameBlank,
    #[error("email can't be blank")]
    EmailBlank,
    #[error("email is invalid")]
    EmailInvalid,
    #[error("email has already been taken")]
    EmailTaken,
    #[error("password must be between 6 and 40 characters (got {len})")]
    PasswordLength { len: usize },
    #[error("password confirmation doesn't match password")]
    PasswordConfirmation,
}

impl FieldError {
    /// Name of the attribute the failure belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::FirstNameBlank => "first_name",
            FieldError::LastNameBlank => "last_name",
            FieldError::EmailBlank | FieldError::EmailInvalid | FieldError::EmailTaken => "email",
            FieldError::PasswordLength { .. } => "password",
            FieldError::PasswordConfirmation => "password_confirmation",
        }
    }
}

/// Every field failure found in one validation pass. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Returns `Ok(())` when nothing failed.
    pub fn check(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    pub fn single(error: FieldError) -> Self {
        ValidationErrors(vec![error])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn contains(&self, error: &FieldError) -> bool {
        self.0.contains(error)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "validation failed: {}", messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Failure reported by an account or shift store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The case-insensitive email index rejected the write.
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("account not found")]
    NotFound,
    #[error("storage error")]
    Storage(#[source] anyhow::Error),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => {
                AccountError::Validation(ValidationErrors::single(FieldError::EmailTaken))
            }
            StoreError::Other(e) => AccountError::Storage(e),
        }
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        AccountError::Storage(err)
    }
}
