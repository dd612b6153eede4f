use std::{fmt, str::FromStr};

use serde::Deserialize;

/// Input for creating an account. Password fields are transient.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct AccountAttributes {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl AccountAttributes {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password_confirmation: password.clone(),
            password,
        }
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = last_name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets password and confirmation together.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self.password_confirmation = self.password.clone();
        self
    }

    pub fn with_password_confirmation(mut self, confirmation: impl Into<String>) -> Self {
        self.password_confirmation = confirmation.into();
        self
    }
}

impl fmt::Debug for AccountAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountAttributes")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Partial update. `None` keeps the current value.
#[derive(Clone, Default, Deserialize)]
pub struct AccountUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<PasswordChange>,
}

#[derive(Clone, Deserialize)]
pub struct PasswordChange {
    pub password: String,
    pub password_confirmation: String,
}

impl PasswordChange {
    pub fn new(password: impl Into<String>, confirmation: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            password_confirmation: confirmation.into(),
        }
    }
}

/// Boolean role flags that can be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Admin,
    Primary,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Admin => "admin",
            Flag::Primary => "primary",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Flag::Admin),
            "primary" => Ok(Flag::Primary),
            other => anyhow::bail!("unknown flag: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_leave_other_fields_alone() {
        let base = AccountAttributes::new("Justin", "Vanderheide", "user@example.com", "foobar");
        let changed = base.clone().with_email("other@example.com");
        assert_eq!(changed.first_name, base.first_name);
        assert_eq!(changed.password, base.password);
        assert_eq!(changed.email, "other@example.com");
    }

    #[test]
    fn with_password_sets_confirmation() {
        let attrs = AccountAttributes::new("A", "B", "a@b.com", "foobar").with_password("barbaz");
        assert_eq!(attrs.password_confirmation, "barbaz");
    }

    #[test]
    fn debug_hides_passwords() {
        let attrs = AccountAttributes::new("A", "B", "a@b.com", "s3cret-pw");
        assert!(!format!("{attrs:?}").contains("s3cret-pw"));
    }

    #[test]
    fn flag_parses_from_name() {
        assert_eq!("admin".parse::<Flag>().expect("admin should parse"), Flag::Admin);
        assert_eq!("primary".parse::<Flag>().expect("primary should parse"), Flag::Primary);
        assert!("Admin".parse::<Flag>().is_err());
    }
}
