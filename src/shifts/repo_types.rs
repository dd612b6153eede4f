use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Shift row, reduced to the columns that link it to accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Shift {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    pub primary_id: Option<Uuid>,   // primary assignee
    pub secondary_id: Option<Uuid>, // secondary assignee
}

impl Shift {
    pub fn is_assigned_to(&self, account_id: Uuid) -> bool {
        self.primary_id == Some(account_id) || self.secondary_id == Some(account_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewShift {
    pub starts_at: OffsetDateTime,
    pub primary_id: Option<Uuid>,
    pub secondary_id: Option<Uuid>,
}

impl NewShift {
    pub fn unassigned(starts_at: OffsetDateTime) -> Self {
        Self {
            starts_at,
            primary_id: None,
            secondary_id: None,
        }
    }

    pub fn with_primary(mut self, account_id: Uuid) -> Self {
        self.primary_id = Some(account_id);
        self
    }

    pub fn with_secondary(mut self, account_id: Uuid) -> Self {
        self.secondary_id = Some(account_id);
        self
    }
}
