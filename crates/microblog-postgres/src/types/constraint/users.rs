//! Users table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Users table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum UserConstraints {
    // Credential uniqueness
    #[strum(serialize = "users_username_key")]
    UsernameUnique,
    #[strum(serialize = "users_email_key")]
    EmailUnique,

    // Field validation
    #[strum(serialize = "users_username_not_empty")]
    UsernameNotEmpty,
    #[strum(serialize = "users_email_not_empty")]
    EmailNotEmpty,
    #[strum(serialize = "users_password_hash_not_empty")]
    PasswordHashNotEmpty,

    #[strum(serialize = "users_updated_after_created")]
    UpdatedAfterCreated,
}

impl UserConstraints {
    /// Creates a new [`UserConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            UserConstraints::UsernameUnique | UserConstraints::EmailUnique => {
                ConstraintCategory::Uniqueness
            }
            UserConstraints::UsernameNotEmpty
            | UserConstraints::EmailNotEmpty
            | UserConstraints::PasswordHashNotEmpty => ConstraintCategory::Validation,
            UserConstraints::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<UserConstraints> for String {
    #[inline]
    fn from(val: UserConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for UserConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
