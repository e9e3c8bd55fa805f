//! Named database constraints, grouped per table.
//!
//! Constraint names are stable identifiers: the migrations declare them and
//! the error mapping in the server matches on them.

mod likes;
mod posts;
mod replies;
mod users;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::likes::LikeConstraints;
pub use self::posts::PostConstraints;
pub use self::replies::ReplyConstraints;
pub use self::users::UserConstraints;

/// Any known constraint of the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    User(UserConstraints),
    Post(PostConstraints),
    Like(LikeConstraints),
    Reply(ReplyConstraints),
}

/// Broad classification of a constraint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Format, length and emptiness checks.
    Validation,
    /// Timestamp ordering checks.
    Chronological,
    /// Unique keys and indexes.
    Uniqueness,
    /// Foreign keys.
    Referential,
}

impl ConstraintViolation {
    /// Looks up a constraint by the name reported by PostgreSQL.
    ///
    /// ```
    /// use microblog_postgres::types::{ConstraintViolation, LikeConstraints};
    ///
    /// let violation = ConstraintViolation::new("uix_user_post_like");
    /// assert_eq!(violation, Some(ConstraintViolation::Like(LikeConstraints::UserPostUnique)));
    /// assert!(ConstraintViolation::new("unknown_constraint").is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        let prefix = constraint.split('_').next()?;
        match prefix {
            "users" => UserConstraints::new(constraint).map(Self::User),
            "posts" => PostConstraints::new(constraint).map(Self::Post),
            "likes" | "uix" => LikeConstraints::new(constraint).map(Self::Like),
            "replies" => ReplyConstraints::new(constraint).map(Self::Reply),
            _ => None,
        }
    }

    /// Returns the table that declares this constraint.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::User(_) => "users",
            ConstraintViolation::Post(_) => "posts",
            ConstraintViolation::Like(_) => "likes",
            ConstraintViolation::Reply(_) => "replies",
        }
    }

    /// Returns the category of this constraint.
    pub fn constraint_category(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::User(c) => c.categorize(),
            ConstraintViolation::Post(c) => c.categorize(),
            ConstraintViolation::Like(c) => c.categorize(),
            ConstraintViolation::Reply(c) => c.categorize(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::User(c) => write!(f, "{c}"),
            ConstraintViolation::Post(c) => write!(f, "{c}"),
            ConstraintViolation::Like(c) => write!(f, "{c}"),
            ConstraintViolation::Reply(c) => write!(f, "{c}"),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ConstraintViolation::new(&value).ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_constraint_name_round_trips() {
        let names = UserConstraints::iter()
            .map(|c| c.to_string())
            .chain(PostConstraints::iter().map(|c| c.to_string()))
            .chain(LikeConstraints::iter().map(|c| c.to_string()))
            .chain(ReplyConstraints::iter().map(|c| c.to_string()));

        for name in names {
            let violation = ConstraintViolation::new(&name);
            assert!(violation.is_some(), "unrecognized constraint {name}");
            assert_eq!(violation.map(|v| v.to_string()), Some(name));
        }
    }

    #[test]
    fn credential_uniqueness() {
        let violation = ConstraintViolation::new("users_email_key");
        assert_eq!(
            violation,
            Some(ConstraintViolation::User(UserConstraints::EmailUnique))
        );
        assert_eq!(
            violation.map(|v| v.constraint_category()),
            Some(ConstraintCategory::Uniqueness)
        );
    }

    #[test]
    fn foreign_keys_are_referential() {
        let violation = ConstraintViolation::new("replies_post_id_fkey");
        assert_eq!(violation.map(|v| v.table_name()), Some("replies"));
        assert_eq!(
            violation.map(|v| v.constraint_category()),
            Some(ConstraintCategory::Referential)
        );
    }

    #[test]
    fn serde_uses_constraint_name() -> Result<(), serde_json::Error> {
        let violation = ConstraintViolation::Like(LikeConstraints::UserPostUnique);
        let json = serde_json::to_string(&violation)?;
        assert_eq!(json, "\"uix_user_post_like\"");
        Ok(())
    }
}
