//! Replies table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Replies table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum ReplyConstraints {
    #[strum(serialize = "replies_post_id_fkey")]
    PostExists,
    #[strum(serialize = "replies_user_id_fkey")]
    AuthorExists,
    #[strum(serialize = "replies_content_not_empty")]
    ContentNotEmpty,
}

impl ReplyConstraints {
    /// Creates a new [`ReplyConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            ReplyConstraints::PostExists | ReplyConstraints::AuthorExists => {
                ConstraintCategory::Referential
            }
            ReplyConstraints::ContentNotEmpty => ConstraintCategory::Validation,
        }
    }
}

impl From<ReplyConstraints> for String {
    #[inline]
    fn from(val: ReplyConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ReplyConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
