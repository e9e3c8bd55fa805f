//! Likes table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Likes table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum LikeConstraints {
    /// At most one like per (user, post).
    #[strum(serialize = "uix_user_post_like")]
    UserPostUnique,
    #[strum(serialize = "likes_user_id_fkey")]
    UserExists,
    #[strum(serialize = "likes_post_id_fkey")]
    PostExists,
}

impl LikeConstraints {
    /// Creates a new [`LikeConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            LikeConstraints::UserPostUnique => ConstraintCategory::Uniqueness,
            LikeConstraints::UserExists | LikeConstraints::PostExists => {
                ConstraintCategory::Referential
            }
        }
    }
}

impl From<LikeConstraints> for String {
    #[inline]
    fn from(val: LikeConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for LikeConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
