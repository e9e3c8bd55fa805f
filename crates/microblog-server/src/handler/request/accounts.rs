//! Profile request types.

use microblog_postgres::model::UpdateUser;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for `PUT /me`. Absent fields keep their stored value.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(max = 64))]
    pub display_name: Option<String>,
    pub bio: Option<String>,
    #[validate(length(max = 255))]
    pub avatar_url: Option<String>,
}

impl UpdateProfile {
    /// Converts the request into a change set.
    pub fn into_model(self) -> UpdateUser {
        UpdateUser {
            display_name: self.display_name,
            bio: self.bio,
            avatar_url: self.avatar_url,
        }
    }
}
