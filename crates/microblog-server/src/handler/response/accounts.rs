//! Account and profile response types.

use microblog_postgres::model::User;
use serde::{Deserialize, Serialize};

use super::PostSummary;
use crate::service::Profile;

/// The authenticated user.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Me {
    pub username: String,
    pub email: String,
}

impl From<User> for Me {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
        }
    }
}

/// Public profile with the user's posts, newest first.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub posts: Vec<PostSummary>,
}

impl From<Profile> for UserProfile {
    fn from(profile: Profile) -> Self {
        let Profile { user, posts } = profile;
        Self {
            username: user.username,
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            posts: posts.into_iter().map(PostSummary::from).collect(),
        }
    }
}
