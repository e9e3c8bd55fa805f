//! Registered user accounts.

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::users;
use crate::types::{HasCreatedAt, HasUpdatedAt};

/// A registered user with credentials and public profile.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Unique handle, also the subject of session tokens.
    pub username: String,
    /// Unique email address used to log in; the domain part is lowercased.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Optional name shown instead of the username.
    pub display_name: Option<String>,
    /// Optional free-form biography.
    pub bio: Option<String>,
    /// Optional URL of the profile picture.
    pub avatar_url: Option<String>,
    /// Timestamp when the account was created.
    pub created_at: Timestamp,
    /// Timestamp when the profile was last updated.
    pub updated_at: Timestamp,
}

/// Data for registering a user.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewUser {
    /// Unique handle.
    pub username: String,
    /// Unique, normalized email address.
    pub email: String,
    /// Argon2id PHC string, never the plaintext password.
    pub password_hash: String,
}

/// Profile changes; `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateUser {
    /// New display name.
    pub display_name: Option<String>,
    /// New biography.
    pub bio: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<String>,
}

impl User {
    /// Returns the display name, falling back to the username.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    /// Returns whether the user has an avatar configured.
    pub fn has_avatar(&self) -> bool {
        self.avatar_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

impl UpdateUser {
    /// Returns whether no field would be changed.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.bio.is_none() && self.avatar_url.is_none()
    }

    /// Applies the present fields to `user`, leaving the others intact.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(display_name) = &self.display_name {
            user.display_name = Some(display_name.clone());
        }
        if let Some(bio) = &self.bio {
            user.bio = Some(bio.clone());
        }
        if let Some(avatar_url) = &self.avatar_url {
            user.avatar_url = Some(avatar_url.clone());
        }
    }
}

impl HasCreatedAt for User {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

impl HasUpdatedAt for User {
    fn updated_at(&self) -> jiff::Timestamp {
        self.updated_at.into()
    }
}
