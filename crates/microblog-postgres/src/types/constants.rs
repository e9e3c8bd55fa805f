//! Limits shared by the schema, the services and the request validators.

/// User account limits.
pub mod user {
    /// Maximum username length in characters.
    pub const MAX_USERNAME_LENGTH: u64 = 32;

    /// Maximum email address length in characters.
    pub const MAX_EMAIL_LENGTH: u64 = 255;

    /// Maximum display name length in characters.
    pub const MAX_DISPLAY_NAME_LENGTH: u64 = 64;

    /// Maximum avatar URL length in characters.
    pub const MAX_AVATAR_URL_LENGTH: u64 = 255;
}

/// Post and reply limits.
pub mod content {
    /// Maximum post or reply length in characters, measured after trimming.
    pub const MAX_CONTENT_LENGTH: usize = 280;
}

/// Feed pagination limits.
pub mod pagination {
    /// Page size used when the client does not ask for one.
    pub const DEFAULT_PAGE_SIZE: i64 = 20;

    /// Largest page size a client may request.
    pub const MAX_PAGE_SIZE: i64 = 100;
}
