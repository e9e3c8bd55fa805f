//! Service layer error types and utilities.
//!
//! Services return [`Error`], a structured error carrying an [`ErrorKind`], a
//! message that is safe to show to clients, and an optional source error for
//! the logs. The HTTP layer maps each kind onto a status code.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use microblog_postgres::PgError;
use microblog_postgres::types::{
    ConstraintViolation, LikeConstraints, PostConstraints, ReplyConstraints, UserConstraints,
};

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for service layer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Credential field that collided with an existing account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialField {
    Username,
    Email,
}

impl CredentialField {
    /// Returns the field name as it appears in requests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::Username => "Username already registered",
            Self::Email => "Email already registered",
        }
    }
}

/// Entity that was looked up and not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    User,
    Post,
}

impl Resource {
    /// Returns the resource name used in error bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Post => "post",
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::User => "User not found",
            Self::Post => "Post not found",
        }
    }
}

/// Reason a post or reply body was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentViolation {
    /// Nothing left after trimming whitespace.
    Empty,
    /// More than 280 characters after trimming.
    TooLong,
}

/// Error kind enumeration for categorizing service layer errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Configuration-related errors.
    Config,
    /// Database errors that are not a domain condition.
    Storage,
    /// Username or email is already taken.
    DuplicateCredential(CredentialField),
    /// Login with an unknown email or a wrong password.
    InvalidCredentials,
    /// Missing, invalid or expired session token, or the subject no longer exists.
    Unauthenticated,
    /// Referenced entity does not exist.
    NotFound(Resource),
    /// Post or reply content rejected before persistence.
    Validation(ContentViolation),
    /// Concurrent write lost against a uniqueness constraint.
    Conflict,
    /// Caller is authenticated but does not own the resource.
    Forbidden,
    /// Internal service logic errors.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    ///
    /// Useful for logging and metrics labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Storage => "storage",
            Self::DuplicateCredential(_) => "duplicate_credential",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Conflict => "conflict",
            Self::Forbidden => "forbidden",
            Self::Internal => "internal_service",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service layer error with structured information.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    /// The error category
    kind: ErrorKind,
    /// Client-safe error message
    message: Cow<'static, str>,
    /// Optional underlying error that caused this error
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new [`Error`].
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the client-safe error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the underlying source error, if any.
    #[must_use]
    #[inline]
    pub fn source_ref(&self) -> Option<&(dyn StdError + Send + Sync)> {
        self.source.as_deref()
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a storage error.
    #[inline]
    pub fn storage(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Creates a duplicate credential error for `field`.
    #[inline]
    pub fn duplicate(field: CredentialField) -> Self {
        Self::new(ErrorKind::DuplicateCredential(field), field.message())
    }

    /// Creates the login failure error.
    ///
    /// Unknown emails and wrong passwords share this error.
    #[inline]
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Incorrect email or password")
    }

    /// Creates the error returned for any token or identity failure.
    #[inline]
    pub fn unauthenticated() -> Self {
        Self::new(ErrorKind::Unauthenticated, "Could not validate credentials")
    }

    /// Creates a not found error for `resource`.
    #[inline]
    pub fn not_found(resource: Resource) -> Self {
        Self::new(ErrorKind::NotFound(resource), resource.message())
    }

    /// Creates a content validation error.
    #[inline]
    pub fn validation(
        violation: ContentViolation,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::new(ErrorKind::Validation(violation), message)
    }

    /// Creates a conflict error.
    #[inline]
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Creates a forbidden error.
    #[inline]
    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Creates an internal error.
    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<PgError> for Error {
    /// Named constraints become domain errors; everything else is storage.
    fn from(error: PgError) -> Self {
        let mapped = match error.constraint_violation() {
            Some(ConstraintViolation::User(UserConstraints::UsernameUnique)) => {
                Self::duplicate(CredentialField::Username)
            }
            Some(ConstraintViolation::User(UserConstraints::EmailUnique)) => {
                Self::duplicate(CredentialField::Email)
            }
            Some(ConstraintViolation::Like(LikeConstraints::UserPostUnique)) => {
                Self::conflict("Could not like post")
            }
            Some(ConstraintViolation::Like(LikeConstraints::PostExists))
            | Some(ConstraintViolation::Reply(ReplyConstraints::PostExists)) => {
                Self::not_found(Resource::Post)
            }
            Some(ConstraintViolation::Like(LikeConstraints::UserExists))
            | Some(ConstraintViolation::Reply(ReplyConstraints::AuthorExists))
            | Some(ConstraintViolation::Post(PostConstraints::AuthorExists)) => {
                Self::unauthenticated()
            }
            _ => Self::storage("Database operation failed"),
        };

        mapped.with_source(error)
    }
}
