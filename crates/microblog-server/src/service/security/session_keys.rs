//! Session token signing and verification.
//!
//! Tokens are HS256 JWTs carrying the username as `sub`, issue and expiry
//! times in seconds, and a random `jti`. Nothing is persisted: a token is
//! valid exactly when its signature checks out and it has not expired.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[cfg(any(test, feature = "config"))]
use clap::Args;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utility::tracing_targets::TRACING_TARGET_SESSION_KEYS as TRACING_TARGET;
use crate::{Error, Result};

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted token lifetime (30 days).
const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Session token signing configuration.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
pub struct SessionKeysConfig {
    /// Shared secret used to sign session tokens (at least 32 bytes).
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long = "auth-secret", env = "AUTH_SECRET", hide_env_values = true)
    )]
    #[serde(default)]
    pub auth_secret: Option<String>,

    /// File containing the signing secret, read when `AUTH_SECRET` is unset.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long = "auth-secret-file", env = "AUTH_SECRET_FILE")
    )]
    #[serde(default)]
    pub auth_secret_file: Option<PathBuf>,

    /// Session token lifetime in seconds.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long = "auth-token-ttl-secs",
            env = "AUTH_TOKEN_TTL_SECS",
            default_value = "86400"
        )
    )]
    #[serde(default = "SessionKeysConfig::default_token_ttl_secs")]
    pub auth_token_ttl_secs: u64,
}

impl SessionKeysConfig {
    fn default_token_ttl_secs() -> u64 {
        86400
    }

    /// Creates a configuration with an inline secret and the default lifetime.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            auth_secret: Some(secret.into()),
            auth_secret_file: None,
            auth_token_ttl_secs: Self::default_token_ttl_secs(),
        }
    }

    /// Sets the token lifetime in seconds.
    pub fn with_token_ttl_secs(mut self, secs: u64) -> Self {
        self.auth_token_ttl_secs = secs;
        self
    }

    /// Returns the token lifetime.
    #[inline]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.auth_token_ttl_secs)
    }

    /// Validates the configuration without reading the secret file.
    pub fn validate(&self) -> Result<()> {
        match (&self.auth_secret, &self.auth_secret_file) {
            (None, None) => {
                return Err(Error::config(
                    "either AUTH_SECRET or AUTH_SECRET_FILE must be set",
                ));
            }
            (Some(secret), _) if secret.len() < MIN_SECRET_LENGTH => {
                return Err(Error::config(format!(
                    "AUTH_SECRET must be at least {MIN_SECRET_LENGTH} bytes"
                )));
            }
            _ => {}
        }

        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.auth_token_ttl_secs) {
            return Err(Error::config(format!(
                "auth_token_ttl_secs must be between 1 and {MAX_TOKEN_TTL_SECS}"
            )));
        }

        Ok(())
    }
}

impl Default for SessionKeysConfig {
    fn default() -> Self {
        Self {
            auth_secret: None,
            auth_secret_file: None,
            auth_token_ttl_secs: Self::default_token_ttl_secs(),
        }
    }
}

impl fmt::Debug for SessionKeysConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeysConfig")
            .field("auth_secret", &self.auth_secret.as_ref().map(|_| "***"))
            .field("auth_secret_file", &self.auth_secret_file)
            .field("auth_token_ttl_secs", &self.auth_token_ttl_secs)
            .finish()
    }
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Username of the authenticated user.
    pub sub: String,
    /// Issued at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch. The token is valid while `now < exp`.
    pub exp: i64,
    /// Random token identifier.
    pub jti: Uuid,
}

impl SessionClaims {
    /// Returns the subject (username).
    #[inline]
    pub fn subject(&self) -> &str {
        &self.sub
    }
}

/// Signing keys for session tokens.
///
/// Cheap to clone; the keys are shared behind an [`Arc`].
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl SessionKeys {
    /// Loads the signing secret described by `config`.
    ///
    /// The inline secret wins over the secret file. Trailing whitespace in the
    /// file is ignored.
    pub async fn from_config(config: &SessionKeysConfig) -> Result<Self> {
        config.validate()?;

        let secret = match (&config.auth_secret, &config.auth_secret_file) {
            (Some(secret), _) => secret.clone(),
            (None, Some(path)) => Self::load_secret_file(path).await?,
            (None, None) => return Err(Error::config("session secret is not configured")),
        };

        let keys = Self::from_secret(secret.as_bytes(), config.token_ttl())?;
        tracing::info!(
            target: TRACING_TARGET,
            token_ttl_secs = config.auth_token_ttl_secs,
            "session keys loaded",
        );

        Ok(keys)
    }

    /// Creates keys from a raw secret.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the secret is shorter than
    /// [`MIN_SECRET_LENGTH`] bytes.
    pub fn from_secret(secret: &[u8], token_ttl: Duration) -> Result<Self> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(Error::config(format!(
                "session secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        let inner = SessionKeysInner {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            token_ttl,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the default token lifetime.
    #[inline]
    pub fn token_ttl(&self) -> Duration {
        self.inner.token_ttl
    }

    /// Issues a token for `subject` with the configured lifetime.
    pub fn issue(&self, subject: &str) -> Result<String> {
        self.issue_with_ttl(subject, self.inner.token_ttl)
    }

    /// Issues a token for `subject` that expires `ttl` from now.
    ///
    /// A zero `ttl` produces a token that is already expired.
    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String> {
        let iat = jiff::Timestamp::now().as_second();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            sub: subject.to_owned(),
            iat,
            exp: iat.saturating_add(ttl_secs),
            jti: Uuid::new_v4(),
        };

        let header = Header::new(Algorithm::HS256);
        jsonwebtoken::encode(&header, &claims, &self.inner.encoding_key).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to sign session token",
            );
            Error::internal("Could not issue session token").with_source(e)
        })
    }

    /// Verifies a token and returns its claims.
    ///
    /// Every failure (malformed structure, bad signature, unexpected
    /// algorithm, expiry, missing or empty subject) yields the same
    /// unauthenticated error.
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let data = jsonwebtoken::decode::<SessionClaims>(
            token,
            &self.inner.decoding_key,
            &self.inner.validation,
        )
        .map_err(|e| {
            tracing::debug!(
                target: TRACING_TARGET,
                error = %e,
                "session token rejected",
            );
            Error::unauthenticated().with_source(e)
        })?;

        let claims = data.claims;
        let now = jiff::Timestamp::now().as_second();
        if now >= claims.exp {
            tracing::debug!(target: TRACING_TARGET, "session token expired");
            return Err(Error::unauthenticated());
        }

        if claims.sub.is_empty() {
            tracing::debug!(target: TRACING_TARGET, "session token has an empty subject");
            return Err(Error::unauthenticated());
        }

        Ok(claims)
    }

    async fn load_secret_file(path: &Path) -> Result<String> {
        tracing::debug!(
            target: TRACING_TARGET,
            path = %path.display(),
            "loading session secret from file",
        );

        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %e,
                "failed to read session secret file",
            );
            Error::config("failed to read session secret file").with_source(e)
        })?;

        Ok(contents.trim_end().to_owned())
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("token_ttl", &self.inner.token_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::ErrorKind;

    const SECRET: &str = "an-example-secret-that-is-long-enough";

    fn keys() -> anyhow::Result<SessionKeys> {
        Ok(SessionKeys::from_secret(
            SECRET.as_bytes(),
            Duration::from_secs(3600),
        )?)
    }

    fn flip_char(token: &str, index: usize) -> String {
        token
            .char_indices()
            .map(|(i, c)| match (i == index, c) {
                (true, 'A') => 'B',
                (true, _) => 'A',
                (false, c) => c,
            })
            .collect()
    }

    #[test]
    fn issue_and_verify_round_trip() -> anyhow::Result<()> {
        let keys = keys()?;
        let token = keys.issue("alice")?;
        let claims = keys.verify(&token)?;

        assert_eq!(claims.subject(), "alice");
        assert_eq!(claims.exp - claims.iat, 3600);
        Ok(())
    }

    #[test]
    fn tokens_have_distinct_ids() -> anyhow::Result<()> {
        let keys = keys()?;
        let first = keys.verify(&keys.issue("alice")?)?;
        let second = keys.verify(&keys.issue("alice")?)?;

        assert_ne!(first.jti, second.jti);
        Ok(())
    }

    #[test]
    fn zero_ttl_token_is_rejected_immediately() -> anyhow::Result<()> {
        let keys = keys()?;
        let token = keys.issue_with_ttl("alice", Duration::ZERO)?;
        let error = keys.verify(&token).err();

        assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::Unauthenticated));
        Ok(())
    }

    #[test]
    fn tampered_tokens_are_rejected() -> anyhow::Result<()> {
        let keys = keys()?;
        let token = keys.issue("alice")?;
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let header_mid = parts[0].len() / 2;
        let payload_mid = parts[0].len() + 1 + parts[1].len() / 2;
        let signature_mid = parts[0].len() + parts[1].len() + 2 + parts[2].len() / 2;

        for index in [header_mid, payload_mid, signature_mid] {
            let tampered = flip_char(&token, index);
            assert_ne!(tampered, token);
            assert!(keys.verify(&tampered).is_err(), "flip at {index} accepted");
        }

        Ok(())
    }

    #[test]
    fn foreign_secret_and_algorithm_are_rejected() -> anyhow::Result<()> {
        let keys = keys()?;
        let other = SessionKeys::from_secret(
            b"another-secret-that-is-also-long-enough",
            Duration::from_secs(3600),
        )?;
        assert!(keys.verify(&other.issue("alice")?).is_err());

        let now = jiff::Timestamp::now().as_second();
        let claims = SessionClaims {
            sub: "alice".to_owned(),
            iat: now,
            exp: now + 3600,
            jti: Uuid::new_v4(),
        };
        let hs512 = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )?;
        assert!(keys.verify(&hs512).is_err());
        assert!(keys.verify("not.a.token").is_err());
        assert!(keys.verify("").is_err());
        Ok(())
    }

    #[test]
    fn empty_subject_is_rejected() -> anyhow::Result<()> {
        let keys = keys()?;
        let token = keys.issue("")?;
        assert!(keys.verify(&token).is_err());
        Ok(())
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(SessionKeys::from_secret(b"short", Duration::from_secs(60)).is_err());
        assert!(SessionKeysConfig::new("short").validate().is_err());
        assert!(SessionKeysConfig::default().validate().is_err());
        assert!(
            SessionKeysConfig::new(SECRET)
                .with_token_ttl_secs(0)
                .validate()
                .is_err()
        );
    }

    #[tokio::test]
    async fn load_secret_from_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("secret");
        fs::write(&path, format!("{SECRET}\n"))?;

        let config = SessionKeysConfig {
            auth_secret: None,
            auth_secret_file: Some(path),
            auth_token_ttl_secs: 60,
        };
        let keys = SessionKeys::from_config(&config).await?;
        let token = keys.issue("alice")?;

        let inline = SessionKeys::from_secret(SECRET.as_bytes(), Duration::from_secs(60))?;
        assert_eq!(inline.verify(&token)?.subject(), "alice");
        Ok(())
    }

    #[tokio::test]
    async fn missing_secret_file_is_a_config_error() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let config = SessionKeysConfig {
            auth_secret: None,
            auth_secret_file: Some(temp_dir.path().join("missing")),
            auth_token_ttl_secs: 60,
        };

        let error = SessionKeys::from_config(&config).await.err();
        assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::Config));
        Ok(())
    }

    #[test]
    fn debug_hides_secret() {
        let config = SessionKeysConfig::new(SECRET);
        assert!(!format!("{config:?}").contains(SECRET));
    }
}
