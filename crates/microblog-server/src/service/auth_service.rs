//! Registration, login and identity resolution.

use microblog_postgres::model::{NewUser, PostView, UpdateUser, User};
use microblog_postgres::query::{PostRepository, UserRepository};
use microblog_postgres::{PgClient, Store};

use crate::service::{PasswordHasher, SessionKeys};
use crate::utility::normalize_email;
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION as TRACING_TARGET;
use crate::{CredentialField, Error, Resource, Result};

/// How a successful login matched the stored credential.
///
/// Clients may send either the plaintext password or, for compatibility
/// with older clients, the exact stored hash. Both paths are kept separate
/// so each can be tested and audited on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPath {
    /// The provided value equals the stored hash byte for byte.
    StoredHash,
    /// The provided value verified as a plaintext password.
    Plaintext,
}

impl LoginPath {
    /// Returns the path name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StoredHash => "stored_hash",
            Self::Plaintext => "plaintext",
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// Signed session token.
    pub access_token: String,
    /// Credential path that matched.
    pub login_path: LoginPath,
}

/// Public profile of a user together with their posts, newest first.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: User,
    pub posts: Vec<PostView>,
}

/// Account lifecycle and authentication.
#[derive(Debug, Clone)]
pub struct AuthService<S = PgClient> {
    store: S,
    password_hasher: PasswordHasher,
    session_keys: SessionKeys,
}

impl<S: Store> AuthService<S> {
    /// Creates a new auth service.
    pub fn new(store: S, password_hasher: PasswordHasher, session_keys: SessionKeys) -> Self {
        Self {
            store,
            password_hasher,
            session_keys,
        }
    }

    /// Returns the session keys used to issue and verify tokens.
    #[inline]
    pub fn session_keys(&self) -> &SessionKeys {
        &self.session_keys
    }

    /// Registers a new account.
    ///
    /// The username is checked before the email, so a request colliding on
    /// both reports the username. The pre-checks are advisory; a concurrent
    /// registration that wins the race is caught by the unique constraints
    /// and reported the same way.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        let mut conn = self.store.connection().await?;

        if conn.username_exists(username).await? {
            tracing::debug!(target: TRACING_TARGET, "registration rejected: username taken");
            return Err(Error::duplicate(CredentialField::Username));
        }

        if conn.email_exists(&email).await? {
            tracing::debug!(target: TRACING_TARGET, "registration rejected: email taken");
            return Err(Error::duplicate(CredentialField::Email));
        }

        let password_hash = self.password_hasher.hash_password(password)?;
        let user = conn
            .create_user(NewUser {
                username: username.to_owned(),
                email,
                password_hash,
            })
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            user_id = user.id,
            "user registered"
        );

        Ok(user)
    }

    /// Authenticates by email and issues a session token.
    ///
    /// `provided` is accepted either as the exact stored hash or as the
    /// plaintext password. Unknown emails run a dummy verification and fail
    /// with the same error as a wrong password.
    pub async fn login(&self, email: &str, provided: &str) -> Result<IssuedSession> {
        let email = normalize_email(email);
        let mut conn = self.store.connection().await?;

        let Some(user) = conn.find_user_by_email(&email).await? else {
            self.password_hasher.verify_dummy_password(provided);
            tracing::debug!(target: TRACING_TARGET, "login rejected: unknown email");
            return Err(Error::invalid_credentials());
        };

        let Some(login_path) = self.match_credential(provided, &user.password_hash) else {
            tracing::debug!(
                target: TRACING_TARGET,
                user_id = user.id,
                "login rejected: credential mismatch"
            );
            return Err(Error::invalid_credentials());
        };

        let access_token = self.session_keys.issue(&user.username)?;
        tracing::info!(
            target: TRACING_TARGET,
            user_id = user.id,
            login_path = login_path.as_str(),
            "user logged in"
        );

        Ok(IssuedSession {
            access_token,
            login_path,
        })
    }

    /// Decides which login path, if any, `provided` satisfies.
    pub fn match_credential(&self, provided: &str, stored_hash: &str) -> Option<LoginPath> {
        if constant_time_eq(provided.as_bytes(), stored_hash.as_bytes()) {
            return Some(LoginPath::StoredHash);
        }

        if self.password_hasher.verify_password(provided, stored_hash) {
            return Some(LoginPath::Plaintext);
        }

        None
    }

    /// Resolves the user a session token belongs to.
    ///
    /// An invalid token and a subject that no longer exists both fail with
    /// the unauthenticated error.
    pub async fn resolve_current_user(&self, token: &str) -> Result<User> {
        let claims = self.session_keys.verify(token)?;
        let mut conn = self.store.connection().await?;

        match conn.find_user_by_username(claims.subject()).await? {
            Some(user) => Ok(user),
            None => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    "token subject does not match any user"
                );
                Err(Error::unauthenticated())
            }
        }
    }

    /// Writes the present profile fields of `user`.
    ///
    /// Absent fields keep their stored value. An empty change set returns
    /// the user as stored.
    pub async fn update_profile(&self, user: &User, changes: UpdateUser) -> Result<User> {
        let mut conn = self.store.connection().await?;

        let updated = if changes.is_empty() {
            conn.find_user_by_id(user.id).await?
        } else {
            conn.update_user(user.id, changes).await?
        };

        let updated = updated.ok_or_else(|| Error::not_found(Resource::User))?;
        tracing::debug!(
            target: TRACING_TARGET,
            user_id = updated.id,
            "profile updated"
        );

        Ok(updated)
    }

    /// Returns the public profile of `username` with their posts.
    pub async fn get_profile(&self, username: &str) -> Result<Profile> {
        let mut conn = self.store.connection().await?;
        let user = conn
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| Error::not_found(Resource::User))?;

        let posts = conn.list_user_posts(user.id).await?;
        Ok(Profile { user, posts })
    }
}

/// Compares two byte strings without short-circuiting on the first difference.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use microblog_postgres::model::NewPost;
    use microblog_test::MemoryStore;

    use super::*;
    use crate::ErrorKind;

    const SECRET: &[u8] = b"an-example-secret-that-is-long-enough";

    fn service(store: &MemoryStore) -> anyhow::Result<AuthService<MemoryStore>> {
        let keys = SessionKeys::from_secret(SECRET, Duration::from_secs(3600))?;
        Ok(AuthService::new(store.clone(), PasswordHasher::new(), keys))
    }

    #[tokio::test]
    async fn register_lowercases_email_domain_and_hashes_password() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let auth = service(&store)?;

        let user = auth
            .register("alice", "Alice@Example.com", "hunter2")
            .await?;

        assert_eq!(user.email, "Alice@example.com");
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_ne!(user.password_hash, "hunter2");
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_wins_over_duplicate_email() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let auth = service(&store)?;
        auth.register("alice", "alice@example.com", "pw").await?;

        let error = auth
            .register("alice", "alice@example.com", "pw")
            .await
            .err();
        assert_eq!(
            error.map(|e| e.kind()),
            Some(ErrorKind::DuplicateCredential(CredentialField::Username))
        );

        let error = auth
            .register("alice", "fresh@example.com", "pw")
            .await
            .err();
        assert_eq!(
            error.map(|e| e.kind()),
            Some(ErrorKind::DuplicateCredential(CredentialField::Username))
        );

        let error = auth
            .register("bob", "alice@EXAMPLE.com", "pw")
            .await
            .err();
        assert_eq!(
            error.map(|e| e.kind()),
            Some(ErrorKind::DuplicateCredential(CredentialField::Email))
        );

        assert_eq!(store.user_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn email_local_part_is_case_sensitive() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let auth = service(&store)?;

        let first = auth.register("alice", "Alice@example.com", "one").await?;
        let second = auth.register("bob", "alice@example.com", "two").await?;
        assert_ne!(first.id, second.id);
        assert_eq!(store.user_count(), 2);

        let session = auth.login("Alice@example.com", "one").await?;
        let resolved = auth.resolve_current_user(&session.access_token).await?;
        assert_eq!(resolved.username, "alice");

        let error = auth.login("Alice@example.com", "two").await.err();
        assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::InvalidCredentials));
        Ok(())
    }

    #[tokio::test]
    async fn unique_constraint_backs_up_the_advisory_checks() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let auth = service(&store)?;
        auth.register("alice", "alice@example.com", "pw").await?;

        store.set_stale_reads(true);

        let error = auth
            .register("alice", "fresh@example.com", "pw")
            .await
            .err();
        assert_eq!(
            error.map(|e| e.kind()),
            Some(ErrorKind::DuplicateCredential(CredentialField::Username))
        );

        let error = auth
            .register("bob", "alice@example.com", "pw")
            .await
            .err();
        let error = error.ok_or_else(|| anyhow::anyhow!("expected error"))?;
        assert_eq!(
            error.kind(),
            ErrorKind::DuplicateCredential(CredentialField::Email)
        );
        assert!(error.source_ref().is_some());

        assert_eq!(store.user_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn login_accepts_plaintext_and_stored_hash() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let auth = service(&store)?;
        let user = auth.register("alice", "alice@example.com", "hunter2").await?;

        let plaintext = auth.login("alice@example.com", "hunter2").await?;
        assert_eq!(plaintext.login_path, LoginPath::Plaintext);

        let stored = auth.login("alice@example.com", &user.password_hash).await?;
        assert_eq!(stored.login_path, LoginPath::StoredHash);

        let keys = auth.session_keys();
        assert_eq!(keys.verify(&plaintext.access_token)?.subject(), "alice");
        assert_eq!(keys.verify(&stored.access_token)?.subject(), "alice");
        Ok(())
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let auth = service(&store)?;
        auth.register("alice", "alice@example.com", "hunter2").await?;

        let wrong_password = auth.login("alice@example.com", "nope").await.err();
        let unknown_email = auth.login("nobody@example.com", "hunter2").await.err();

        let wrong_password = wrong_password.ok_or_else(|| anyhow::anyhow!("expected error"))?;
        let unknown_email = unknown_email.ok_or_else(|| anyhow::anyhow!("expected error"))?;
        assert_eq!(wrong_password.kind(), ErrorKind::InvalidCredentials);
        assert_eq!(unknown_email.kind(), ErrorKind::InvalidCredentials);
        assert_eq!(wrong_password.message(), unknown_email.message());
        Ok(())
    }

    #[test]
    fn match_credential_paths() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let auth = service(&store)?;
        let hash = PasswordHasher::new().hash_password("hunter2")?;

        assert_eq!(
            auth.match_credential(&hash, &hash),
            Some(LoginPath::StoredHash)
        );
        assert_eq!(
            auth.match_credential("hunter2", &hash),
            Some(LoginPath::Plaintext)
        );
        assert_eq!(auth.match_credential("hunter3", &hash), None);
        assert_eq!(auth.match_credential("", "not-a-hash"), None);
        Ok(())
    }

    #[tokio::test]
    async fn resolve_current_user_requires_live_subject() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let auth = service(&store)?;
        let user = auth.register("alice", "alice@example.com", "hunter2").await?;
        let session = auth.login("alice@example.com", "hunter2").await?;

        let resolved = auth.resolve_current_user(&session.access_token).await?;
        assert_eq!(resolved.id, user.id);

        let error = auth.resolve_current_user("garbage").await.err();
        assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::Unauthenticated));

        let mut conn = store.connection().await?;
        conn.delete_user(user.id).await?;
        let error = auth.resolve_current_user(&session.access_token).await.err();
        assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::Unauthenticated));
        Ok(())
    }

    #[tokio::test]
    async fn expired_token_does_not_resolve() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let auth = service(&store)?;
        auth.register("alice", "alice@example.com", "hunter2").await?;

        let token = auth.session_keys().issue_with_ttl("alice", Duration::ZERO)?;
        let error = auth.resolve_current_user(&token).await.err();
        assert_eq!(error.map(|e| e.kind()), Some(ErrorKind::Unauthenticated));
        Ok(())
    }

    #[tokio::test]
    async fn update_profile_writes_only_present_fields() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let auth = service(&store)?;
        let user = auth.register("alice", "alice@example.com", "hunter2").await?;

        let user = auth
            .update_profile(
                &user,
                UpdateUser {
                    bio: Some("hello".to_owned()),
                    ..Default::default()
                },
            )
            .await?;
        let user = auth
            .update_profile(
                &user,
                UpdateUser {
                    display_name: Some("Alice".to_owned()),
                    ..Default::default()
                },
            )
            .await?;

        assert_eq!(user.bio.as_deref(), Some("hello"));
        assert_eq!(user.display_name.as_deref(), Some("Alice"));
        assert_eq!(user.avatar_url, None);

        let unchanged = auth.update_profile(&user, UpdateUser::default()).await?;
        assert_eq!(unchanged, user);
        Ok(())
    }

    #[tokio::test]
    async fn profile_lists_posts_newest_first() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let auth = service(&store)?;
        let user = auth.register("alice", "alice@example.com", "hunter2").await?;

        let mut conn = store.connection().await?;
        for content in ["first", "second"] {
            conn.create_post(NewPost {
                user_id: user.id,
                content: content.to_owned(),
            })
            .await?;
        }

        let profile = auth.get_profile("alice").await?;
        let contents: Vec<&str> = profile
            .posts
            .iter()
            .map(|view| view.post.content.as_str())
            .collect();
        assert_eq!(contents, ["second", "first"]);

        let error = auth.get_profile("nobody").await.err();
        assert_eq!(
            error.map(|e| e.kind()),
            Some(ErrorKind::NotFound(Resource::User))
        );
        Ok(())
    }

    #[test]
    fn constant_time_eq_compares_contents() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"", b""));
    }
}
