use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use diesel::ConnectionError;
use microblog_postgres::model::{
    Like, LikeToggle, NewLike, NewPost, NewReply, NewUser, Post, PostView, Reply, ReplyView,
    UpdateUser, User,
};
use microblog_postgres::types::Pagination;
use microblog_postgres::{PgError, PgResult, Store};

use super::violation;
use crate::TRACING_TARGET_MEMORY;

/// Shareable in-memory store; clones see the same data.
///
/// Every repository call takes one lock for its whole duration, so multi-step
/// operations such as toggling a like are atomic just like a transaction.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    unavailable: Arc<AtomicBool>,
    stale_reads: Arc<AtomicBool>,
}

/// A "connection" to a [`MemoryStore`].
pub struct MemoryConnection {
    state: Arc<Mutex<MemoryState>>,
    stale_reads: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the database going away (or coming back).
    ///
    /// While unavailable, [`Store::ping`] and [`Store::connection`] fail with a
    /// connection error.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Makes existence lookups miss committed rows while set.
    ///
    /// `username_exists`, `email_exists` and the lookup step of
    /// `toggle_like` answer as if a competing transaction had not committed
    /// yet. Inserts still see every row, so the unique constraints fire the
    /// way they do for the loser of a real race.
    pub fn set_stale_reads(&self, stale: bool) {
        self.stale_reads.store(stale, Ordering::SeqCst);
    }

    /// Returns the number of stored users.
    pub fn user_count(&self) -> usize {
        lock(&self.state).users.len()
    }

    /// Returns the number of stored posts.
    pub fn post_count(&self) -> usize {
        lock(&self.state).posts.len()
    }

    /// Returns the number of stored likes.
    pub fn like_count(&self) -> usize {
        lock(&self.state).likes.len()
    }

    /// Returns the number of stored replies.
    pub fn reply_count(&self) -> usize {
        lock(&self.state).replies.len()
    }

    fn ensure_available(&self) -> PgResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            tracing::debug!(target: TRACING_TARGET_MEMORY, "memory store marked unavailable");
            return Err(PgError::Connection(ConnectionError::BadConnection(
                "memory store is unavailable".to_string(),
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("MemoryStore")
            .field("users", &state.users.len())
            .field("posts", &state.posts.len())
            .field("likes", &state.likes.len())
            .field("replies", &state.replies.len())
            .finish()
    }
}

impl Store for MemoryStore {
    type Connection = MemoryConnection;

    async fn connection(&self) -> PgResult<MemoryConnection> {
        self.ensure_available()?;
        Ok(MemoryConnection {
            state: Arc::clone(&self.state),
            stale_reads: Arc::clone(&self.stale_reads),
        })
    }

    async fn ping(&self) -> PgResult<()> {
        self.ensure_available()
    }
}

impl MemoryConnection {
    pub(super) fn state(&self) -> MutexGuard<'_, MemoryState> {
        lock(&self.state)
    }

    /// Whether lookups should miss rows, see [`MemoryStore::set_stale_reads`].
    pub(super) fn stale_reads(&self) -> bool {
        self.stale_reads.load(Ordering::SeqCst)
    }
}

/// Lock poisoning only happens when a test panicked mid-operation; the data is still usable.
fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tables of the in-memory database, keyed by id.
#[derive(Default)]
pub(super) struct MemoryState {
    last_id: i64,
    last_timestamp: Option<jiff::Timestamp>,
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    likes: BTreeMap<i64, Like>,
    replies: BTreeMap<i64, Reply>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Returns the current time, strictly after every timestamp handed out before.
    fn now(&mut self) -> jiff_diesel::Timestamp {
        let mut now = jiff::Timestamp::now();
        if let Some(last) = self.last_timestamp
            && now <= last
        {
            now = last
                .checked_add(jiff::SignedDuration::from_nanos(1))
                .unwrap_or(last);
        }
        self.last_timestamp = Some(now);
        jiff_diesel::Timestamp::from(now)
    }

    pub(super) fn create_user(&mut self, new_user: NewUser) -> PgResult<User> {
        if new_user.username.trim().is_empty() {
            return Err(violation::check("users_username_not_empty"));
        }
        if new_user.email.trim().is_empty() {
            return Err(violation::check("users_email_not_empty"));
        }
        if new_user.password_hash.is_empty() {
            return Err(violation::check("users_password_hash_not_empty"));
        }
        if self.username_exists(&new_user.username) {
            return Err(violation::unique("users_username_key"));
        }
        if self.email_exists(&new_user.email) {
            return Err(violation::unique("users_email_key"));
        }

        let now = self.now();
        let user = User {
            id: self.next_id(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            display_name: None,
            bio: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };

        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub(super) fn find_user_by_id(&self, user_id: i64) -> Option<User> {
        self.users.get(&user_id).cloned()
    }

    pub(super) fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.users
            .values()
            .find(|user| user.username == username)
            .cloned()
    }

    pub(super) fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users.values().find(|user| user.email == email).cloned()
    }

    pub(super) fn username_exists(&self, username: &str) -> bool {
        self.users.values().any(|user| user.username == username)
    }

    pub(super) fn email_exists(&self, email: &str) -> bool {
        self.users.values().any(|user| user.email == email)
    }

    pub(super) fn update_user(&mut self, user_id: i64, changes: &UpdateUser) -> Option<User> {
        let now = self.now();
        let user = self.users.get_mut(&user_id)?;
        changes.apply_to(user);
        user.updated_at = now;
        Some(user.clone())
    }

    /// Removes the user and everything that references them.
    pub(super) fn delete_user(&mut self, user_id: i64) -> bool {
        if self.users.remove(&user_id).is_none() {
            return false;
        }

        let owned_posts: Vec<i64> = self
            .posts
            .values()
            .filter(|post| post.user_id == user_id)
            .map(|post| post.id)
            .collect();
        for post_id in owned_posts {
            self.delete_post(post_id);
        }

        self.likes.retain(|_, like| like.user_id != user_id);
        self.replies.retain(|_, reply| reply.user_id != user_id);
        true
    }

    pub(super) fn create_post(&mut self, new_post: NewPost) -> PgResult<Post> {
        if !self.users.contains_key(&new_post.user_id) {
            return Err(violation::foreign_key("posts_user_id_fkey"));
        }
        if new_post.content.trim().is_empty() {
            return Err(violation::check("posts_content_not_empty"));
        }

        let now = self.now();
        let post = Post {
            id: self.next_id(),
            user_id: new_post.user_id,
            content: new_post.content,
            created_at: now,
            updated_at: now,
        };

        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    pub(super) fn find_post_by_id(&self, post_id: i64) -> Option<Post> {
        self.posts.get(&post_id).cloned()
    }

    pub(super) fn post_exists(&self, post_id: i64) -> bool {
        self.posts.contains_key(&post_id)
    }

    pub(super) fn find_post_view(&self, post_id: i64) -> Option<PostView> {
        self.posts.get(&post_id).and_then(|post| self.view(post))
    }

    pub(super) fn list_posts(&self, pagination: Pagination) -> Vec<PostView> {
        self.feed(|_| true)
            .into_iter()
            .skip(pagination.offset_usize())
            .take(pagination.limit_usize())
            .collect()
    }

    pub(super) fn list_user_posts(&self, user_id: i64) -> Vec<PostView> {
        self.feed(|post| post.user_id == user_id)
    }

    /// Removes the post with its likes and replies.
    pub(super) fn delete_post(&mut self, post_id: i64) -> bool {
        if self.posts.remove(&post_id).is_none() {
            return false;
        }

        self.likes.retain(|_, like| like.post_id != post_id);
        self.replies.retain(|_, reply| reply.post_id != post_id);
        true
    }

    pub(super) fn find_like(&self, user_id: i64, post_id: i64) -> Option<Like> {
        self.likes
            .values()
            .find(|like| like.user_id == user_id && like.post_id == post_id)
            .cloned()
    }

    pub(super) fn create_like(&mut self, new_like: NewLike) -> PgResult<Like> {
        if !self.users.contains_key(&new_like.user_id) {
            return Err(violation::foreign_key("likes_user_id_fkey"));
        }
        if !self.posts.contains_key(&new_like.post_id) {
            return Err(violation::foreign_key("likes_post_id_fkey"));
        }
        if self.find_like(new_like.user_id, new_like.post_id).is_some() {
            return Err(violation::unique("uix_user_post_like"));
        }

        let like = Like {
            id: self.next_id(),
            user_id: new_like.user_id,
            post_id: new_like.post_id,
            created_at: self.now(),
        };

        self.likes.insert(like.id, like.clone());
        Ok(like)
    }

    pub(super) fn count_likes(&self, post_id: i64) -> i64 {
        count(self.likes.values().filter(|like| like.post_id == post_id))
    }

    /// Toggles a like; with `stale_reads` the existing row is not seen and
    /// the insert hits the unique constraint.
    pub(super) fn toggle_like(
        &mut self,
        user_id: i64,
        post_id: i64,
        stale_reads: bool,
    ) -> PgResult<Option<LikeToggle>> {
        if !self.post_exists(post_id) {
            return Ok(None);
        }

        let existing = match stale_reads {
            true => None,
            false => self.find_like(user_id, post_id),
        };

        let liked = match existing {
            Some(like) => {
                self.likes.remove(&like.id);
                false
            }
            None => {
                self.create_like(NewLike { user_id, post_id })?;
                true
            }
        };

        Ok(Some(LikeToggle {
            liked,
            likes_count: self.count_likes(post_id),
        }))
    }

    pub(super) fn create_reply(&mut self, new_reply: NewReply) -> PgResult<Reply> {
        if !self.posts.contains_key(&new_reply.post_id) {
            return Err(violation::foreign_key("replies_post_id_fkey"));
        }
        if !self.users.contains_key(&new_reply.user_id) {
            return Err(violation::foreign_key("replies_user_id_fkey"));
        }
        if new_reply.content.trim().is_empty() {
            return Err(violation::check("replies_content_not_empty"));
        }

        let reply = Reply {
            id: self.next_id(),
            post_id: new_reply.post_id,
            user_id: new_reply.user_id,
            content: new_reply.content,
            created_at: self.now(),
        };

        self.replies.insert(reply.id, reply.clone());
        Ok(reply)
    }

    pub(super) fn list_replies(&self, post_id: i64) -> Vec<ReplyView> {
        let mut replies: Vec<&Reply> = self
            .replies
            .values()
            .filter(|reply| reply.post_id == post_id)
            .collect();
        replies.sort_by_key(|reply| (jiff::Timestamp::from(reply.created_at), reply.id));

        replies
            .into_iter()
            .filter_map(|reply| {
                let author = self.users.get(&reply.user_id)?;
                Some(ReplyView {
                    reply: reply.clone(),
                    username: author.username.clone(),
                })
            })
            .collect()
    }

    pub(super) fn count_replies(&self, post_id: i64) -> i64 {
        count(self.replies.values().filter(|reply| reply.post_id == post_id))
    }

    /// Posts matching `filter`, newest first with the id as tie-break.
    fn feed(&self, filter: impl Fn(&Post) -> bool) -> Vec<PostView> {
        let mut posts: Vec<&Post> = self.posts.values().filter(|post| filter(post)).collect();
        posts.sort_by_key(|post| {
            std::cmp::Reverse((jiff::Timestamp::from(post.created_at), post.id))
        });

        posts.into_iter().filter_map(|post| self.view(post)).collect()
    }

    fn view(&self, post: &Post) -> Option<PostView> {
        let author = self.users.get(&post.user_id)?;
        Some(PostView {
            post: post.clone(),
            username: author.username.clone(),
            display_name: author.display_name.clone(),
            likes_count: self.count_likes(post.id),
            replies_count: self.count_replies(post.id),
        })
    }
}

fn count<T>(rows: impl Iterator<Item = T>) -> i64 {
    i64::try_from(rows.count()).unwrap_or(i64::MAX)
}
