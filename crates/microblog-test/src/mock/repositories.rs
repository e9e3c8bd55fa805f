//! Repository traits implemented over the in-memory tables.

use microblog_postgres::PgResult;
use microblog_postgres::model::{
    Like, LikeToggle, NewLike, NewPost, NewReply, NewUser, Post, PostView, Reply, ReplyView,
    UpdateUser, User,
};
use microblog_postgres::query::{LikeRepository, PostRepository, ReplyRepository, UserRepository};
use microblog_postgres::types::Pagination;

use super::MemoryConnection;

impl UserRepository for MemoryConnection {
    async fn create_user(&mut self, new_user: NewUser) -> PgResult<User> {
        self.state().create_user(new_user)
    }

    async fn find_user_by_id(&mut self, user_id: i64) -> PgResult<Option<User>> {
        Ok(self.state().find_user_by_id(user_id))
    }

    async fn find_user_by_username(&mut self, username: &str) -> PgResult<Option<User>> {
        Ok(self.state().find_user_by_username(username))
    }

    async fn find_user_by_email(&mut self, email: &str) -> PgResult<Option<User>> {
        Ok(self.state().find_user_by_email(email))
    }

    async fn update_user(&mut self, user_id: i64, changes: UpdateUser) -> PgResult<Option<User>> {
        Ok(self.state().update_user(user_id, &changes))
    }

    async fn delete_user(&mut self, user_id: i64) -> PgResult<bool> {
        Ok(self.state().delete_user(user_id))
    }

    async fn username_exists(&mut self, username: &str) -> PgResult<bool> {
        Ok(!self.stale_reads() && self.state().username_exists(username))
    }

    async fn email_exists(&mut self, email: &str) -> PgResult<bool> {
        Ok(!self.stale_reads() && self.state().email_exists(email))
    }
}

impl PostRepository for MemoryConnection {
    async fn create_post(&mut self, new_post: NewPost) -> PgResult<Post> {
        self.state().create_post(new_post)
    }

    async fn find_post_by_id(&mut self, post_id: i64) -> PgResult<Option<Post>> {
        Ok(self.state().find_post_by_id(post_id))
    }

    async fn find_post_view(&mut self, post_id: i64) -> PgResult<Option<PostView>> {
        Ok(self.state().find_post_view(post_id))
    }

    async fn list_posts(&mut self, pagination: Pagination) -> PgResult<Vec<PostView>> {
        Ok(self.state().list_posts(pagination))
    }

    async fn list_user_posts(&mut self, user_id: i64) -> PgResult<Vec<PostView>> {
        Ok(self.state().list_user_posts(user_id))
    }

    async fn delete_post(&mut self, post_id: i64) -> PgResult<bool> {
        Ok(self.state().delete_post(post_id))
    }

    async fn post_exists(&mut self, post_id: i64) -> PgResult<bool> {
        Ok(self.state().post_exists(post_id))
    }
}

impl LikeRepository for MemoryConnection {
    async fn toggle_like(&mut self, user_id: i64, post_id: i64) -> PgResult<Option<LikeToggle>> {
        let stale_reads = self.stale_reads();
        self.state().toggle_like(user_id, post_id, stale_reads)
    }

    async fn find_like(&mut self, user_id: i64, post_id: i64) -> PgResult<Option<Like>> {
        Ok(self.state().find_like(user_id, post_id))
    }

    async fn create_like(&mut self, new_like: NewLike) -> PgResult<Like> {
        self.state().create_like(new_like)
    }

    async fn count_likes(&mut self, post_id: i64) -> PgResult<i64> {
        Ok(self.state().count_likes(post_id))
    }
}

impl ReplyRepository for MemoryConnection {
    async fn create_reply(&mut self, new_reply: NewReply) -> PgResult<Reply> {
        self.state().create_reply(new_reply)
    }

    async fn list_replies(&mut self, post_id: i64) -> PgResult<Vec<ReplyView>> {
        Ok(self.state().list_replies(post_id))
    }

    async fn count_replies(&mut self, post_id: i64) -> PgResult<i64> {
        Ok(self.state().count_replies(post_id))
    }
}

#[cfg(test)]
mod tests {
    use microblog_postgres::Store;

    use super::*;
    use crate::MemoryStore;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        }
    }

    fn new_post(user_id: i64, content: &str) -> NewPost {
        NewPost {
            user_id,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_credentials_report_constraint() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut conn = store.connection().await?;
        conn.create_user(new_user("alice")).await?;

        let mut same_username = new_user("alice");
        same_username.email = "other@example.com".to_string();
        let err = conn.create_user(same_username).await.err();
        assert_eq!(
            err.as_ref().and_then(|e| e.constraint()),
            Some("users_username_key")
        );

        let mut same_email = new_user("bob");
        same_email.email = "alice@example.com".to_string();
        let err = conn.create_user(same_email).await.err();
        assert_eq!(
            err.as_ref().and_then(|e| e.constraint()),
            Some("users_email_key")
        );

        assert_eq!(store.user_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn feed_pages_are_disjoint_and_descending() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut conn = store.connection().await?;
        let user = conn.create_user(new_user("alice")).await?;
        for i in 0..5 {
            conn.create_post(new_post(user.id, &format!("post {i}"))).await?;
        }

        let first = conn.list_posts(Pagination::new(2, 0)).await?;
        let second = conn.list_posts(Pagination::new(2, 2)).await?;
        let ids: Vec<i64> = first.iter().chain(&second).map(|v| v.post.id).collect();

        assert_eq!(ids.len(), 4);
        assert!(ids.windows(2).all(|pair| pair[0] > pair[1]));
        assert_eq!(first[0].post.content, "post 4");
        Ok(())
    }

    #[tokio::test]
    async fn toggle_like_twice_restores_count() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut conn = store.connection().await?;
        let user = conn.create_user(new_user("alice")).await?;
        let post = conn.create_post(new_post(user.id, "hello")).await?;

        let liked = conn.toggle_like(user.id, post.id).await?;
        assert_eq!(
            liked,
            Some(LikeToggle {
                liked: true,
                likes_count: 1
            })
        );

        let unliked = conn.toggle_like(user.id, post.id).await?;
        assert_eq!(
            unliked,
            Some(LikeToggle {
                liked: false,
                likes_count: 0
            })
        );

        assert_eq!(conn.toggle_like(user.id, post.id + 100).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_like_is_unique_violation() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut conn = store.connection().await?;
        let user = conn.create_user(new_user("alice")).await?;
        let post = conn.create_post(new_post(user.id, "hello")).await?;

        conn.create_like(NewLike {
            user_id: user.id,
            post_id: post.id,
        })
        .await?;
        let err = conn
            .create_like(NewLike {
                user_id: user.id,
                post_id: post.id,
            })
            .await
            .err();

        assert!(err.as_ref().is_some_and(|e| e.is_unique_violation()));
        assert_eq!(conn.count_likes(post.id).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn stale_reads_leave_constraints_in_charge() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut conn = store.connection().await?;
        let user = conn.create_user(new_user("alice")).await?;
        let post = conn.create_post(new_post(user.id, "hello")).await?;
        conn.toggle_like(user.id, post.id).await?;

        store.set_stale_reads(true);
        assert!(!conn.username_exists("alice").await?);
        assert!(!conn.email_exists("alice@example.com").await?);

        let err = conn.create_user(new_user("alice")).await.err();
        assert_eq!(
            err.as_ref().and_then(|e| e.constraint()),
            Some("users_username_key")
        );

        let err = conn.toggle_like(user.id, post.id).await.err();
        assert!(err.as_ref().is_some_and(|e| e.is_unique_violation()));
        assert_eq!(store.like_count(), 1);

        store.set_stale_reads(false);
        assert!(conn.username_exists("alice").await?);
        Ok(())
    }

    #[tokio::test]
    async fn deleting_user_cascades() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut conn = store.connection().await?;
        let alice = conn.create_user(new_user("alice")).await?;
        let bob = conn.create_user(new_user("bob")).await?;
        let post = conn.create_post(new_post(alice.id, "hello")).await?;
        conn.toggle_like(bob.id, post.id).await?;
        conn.create_reply(NewReply {
            post_id: post.id,
            user_id: bob.id,
            content: "hi".to_string(),
        })
        .await?;

        assert!(conn.delete_user(alice.id).await?);
        assert_eq!(store.post_count(), 0);
        assert_eq!(store.like_count(), 0);
        assert_eq!(store.reply_count(), 0);
        assert!(!conn.delete_user(alice.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn reply_to_missing_post_is_foreign_key_violation() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut conn = store.connection().await?;
        let user = conn.create_user(new_user("alice")).await?;

        let err = conn
            .create_reply(NewReply {
                post_id: 42,
                user_id: user.id,
                content: "hi".to_string(),
            })
            .await
            .err();

        assert!(err.as_ref().is_some_and(|e| e.is_foreign_key_violation()));
        assert_eq!(
            err.as_ref().and_then(|e| e.constraint()),
            Some("replies_post_id_fkey")
        );
        Ok(())
    }

    #[tokio::test]
    async fn update_user_keeps_absent_fields() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut conn = store.connection().await?;
        let user = conn.create_user(new_user("alice")).await?;

        let changes = UpdateUser {
            bio: Some("hello".to_string()),
            ..Default::default()
        };
        let updated = conn.update_user(user.id, changes).await?;
        let changes = UpdateUser {
            display_name: Some("Alice".to_string()),
            ..Default::default()
        };
        let updated_again = conn.update_user(user.id, changes).await?;

        let updated = updated.ok_or_else(|| anyhow::anyhow!("user missing"))?;
        let updated_again = updated_again.ok_or_else(|| anyhow::anyhow!("user missing"))?;
        assert_eq!(updated_again.bio.as_deref(), Some("hello"));
        assert_eq!(updated_again.display_name.as_deref(), Some("Alice"));
        assert!(
            jiff::Timestamp::from(updated_again.updated_at)
                > jiff::Timestamp::from(updated.updated_at)
        );
        Ok(())
    }

    #[tokio::test]
    async fn unavailable_store_fails_ping() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        store.ping().await?;

        store.set_available(false);
        assert!(store.ping().await.is_err());
        assert!(store.connection().await.is_err());

        store.set_available(true);
        store.ping().await?;
        Ok(())
    }
}
