//! User repository: credential store and profile persistence.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{NewUser, UpdateUser, User};
use crate::{PgConn, PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for user accounts.
///
/// Uniqueness of username and email is enforced by the `users_username_key`
/// and `users_email_key` constraints; [`UserRepository::create_user`] surfaces
/// collisions as unique violations.
pub trait UserRepository {
    /// Inserts a new user.
    fn create_user(&mut self, new_user: NewUser) -> impl Future<Output = PgResult<User>> + Send;

    /// Finds a user by id.
    fn find_user_by_id(
        &mut self,
        user_id: i64,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Finds a user by exact username.
    fn find_user_by_username(
        &mut self,
        username: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Finds a user by normalized email address.
    fn find_user_by_email(
        &mut self,
        email: &str,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Writes the present profile fields and bumps `updated_at`.
    ///
    /// Returns `None` if the user does not exist.
    fn update_user(
        &mut self,
        user_id: i64,
        changes: UpdateUser,
    ) -> impl Future<Output = PgResult<Option<User>>> + Send;

    /// Deletes a user together with their posts, likes and replies.
    ///
    /// Returns whether a row was deleted.
    fn delete_user(&mut self, user_id: i64) -> impl Future<Output = PgResult<bool>> + Send;

    /// Returns whether the username is taken.
    fn username_exists(&mut self, username: &str) -> impl Future<Output = PgResult<bool>> + Send;

    /// Returns whether the email address is taken.
    fn email_exists(&mut self, email: &str) -> impl Future<Output = PgResult<bool>> + Send;
}

impl UserRepository for PgConn {
    async fn create_user(&mut self, new_user: NewUser) -> PgResult<User> {
        use schema::users;

        let conn: &mut PgConnection = self;
        let user = diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(conn)
            .await?;

        tracing::debug!(target: TRACING_TARGET_QUERY, user_id = user.id, "user created");
        Ok(user)
    }

    async fn find_user_by_id(&mut self, user_id: i64) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        let conn: &mut PgConnection = self;
        users::table
            .filter(dsl::id.eq(user_id))
            .select(User::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_user_by_username(&mut self, username: &str) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        let conn: &mut PgConnection = self;
        users::table
            .filter(dsl::username.eq(username))
            .select(User::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_user_by_email(&mut self, email: &str) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        let conn: &mut PgConnection = self;
        users::table
            .filter(dsl::email.eq(email))
            .select(User::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_user(&mut self, user_id: i64, changes: UpdateUser) -> PgResult<Option<User>> {
        use schema::users::{self, dsl};

        let now = jiff_diesel::Timestamp::from(jiff::Timestamp::now());
        let conn: &mut PgConnection = self;
        diesel::update(users::table.filter(dsl::id.eq(user_id)))
            .set((&changes, dsl::updated_at.eq(now)))
            .returning(User::as_returning())
            .get_result(conn)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn delete_user(&mut self, user_id: i64) -> PgResult<bool> {
        use schema::users::{self, dsl};

        let conn: &mut PgConnection = self;
        let deleted = diesel::delete(users::table.filter(dsl::id.eq(user_id)))
            .execute(conn)
            .await?;

        Ok(deleted > 0)
    }

    async fn username_exists(&mut self, username: &str) -> PgResult<bool> {
        use schema::users::{self, dsl};

        let conn: &mut PgConnection = self;
        diesel::select(diesel::dsl::exists(
            users::table.filter(dsl::username.eq(username)),
        ))
        .get_result(conn)
        .await
        .map_err(PgError::from)
    }

    async fn email_exists(&mut self, email: &str) -> PgResult<bool> {
        use schema::users::{self, dsl};

        let conn: &mut PgConnection = self;
        diesel::select(diesel::dsl::exists(users::table.filter(dsl::email.eq(email))))
            .get_result(conn)
            .await
            .map_err(PgError::from)
    }
}
