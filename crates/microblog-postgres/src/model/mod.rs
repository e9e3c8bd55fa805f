//! Diesel models for every table, plus the read-side views built from joins.

mod like;
mod post;
mod reply;
mod user;

pub use like::{Like, LikeToggle, NewLike};
pub use post::{NewPost, Post, PostView};
pub use reply::{NewReply, Reply, ReplyView};
pub use user::{NewUser, UpdateUser, User};
