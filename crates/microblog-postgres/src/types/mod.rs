//! Constraint catalog, pagination and shared model helpers.

pub mod constants;
mod constraint;
mod pagination;
mod timestamps;

pub use constraint::{
    ConstraintCategory, ConstraintViolation, LikeConstraints, PostConstraints, ReplyConstraints,
    UserConstraints,
};
pub use pagination::Pagination;
pub use timestamps::{HasCreatedAt, HasUpdatedAt};
