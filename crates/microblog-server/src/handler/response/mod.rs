//! Response types for HTTP handlers.

mod accounts;
mod authentications;
mod error_response;
mod monitors;
mod posts;

pub use accounts::*;
pub use authentications::*;
pub use error_response::*;
pub use monitors::*;
pub use posts::*;
