//! Session identity and access-token retrieval.

pub mod access;
pub mod session;

pub use access::get_valid_access_token;
pub use session::{Session, SessionSigner};
