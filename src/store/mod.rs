//! Token store — in-memory maps for the demo's single-process lifetime.
//!
//! Nothing here survives a restart, which is the point: every browser
//! session starts over Unauthorized when the process does.

pub mod memory;
pub mod sweep;

pub use memory::TokenStore;
pub use sweep::sweep_daemon;
