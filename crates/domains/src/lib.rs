//! bump-board/crates/domains/src/lib.rs
//!
//! Domain vocabulary shared by every bump-board crate: identities, post
//! records, pagination results, error kinds, and the ports the engine
//! consumes from its host.

pub mod error;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
