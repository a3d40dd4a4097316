//! bump-board/crates/services/src/lib.rs
//!
//! The ordered-collection engine: a front-inserting list with stable ids,
//! the owner/lock state machine guarding it, and the board and thread
//! records built from those pieces. [`Registry`] hosts boards and threads
//! side by side and wires a thread's post to its board's bump.

pub mod access;
pub mod board;
pub mod identity_index;
pub mod indexed_list;
pub mod registry;
pub mod thread;

pub use access::{AccessController, AccessState};
pub use board::Board;
pub use identity_index::IdentityIndex;
pub use indexed_list::IndexedList;
pub use registry::Registry;
pub use thread::{Thread, ThreadParent};
