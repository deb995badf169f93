//! Profile storage and persistence module.
//!
//! Handles saving and loading user profiles to/from disk, and the runtime
//! key/value stores drivers keep their protocol state in.

pub mod profiles;
pub mod runtime;

// Re-export commonly used items
pub use profiles::*;
pub use runtime::{KeyValueStore, MemoryStorage, RuntimeStorage};
