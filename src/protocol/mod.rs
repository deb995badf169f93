//! Device-facing protocol pieces shared by drivers.
//!
//! This module contains speed channel descriptions, accessory identifiers
//! and protocol sequence numbering.

pub mod accessory;
pub mod channel;
pub mod sequence;

pub use accessory::{Hue2Accessory, KnownAccessory};
pub use channel::*;
pub use sequence::next_sequence;
