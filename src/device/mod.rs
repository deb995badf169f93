//! Device abstraction layer.
//!
//! Maps supported devices to the cooling controllers of their families.

pub mod registry;

pub use registry::{DeviceEntry, SUPPORTED_DEVICES, find, matching};
