//! Liquid Rust Devices Library
//!
//! Fan and pump speed profiles for liquid coolers and power supplies.
//!
//! # Features
//!
//! - Normalize user profiles into monotonic curves with a 100% fail-safe
//! - Interpolate duty cycles from temperature readings
//! - Per-device channel limits and profile layouts through a static registry
//! - Runtime key/value storage for per-device protocol state
//!
//! # Example
//!
//! ```
//! use liquid_rust_devices::cooling::{ControlPoint, normalize_profile};
//! use liquid_rust_devices::device;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Normalize a profile and read the duty at 33°C
//!     let profile = [ControlPoint::new(20, 50), ControlPoint::new(50, 70)];
//!     let curve = normalize_profile(&profile, 60);
//!     assert_eq!(curve.interpolate(33), 59);
//!
//!     // Or let a device family apply its own limits
//!     let entry = device::find(0x1e71, 0x170e, 0)?;
//!     let mut kraken = (entry.build)();
//!     kraken.set_speed_profile("pump", &profile)?;
//!     assert_eq!(kraken.duty_for("pump", 20)?, 50);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cooling;
pub mod device;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod utils;

// Re-exports for convenience
pub use cooling::{ControlPoint, CoolingController, NormalizedCurve};
pub use cooling::{interpolate_profile, normalize_profile};
pub use error::{LiquidError, Result};
pub use utils::numeric::{clamp, fraction_of_byte};
