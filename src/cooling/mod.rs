//! Cooling control module.
//!
//! Provides profile normalization, temperature-based duty interpolation and
//! per-channel control logic.

mod controller;
pub mod curve;

pub use controller::{ChannelPlan, ChannelSettings, CoolingController, TempSource};
pub use curve::{ControlPoint, NormalizedCurve, delta, interpolate_profile, normalize_profile};
