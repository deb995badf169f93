//! Speed channel descriptions.
//!
//! Each driver exposes its cooling capabilities as a small table of channels,
//! with the duty range the hardware accepts and the way it stores profiles.

use crate::error::{LiquidError, Result};
use crate::utils::numeric::clamp;

// =============================================================================
// Profile Support
// =============================================================================

/// Temperatures at which Kraken X (gen3) firmware stores a speed profile.
///
/// Both channels must share the same set, so the interval is trimmed to the
/// most useful range: every degree up to 49°C, every other degree up to 58°C,
/// then the critical temperature.
pub const KRAKEN_X2_PROFILE_TEMPS: [i32; 36] = [
    20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42,
    43, 44, 45, 46, 47, 48, 49, 50, 52, 54, 56, 58, 60,
];

/// How a channel stores a temperature-driven speed profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSupport {
    /// Only fixed duties can be set.
    FixedOnly,
    /// The device stores the duty for each of a fixed set of temperatures.
    Sampled(&'static [i32]),
    /// The device stores exactly this many (temperature, duty) points.
    Padded(usize),
}

// =============================================================================
// Speed Channel
// =============================================================================

/// A fan or pump channel of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedChannel {
    /// Channel name, e.g. "fan", "pump" or "fan1".
    pub name: &'static str,
    /// Minimum duty accepted by the hardware.
    pub min_duty: i32,
    /// Maximum duty accepted by the hardware.
    pub max_duty: i32,
    pub profile: ProfileSupport,
    /// The hardware has a fixed duty mode of its own, separate from profiles.
    pub fixed_duty_mode: bool,
}

impl SpeedChannel {
    pub const fn new(
        name: &'static str,
        min_duty: i32,
        max_duty: i32,
        profile: ProfileSupport,
    ) -> Self {
        Self {
            name,
            min_duty,
            max_duty,
            profile,
            fixed_duty_mode: false,
        }
    }

    /// Mark the channel as having a native fixed duty mode.
    pub const fn with_fixed_duty_mode(mut self) -> Self {
        self.fixed_duty_mode = true;
        self
    }

    pub const fn supports_profiles(&self) -> bool {
        !matches!(self.profile, ProfileSupport::FixedOnly)
    }

    /// Saturate a duty into this channel's range.
    pub fn clamp_duty(&self, duty: i32) -> i32 {
        clamp(duty, self.min_duty, self.max_duty)
    }

    /// Validate a duty cycle value for this channel.
    pub fn validate_duty(&self, duty: i32) -> Result<i32> {
        if duty < self.min_duty || duty > self.max_duty {
            return Err(LiquidError::InvalidInput(format!(
                "Invalid duty {}% for {}. Valid range: {}%-{}%",
                duty, self.name, self.min_duty, self.max_duty
            )));
        }
        Ok(duty)
    }
}

impl std::fmt::Display for SpeedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}-{}%)", self.name, self.min_duty, self.max_duty)
    }
}
