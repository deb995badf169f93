//! Speed profile configurations.
//!
//! Provides pre-defined profiles and custom profile building.

use crate::cooling::{ControlPoint, NormalizedCurve, normalize_profile};

// =============================================================================
// Speed Profiles
// =============================================================================

/// Pre-defined speed profile.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeedProfile {
    /// Silent mode - low speeds, ramps up only at high temps.
    Silent,
    /// Performance mode - aggressive cooling curve.
    Performance,
    /// Fixed speed below the critical temperature.
    Fixed(i32),
    /// Custom temperature/duty curve.
    Custom(Vec<ControlPoint>),
}

impl SpeedProfile {
    /// The raw profile points, before normalization.
    pub fn points(&self, critical_temperature: i32) -> Vec<ControlPoint> {
        match self {
            SpeedProfile::Silent => PROFILE_SILENT.to_vec(),
            SpeedProfile::Performance => PROFILE_PERFORMANCE.to_vec(),
            SpeedProfile::Fixed(duty) => vec![
                ControlPoint::new(0, *duty),
                ControlPoint::new(critical_temperature - 1, *duty),
            ],
            SpeedProfile::Custom(points) => points.clone(),
        }
    }

    /// Normalize this profile against `critical_temperature`.
    pub fn to_curve(&self, critical_temperature: i32) -> NormalizedCurve {
        normalize_profile(&self.points(critical_temperature), critical_temperature)
    }

    /// Get profile name for display.
    pub fn name(&self) -> &'static str {
        match self {
            SpeedProfile::Silent => "Silent",
            SpeedProfile::Performance => "Performance",
            SpeedProfile::Fixed(_) => "Fixed",
            SpeedProfile::Custom(_) => "Custom",
        }
    }
}

impl std::fmt::Display for SpeedProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeedProfile::Fixed(duty) => write!(f, "Fixed ({}%)", duty),
            _ => write!(f, "{}", self.name()),
        }
    }
}

// =============================================================================
// Pre-defined Profile Curves
// =============================================================================

/// Silent profile - minimal noise, ramps at 50°C+.
pub const PROFILE_SILENT: [ControlPoint; 7] = [
    ControlPoint::new(20, 25),
    ControlPoint::new(30, 25),
    ControlPoint::new(40, 25),
    ControlPoint::new(45, 25),
    ControlPoint::new(50, 55),
    ControlPoint::new(55, 75),
    ControlPoint::new(58, 90),
];

/// Performance profile - aggressive cooling.
pub const PROFILE_PERFORMANCE: [ControlPoint; 5] = [
    ControlPoint::new(20, 50),
    ControlPoint::new(30, 55),
    ControlPoint::new(40, 65),
    ControlPoint::new(50, 80),
    ControlPoint::new(55, 90),
];

/// Fail-safe temperature of every supported cooler, and of stored profiles
/// that do not set their own.
pub const DEFAULT_CRITICAL_TEMPERATURE: i32 = 60;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_profile() {
        let curve = SpeedProfile::Silent.to_curve(60);
        // At 20°C should be 25%
        assert_eq!(curve.interpolate(20), 25);
        // Fail-safe at the critical temperature
        assert_eq!(curve.interpolate(60), 100);
        assert_eq!(curve.last(), ControlPoint::new(60, 100));
    }

    #[test]
    fn test_performance_profile() {
        let curve = SpeedProfile::Performance.to_curve(60);
        assert_eq!(curve.interpolate(35), 60);
        assert_eq!(curve.interpolate(10), 50);
    }

    #[test]
    fn test_fixed_profile() {
        let curve = SpeedProfile::Fixed(60).to_curve(60);
        assert!((0..60).all(|t| curve.interpolate(t) == 60));
        assert_eq!(curve.interpolate(60), 100);
    }

    #[test]
    fn test_custom_profile() {
        let custom = SpeedProfile::Custom(vec![
            ControlPoint::new(20, 30),
            ControlPoint::new(40, 50),
            ControlPoint::new(50, 100),
        ]);
        let curve = custom.to_curve(60);
        assert_eq!(curve.interpolate(20), 30);
        assert_eq!(curve.last(), ControlPoint::new(50, 100));
    }

    #[test]
    fn test_display() {
        assert_eq!(SpeedProfile::Fixed(40).to_string(), "Fixed (40%)");
        assert_eq!(SpeedProfile::Silent.to_string(), "Silent");
    }
}
