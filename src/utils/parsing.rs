//! Parsing utilities for CLI arguments and configuration values.
//!
//! This module provides reusable parsing functions for common input formats
//! used throughout the application.

use crate::config::SpeedProfile;
use crate::cooling::ControlPoint;
use crate::error::{LiquidError, Result};

// =============================================================================
// Profile Point Parsing
// =============================================================================

/// Parse alternating temperature and duty values into control points.
///
/// # Example
/// ```
/// use liquid_rust_devices::utils::parsing::parse_profile_pairs;
/// use liquid_rust_devices::cooling::ControlPoint;
///
/// let points = parse_profile_pairs(&["20", "30", "40", "50"]).unwrap();
/// assert_eq!(points, vec![ControlPoint::new(20, 30), ControlPoint::new(40, 50)]);
/// ```
pub fn parse_profile_pairs<S: AsRef<str>>(values: &[S]) -> Result<Vec<ControlPoint>> {
    if values.len() % 2 != 0 {
        return Err(LiquidError::InvalidInput(format!(
            "Expected temperature/duty pairs, got {} values",
            values.len()
        )));
    }

    let numbers = values
        .iter()
        .map(|v| {
            let v = v.as_ref().trim();
            v.parse::<i32>()
                .map_err(|_| LiquidError::InvalidInput(format!("Not an integer: '{}'", v)))
        })
        .collect::<Result<Vec<i32>>>()?;

    Ok(numbers
        .chunks_exact(2)
        .map(|pair| ControlPoint::new(pair[0], pair[1]))
        .collect())
}

// =============================================================================
// Speed Profile Parsing
// =============================================================================

/// Parse a speed profile name into a SpeedProfile enum.
///
/// # Arguments
/// * `name` - Profile name: "silent", "performance", or "fixed:XX"
///
/// # Example
/// ```
/// use liquid_rust_devices::utils::parsing::parse_speed_profile;
/// use liquid_rust_devices::config::SpeedProfile;
///
/// let profile = parse_speed_profile("silent").unwrap();
/// assert!(matches!(profile, SpeedProfile::Silent));
///
/// let fixed = parse_speed_profile("fixed:75").unwrap();
/// assert!(matches!(fixed, SpeedProfile::Fixed(75)));
/// ```
pub fn parse_speed_profile(name: &str) -> Result<SpeedProfile> {
    let lower = name.to_lowercase();

    if lower == "silent" {
        return Ok(SpeedProfile::Silent);
    }

    if lower == "performance" {
        return Ok(SpeedProfile::Performance);
    }

    if let Some(rest) = lower.strip_prefix("fixed:") {
        let duty: i32 = rest
            .parse()
            .ok()
            .filter(|d| (0..=100).contains(d))
            .ok_or_else(|| {
                LiquidError::InvalidInput(
                    "Invalid duty value. Use 'fixed:XX' where XX is 0-100".into(),
                )
            })?;
        return Ok(SpeedProfile::Fixed(duty));
    }

    Err(LiquidError::InvalidInput(format!(
        "Unknown profile '{}'. Use: silent, performance, or fixed:XX",
        name
    )))
}

// =============================================================================
// Device Id Parsing
// =============================================================================

/// Parse a `vvvv:pppp` hexadecimal vendor/product id pair.
pub fn parse_device_id(id: &str) -> Result<(u16, u16)> {
    let invalid = || {
        LiquidError::InvalidInput(format!(
            "Invalid device id '{}'. Use VID:PID in hex, e.g. 1e71:170e",
            id
        ))
    };

    let (vid, pid) = id.split_once(':').ok_or_else(invalid)?;
    let parse = |s: &str| {
        let s = s.trim();
        let s = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u16::from_str_radix(s, 16).map_err(|_| invalid())
    };
    Ok((parse(vid)?, parse(pid)?))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_pairs() {
        let points = parse_profile_pairs(&["25", "25", " 30", "40 "]).unwrap();
        assert_eq!(points, vec![ControlPoint::new(25, 25), ControlPoint::new(30, 40)]);
        assert!(parse_profile_pairs::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_profile_pairs_invalid() {
        assert!(parse_profile_pairs(&["20", "30", "40"]).is_err());
        assert!(parse_profile_pairs(&["20", "abc"]).is_err());
        assert!(parse_profile_pairs(&["20.5", "30"]).is_err());
    }

    #[test]
    fn test_parse_speed_profile() {
        assert!(matches!(
            parse_speed_profile("silent").unwrap(),
            SpeedProfile::Silent
        ));
        assert!(matches!(
            parse_speed_profile("PERFORMANCE").unwrap(),
            SpeedProfile::Performance
        ));
        assert!(matches!(
            parse_speed_profile("fixed:50").unwrap(),
            SpeedProfile::Fixed(50)
        ));
    }

    #[test]
    fn test_parse_speed_profile_invalid() {
        assert!(parse_speed_profile("fixed:101").is_err());
        assert!(parse_speed_profile("fixed:").is_err());
        assert!(parse_speed_profile("turbo").is_err());
    }

    #[test]
    fn test_parse_device_id() {
        assert_eq!(parse_device_id("1e71:170e").unwrap(), (0x1e71, 0x170e));
        assert_eq!(parse_device_id("0x1B1C:0x0C18").unwrap(), (0x1b1c, 0x0c18));
        assert!(parse_device_id("1e71").is_err());
        assert!(parse_device_id("zzzz:170e").is_err());
    }
}
