//! Temperature/duty profiles and their normalized curves.
//!
//! A user profile is an arbitrary set of (temperature, duty) points. Before a
//! driver can use it, the profile is normalized into a sorted, monotonic curve
//! that is guaranteed to reach 100% duty by the critical temperature. The
//! driver then interpolates a duty for each temperature reading.

use std::cmp::Reverse;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LiquidError, Result};

// =============================================================================
// Control Point
// =============================================================================

/// A (temperature, duty) control point.
///
/// Serialized as a `[temp, duty]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct ControlPoint {
    /// Temperature in Celsius.
    pub temp: i32,
    /// Duty percentage (0-100).
    pub duty: i32,
}

impl ControlPoint {
    pub const fn new(temp: i32, duty: i32) -> Self {
        Self { temp, duty }
    }
}

impl From<(i32, i32)> for ControlPoint {
    fn from((temp, duty): (i32, i32)) -> Self {
        Self { temp, duty }
    }
}

impl From<ControlPoint> for (i32, i32) {
    fn from(point: ControlPoint) -> Self {
        (point.temp, point.duty)
    }
}

impl fmt::Display for ControlPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°C → {}%", self.temp, self.duty)
    }
}

// =============================================================================
// Normalized Curve
// =============================================================================

/// A profile in canonical form.
///
/// Temperatures are strictly increasing, duties never decrease, and the curve
/// ends as soon as duty reaches 100%. Only [`normalize_profile`] builds one, so
/// a `NormalizedCurve` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedCurve {
    points: Vec<ControlPoint>,
}

impl NormalizedCurve {
    /// The points of the curve, in ascending temperature order.
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The last point, where the curve saturates.
    pub fn last(&self) -> ControlPoint {
        self.points[self.points.len() - 1]
    }

    /// Duty for temperature `temp`.
    pub fn interpolate(&self, temp: i32) -> i32 {
        interpolate_sorted(&self.points, temp)
    }

    pub fn into_points(self) -> Vec<ControlPoint> {
        self.points
    }
}

impl AsRef<[ControlPoint]> for NormalizedCurve {
    fn as_ref(&self) -> &[ControlPoint] {
        &self.points
    }
}

impl fmt::Display for NormalizedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .points
            .iter()
            .map(|p| format!("({}, {})", p.temp, p.duty))
            .collect();
        write!(f, "[{}]", pairs.join(", "))
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Normalize a profile, enforcing a `(critx, 100)` fail-safe.
///
/// The points are sorted by temperature (higher duty first on ties), only the
/// first point of each temperature is kept, duties are raised so that they
/// never decrease, and everything after the first point at 100% is dropped.
///
/// # Example
/// ```
/// use liquid_rust_devices::cooling::{ControlPoint, normalize_profile};
///
/// let profile: Vec<ControlPoint> = [(30, 40), (25, 25), (35, 30), (40, 35), (40, 80)]
///     .into_iter()
///     .map(ControlPoint::from)
///     .collect();
/// let curve = normalize_profile(&profile, 60);
/// assert_eq!(curve.to_string(), "[(25, 25), (30, 40), (35, 40), (40, 80), (60, 100)]");
/// ```
pub fn normalize_profile(profile: &[ControlPoint], critx: i32) -> NormalizedCurve {
    let mut sorted: Vec<ControlPoint> = profile.to_vec();
    sorted.push(ControlPoint::new(critx, 100));
    sorted.sort_by_key(|p| (p.temp, Reverse(p.duty)));

    let mut points: Vec<ControlPoint> = Vec::with_capacity(sorted.len());
    for point in sorted {
        let point = match points.last() {
            None => point,
            Some(last) if point.temp == last.temp => continue,
            Some(last) => ControlPoint::new(point.temp, point.duty.max(last.duty)),
        };
        points.push(point);
        if point.duty >= 100 {
            break;
        }
    }

    NormalizedCurve { points }
}

// =============================================================================
// Interpolation
// =============================================================================

/// Interpolate the duty for temperature `temp` on a sorted curve.
///
/// The curve must be non-empty with strictly increasing temperatures, as
/// produced by [`normalize_profile`]. Outside of the curve's range the duty of
/// the nearest end is used. Results are rounded to the nearest integer, with
/// halfway values rounded to even.
///
/// # Errors
/// Returns `InvalidCurve` for an empty curve or one that is not sorted by
/// strictly increasing temperature.
///
/// # Example
/// ```
/// use liquid_rust_devices::cooling::{ControlPoint, interpolate_profile};
///
/// let curve = [ControlPoint::new(20, 50), ControlPoint::new(50, 70), ControlPoint::new(60, 100)];
/// assert_eq!(interpolate_profile(&curve, 33).unwrap(), 59);
/// ```
pub fn interpolate_profile(curve: &[ControlPoint], temp: i32) -> Result<i32> {
    if curve.is_empty() {
        return Err(LiquidError::InvalidCurve("Curve cannot be empty".into()));
    }
    if let Some(pair) = curve.windows(2).find(|w| w[0].temp >= w[1].temp) {
        return Err(LiquidError::InvalidCurve(format!(
            "Temperatures must be strictly increasing, found {} then {}",
            pair[0].temp, pair[1].temp
        )));
    }
    Ok(interpolate_sorted(curve, temp))
}

fn interpolate_sorted(curve: &[ControlPoint], temp: i32) -> i32 {
    let mut lower = curve[0];
    let mut upper = curve[curve.len() - 1];
    for &point in curve {
        if point.temp <= temp {
            lower = point;
        }
        if point.temp >= temp {
            upper = point;
            break;
        }
    }

    if lower.temp == upper.temp {
        return lower.duty;
    }

    // widen before subtracting, the curve may span the whole i32 range
    let ratio = (f64::from(temp) - f64::from(lower.temp))
        / (f64::from(upper.temp) - f64::from(lower.temp));
    let duty = f64::from(lower.duty) + ratio * (f64::from(upper.duty) - f64::from(lower.duty));
    duty.round_ties_even() as i32
}

/// Compute the (Δtemp, Δduty) of each segment of a profile.
pub fn delta(profile: &[ControlPoint]) -> Vec<(i64, i64)> {
    profile
        .windows(2)
        .map(|w| {
            (
                i64::from(w[1].temp) - i64::from(w[0].temp),
                i64::from(w[1].duty) - i64::from(w[0].duty),
            )
        })
        .collect()
}
