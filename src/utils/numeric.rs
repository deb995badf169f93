//! Numeric helpers shared by the profile engine and the drivers.

use std::fmt::Debug;

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use crate::error::{LiquidError, Result};

/// Clamp `value` to the closed interval `[min, max]`.
///
/// Saturates silently; a debug record is emitted when the value changed.
pub fn clamp<T: PartialOrd + Copy + Debug>(value: T, min: T, max: T) -> T {
    let clamped = if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    };
    if clamped != value {
        debug!("clamped {:?} to interval [{:?}, {:?}]", value, min, max);
    }
    clamped
}

/// Express `ratio` xor `percentage` as a fraction of 255.
///
/// Exactly one of the arguments must be given. Halfway values round to even.
///
/// # Example
/// ```
/// use liquid_rust_devices::utils::numeric::fraction_of_byte;
///
/// assert_eq!(fraction_of_byte(Some(0.8), None).unwrap(), 204);
/// assert_eq!(fraction_of_byte(None, Some(20.0)).unwrap(), 51);
/// ```
pub fn fraction_of_byte(ratio: Option<f64>, percentage: Option<f64>) -> Result<u8> {
    let ratio = match (ratio, percentage) {
        (Some(ratio), None) => ratio,
        (None, Some(percentage)) => percentage / 100.0,
        (Some(_), Some(_)) => {
            return Err(LiquidError::InvalidArgument(
                "Only one of ratio or percentage may be given".into(),
            ));
        }
        (None, None) => {
            return Err(LiquidError::InvalidArgument(
                "Either ratio or percentage must be given".into(),
            ));
        }
    };

    if !(0.0..=1.0).contains(&ratio) {
        return Err(LiquidError::InvalidArgument(format!(
            "Cannot express ratio {} outside of [0, 1]",
            ratio
        )));
    }

    Ok((ratio * 255.0).round_ties_even() as u8)
}

/// Read an unsigned 16-bit little-endian integer from `buffer` at `offset`.
pub fn u16le_from(buffer: &[u8], offset: usize) -> Result<u16> {
    let bytes = offset
        .checked_add(2)
        .and_then(|end| buffer.get(offset..end))
        .ok_or_else(|| {
            LiquidError::InvalidArgument(format!(
                "Buffer of {} bytes has no u16 at offset {}",
                buffer.len(),
                offset
            ))
        })?;
    Ok(LittleEndian::read_u16(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_inside_interval() {
        assert_eq!(clamp(50, 0, 100), 50);
        assert_eq!(clamp(0, 0, 100), 0);
        assert_eq!(clamp(100, 0, 100), 100);
    }

    #[test]
    fn test_clamp_saturates() {
        assert_eq!(clamp(-5, 0, 100), 0);
        assert_eq!(clamp(120, 25, 100), 100);
        assert_eq!(clamp(10, 25, 100), 25);
        assert_eq!(clamp(1.5_f64, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_fraction_of_byte_ratio() {
        assert_eq!(fraction_of_byte(Some(0.8), None).unwrap(), 204);
        assert_eq!(fraction_of_byte(Some(0.0), None).unwrap(), 0);
        assert_eq!(fraction_of_byte(Some(1.0), None).unwrap(), 255);
    }

    #[test]
    fn test_fraction_of_byte_percentage() {
        assert_eq!(fraction_of_byte(None, Some(20.0)).unwrap(), 51);
        assert_eq!(fraction_of_byte(None, Some(100.0)).unwrap(), 255);
    }

    #[test]
    fn test_fraction_of_byte_rounds_half_to_even() {
        // 0.5 * 255 = 127.5
        assert_eq!(fraction_of_byte(Some(0.5), None).unwrap(), 128);
    }

    #[test]
    fn test_fraction_of_byte_rejects_both_or_neither() {
        assert!(matches!(
            fraction_of_byte(Some(0.5), Some(50.0)),
            Err(LiquidError::InvalidArgument(_))
        ));
        assert!(matches!(
            fraction_of_byte(None, None),
            Err(LiquidError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_fraction_of_byte_rejects_out_of_range() {
        assert!(fraction_of_byte(Some(1.01), None).is_err());
        assert!(fraction_of_byte(Some(-0.1), None).is_err());
        assert!(fraction_of_byte(None, Some(120.0)).is_err());
        assert!(fraction_of_byte(Some(f64::NAN), None).is_err());
    }

    #[test]
    fn test_u16le_from() {
        let buf = [0x45, 0x05, 0x03];
        assert_eq!(u16le_from(&buf, 0).unwrap(), 1349);
        assert_eq!(u16le_from(&buf, 1).unwrap(), 773);
        assert!(u16le_from(&buf, 2).is_err());
    }
}
