//! Vehicle product flags.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Error returned when a value cannot be rendered at the requested width.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlagsError {
    /// Width must be between 1 and 64 bits
    #[error("invalid flag width {0}: must be 1-64")]
    InvalidWidth(u32),

    /// Value has set bits beyond the requested width
    #[error("value {value} does not fit in {width} bits")]
    Overflow { value: u64, width: u32 },
}

/// Render `value` as binary digits, left-padded with zeros to `width`.
///
/// The value is never truncated: a value with bits above `width` is an
/// error.
///
/// # Examples
///
/// ```
/// use bvg_grabber::domain::encode_flags;
///
/// assert_eq!(encode_flags(0b1101110, 7).unwrap(), "1101110");
/// assert_eq!(encode_flags(0b00000001, 8).unwrap(), "00000001");
/// assert!(encode_flags(0b1000, 3).is_err());
/// ```
pub fn encode_flags(value: u64, width: u32) -> Result<String, FlagsError> {
    if width == 0 || width > u64::BITS {
        return Err(FlagsError::InvalidWidth(width));
    }

    if width < u64::BITS && value >> width != 0 {
        return Err(FlagsError::Overflow { value, width });
    }

    Ok(format!("{value:0width$b}", width = width as usize))
}

/// A set of vehicle products, as understood by the BVG timetable.
///
/// The upstream filter is a 7-bit mask with S-Bahn in the most
/// significant bit and InterCity in the least.
///
/// ```
/// use bvg_grabber::domain::Vehicles;
///
/// let v = Vehicles::S_BAHN | Vehicles::TRAM;
/// assert!(v.contains(Vehicles::TRAM));
/// assert!(!v.contains(Vehicles::BUS));
/// assert_eq!(v.encode().unwrap(), "1010000");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vehicles(u8);

impl Vehicles {
    pub const S_BAHN: Self = Self(64);
    pub const U_BAHN: Self = Self(32);
    pub const TRAM: Self = Self(16);
    pub const BUS: Self = Self(8);
    pub const FERRY: Self = Self(4);
    pub const REGIONAL: Self = Self(2);
    pub const INTERCITY: Self = Self(1);

    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(127);

    /// Width of the upstream `productsFilter` parameter.
    pub const WIDTH: u32 = 7;

    const NAMED: [(Self, &'static str); 7] = [
        (Self::S_BAHN, "S"),
        (Self::U_BAHN, "U"),
        (Self::TRAM, "TRAM"),
        (Self::BUS, "BUS"),
        (Self::FERRY, "FERRY"),
        (Self::REGIONAL, "RB"),
        (Self::INTERCITY, "IC"),
    ];

    /// Build a set from raw bits. Returns `None` if bits above the 7-bit
    /// mask are set.
    pub fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// Returns the raw bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag in `other` is also set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `self` with the flags of `other` cleared.
    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Render as the fixed-width binary string sent upstream.
    pub fn encode(self) -> Result<String, FlagsError> {
        encode_flags(u64::from(self.0), Self::WIDTH)
    }
}

impl BitOr for Vehicles {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Vehicles {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<Vehicles> for Vehicles {
    fn from_iter<I: IntoIterator<Item = Vehicles>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, |acc, v| acc | v)
    }
}

impl fmt::Debug for Vehicles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vehicles({self})")
    }
}

impl fmt::Display for Vehicles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let mut first = true;
        for (flag, name) in Self::NAMED {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Encoded length always equals the width, digits parse back to the value
        #[test]
        fn encode_width_and_value(width in 1u32..=64, raw in any::<u64>()) {
            let value = if width == 64 { raw } else { raw & ((1u64 << width) - 1) };
            let s = encode_flags(value, width).unwrap();
            prop_assert_eq!(s.len(), width as usize);
            prop_assert_eq!(u64::from_str_radix(&s, 2).unwrap(), value);
        }

        /// Any value with a bit at or above the width is rejected
        #[test]
        fn encode_overflow_rejected(width in 1u32..64, raw in any::<u64>()) {
            let value = raw | (1u64 << width);
            prop_assert!(encode_flags(value, width).is_err());
        }
    }
}
