//! Station names.

use std::fmt;

/// Error returned when a station name cannot be used in a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station name: {reason}")]
pub struct InvalidStation {
    reason: &'static str,
}

/// A station name as typed by the user.
///
/// The BVG endpoints expect the `input` parameter in ISO-8859-1, so a
/// `Station` carries that encoding alongside the name and can only be
/// built from names that are representable in it.
///
/// # Examples
///
/// ```
/// use bvg_grabber::domain::Station;
///
/// let s = Station::parse("Schönhauser Allee").unwrap();
/// assert_eq!(s.as_str(), "Schönhauser Allee");
/// assert_eq!(s.latin1()[3], 0xF6);
///
/// // Not representable in ISO-8859-1
/// assert!(Station::parse("Łódź").is_err());
/// assert!(Station::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Station {
    name: String,
    latin1: Vec<u8>,
}

impl Station {
    /// Parse a station name. Surrounding whitespace is trimmed.
    pub fn parse(name: &str) -> Result<Self, InvalidStation> {
        let name = name.trim();

        if name.is_empty() {
            return Err(InvalidStation {
                reason: "must not be empty",
            });
        }

        let latin1 = name
            .chars()
            .map(|c| u8::try_from(u32::from(c)).ok())
            .collect::<Option<Vec<u8>>>()
            .ok_or(InvalidStation {
                reason: "must be representable in ISO-8859-1",
            })?;

        Ok(Self {
            name: name.to_string(),
            latin1,
        })
    }

    /// Returns the station name.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Returns the ISO-8859-1 encoding of the name.
    pub fn latin1(&self) -> &[u8] {
        &self.latin1
    }
}

impl fmt::Debug for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Station({})", self.name)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
