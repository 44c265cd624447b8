use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum value of a 48-bit AS number.
pub const MAX_AS: u64 = (1 << 48) - 1;

/// AS numbers up to this value print in decimal; larger ones print as
/// colon-separated 16-bit hex groups.
const MAX_DECIMAL_AS: u64 = u32::MAX as u64;

/// Numeric routing-domain (isolation domain) identifier.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Isd(pub u16);

impl Isd {
    pub fn value(self) -> u16 {
        self.0
    }
}

impl From<u16> for Isd {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

impl fmt::Debug for Isd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Isd({})", self.0)
    }
}

impl fmt::Display for Isd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Isd {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u16>()
            .map(Isd)
            .map_err(|_| TypeError::InvalidIsd(s.to_string()))
    }
}

/// Combined domain + address identifier: one participant within a routing
/// domain.
///
/// The textual form is `I-A`, where `I` is the decimal ISD and `A` is the
/// 48-bit AS number. Small AS numbers (up to 2^32 - 1) render in decimal;
/// larger ones render as three colon-separated 16-bit hex groups, e.g.
/// `1-ff00:0:311`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IsdAs {
    pub isd: Isd,
    #[serde(rename = "as")]
    pub asn: u64,
}

impl IsdAs {
    /// Build from raw parts. Returns an error if the AS exceeds 48 bits.
    pub fn new(isd: Isd, asn: u64) -> Result<Self, TypeError> {
        if asn > MAX_AS {
            return Err(TypeError::InvalidAs(format!("{asn:#x} exceeds 48 bits")));
        }
        Ok(Self { isd, asn })
    }

    fn fmt_as(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.asn <= MAX_DECIMAL_AS {
            write!(f, "{}", self.asn)
        } else {
            write!(
                f,
                "{:x}:{:x}:{:x}",
                (self.asn >> 32) & 0xffff,
                (self.asn >> 16) & 0xffff,
                self.asn & 0xffff
            )
        }
    }
}

fn parse_as(s: &str) -> Result<u64, TypeError> {
    if s.contains(':') {
        let groups: Vec<&str> = s.split(':').collect();
        if groups.len() != 3 {
            return Err(TypeError::InvalidAs(format!(
                "expected 3 hex groups, got {} in {s:?}",
                groups.len()
            )));
        }
        let mut asn: u64 = 0;
        for group in groups {
            let part = u64::from_str_radix(group, 16)
                .map_err(|_| TypeError::InvalidAs(format!("bad hex group {group:?} in {s:?}")))?;
            if part > 0xffff {
                return Err(TypeError::InvalidAs(format!(
                    "group {group:?} exceeds 16 bits in {s:?}"
                )));
            }
            asn = (asn << 16) | part;
        }
        Ok(asn)
    } else {
        let asn = s
            .parse::<u64>()
            .map_err(|_| TypeError::InvalidAs(s.to_string()))?;
        if asn > MAX_DECIMAL_AS {
            return Err(TypeError::InvalidAs(format!(
                "decimal AS {asn} too large; use the hex-group form"
            )));
        }
        Ok(asn)
    }
}

impl fmt::Debug for IsdAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IsdAs({self})")
    }
}

impl fmt::Display for IsdAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-", self.isd)?;
        self.fmt_as(f)
    }
}

impl FromStr for IsdAs {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (isd, asn) = s
            .split_once('-')
            .ok_or_else(|| TypeError::InvalidIsdAs(s.to_string()))?;
        Self::new(isd.parse()?, parse_as(asn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_hex_group_form() {
        let ia: IsdAs = "1-ff00:0:311".parse().unwrap();
        assert_eq!(ia.isd, Isd(1));
        assert_eq!(ia.asn, 0xff00_0000_0311);
    }

    #[test]
    fn parse_decimal_form() {
        let ia: IsdAs = "3-65001".parse().unwrap();
        assert_eq!(ia.isd, Isd(3));
        assert_eq!(ia.asn, 65001);
    }

    #[test]
    fn display_hex_group_form() {
        let ia = IsdAs::new(Isd(1), 0xff00_0000_0311).unwrap();
        assert_eq!(ia.to_string(), "1-ff00:0:311");
    }

    #[test]
    fn display_decimal_form() {
        let ia = IsdAs::new(Isd(2), 42).unwrap();
        assert_eq!(ia.to_string(), "2-42");
    }

    #[test]
    fn rejects_as_above_48_bits() {
        assert!(IsdAs::new(Isd(1), MAX_AS + 1).is_err());
    }

    #[test]
    fn rejects_large_decimal_as() {
        // Above 2^32 - 1 the hex-group form is mandatory.
        assert!("1-4294967296".parse::<IsdAs>().is_err());
    }

    #[test]
    fn rejects_missing_separator() {
        assert!("1ff00:0:311".parse::<IsdAs>().is_err());
    }

    #[test]
    fn rejects_wrong_group_count() {
        assert!("1-ff00:0:0:311".parse::<IsdAs>().is_err());
    }

    #[test]
    fn rejects_oversized_group() {
        assert!("1-fffff:0:311".parse::<IsdAs>().is_err());
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(isd in any::<u16>(), asn in 0..=MAX_AS) {
            let ia = IsdAs::new(Isd(isd), asn).unwrap();
            let parsed: IsdAs = ia.to_string().parse().unwrap();
            prop_assert_eq!(ia, parsed);
        }
    }
}
