// 🔑 Tax Map Key
// 13 digits: county (1) + zone (1) + section (1) + plat (3) + parcel (3) + CPR unit (4).
// Maui County is always county 2.

use crate::regions::{self, Region};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tmk(pub i64);

impl Tmk {
    const MAUI_COUNTY_PREFIX: i64 = 2_000_000_000_000;

    /// Accept only full 13-digit keys. A handful of RPAD rows carry
    /// truncated or garbled keys; those are dropped.
    pub fn parse(raw: &str) -> Option<Tmk> {
        let value: i64 = raw.trim().parse().ok()?;
        Tmk::new(value)
    }

    pub fn new(value: i64) -> Option<Tmk> {
        if value.to_string().len() == 13 {
            Some(Tmk(value))
        } else {
            None
        }
    }

    /// RPAD parcel ids drop the leading county digit
    pub fn from_parid(parid: i64) -> Option<Tmk> {
        Tmk::new(Self::MAUI_COUNTY_PREFIX + parid)
    }

    /// Parcel id given as text, e.g. in the sales extract
    pub fn parse_parid(raw: &str) -> Option<Tmk> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Tmk::parse(&format!("2{}", raw))
    }

    /// 2nd and 3rd digits
    pub fn zone_section(&self) -> u32 {
        ((self.0 / 10_000_000_000) % 100) as u32
    }

    pub fn region(&self) -> Option<Region> {
        Region::from_zone_section(self.zone_section())
    }

    pub fn is_west_maui(&self) -> bool {
        regions::is_west_maui(self.zone_section())
    }

    pub fn is_south_maui(&self) -> bool {
        regions::is_south_maui(self.zone_section())
    }

    pub fn is_central_maui(&self) -> bool {
        regions::is_central_maui(self.zone_section())
    }

    /// Digits 2-9 (zone through parcel) identify a property complex;
    /// every unit in a condo shares them.
    pub fn complex_id(&self) -> i64 {
        (self.0 % 1_000_000_000_000) / 10_000
    }
}

impl fmt::Display for Tmk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_requires_13_digits() {
        assert_eq!(Tmk::parse("2430060120000"), Some(Tmk(2430060120000)));
        assert_eq!(Tmk::parse(" 2430060120000 "), Some(Tmk(2430060120000)));
        assert_eq!(Tmk::parse("243006012000"), None);
        assert_eq!(Tmk::parse("24300601200001"), None);
        assert_eq!(Tmk::parse("abc"), None);
    }

    #[test]
    fn test_from_parid() {
        assert_eq!(Tmk::from_parid(430060120000), Some(Tmk(2430060120000)));
        assert_eq!(Tmk::parse_parid("390010020017"), Some(Tmk(2390010020017)));
        assert_eq!(Tmk::parse_parid(""), None);
    }

    #[test]
    fn test_components() {
        let tmk = Tmk(2390010020017);
        assert_eq!(tmk.zone_section(), 39);
        assert_eq!(tmk.region(), Some(Region::SouthMaui));
        assert_eq!(tmk.complex_id(), 39001002);
        assert!(tmk.is_south_maui());
        assert!(!tmk.is_west_maui());

        let lahaina = Tmk(2460100020005);
        assert_eq!(lahaina.zone_section(), 46);
        assert_eq!(lahaina.complex_id(), 46010002);
        assert!(lahaina.is_west_maui());
    }
}
