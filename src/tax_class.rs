// 🏷️ Tax Rate Classes
// RPAD files carry a numeric code (0-12); CSV outputs carry the label.

use crate::error::HousingError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaxClass {
    #[serde(rename = "timeshare")]
    Timeshare,
    #[serde(rename = "non-owner-occupied")]
    NonOwnerOccupied,
    #[serde(rename = "apartment")]
    Apartment,
    #[serde(rename = "commercial")]
    Commercial,
    #[serde(rename = "industrial")]
    Industrial,
    #[serde(rename = "agricultural")]
    Agricultural,
    #[serde(rename = "conservation")]
    Conservation,
    #[serde(rename = "hotel/resort")]
    HotelResort,
    /// Code 8 is unused in the published layout
    #[serde(rename = "")]
    Unassigned,
    #[serde(rename = "owner-occupied")]
    OwnerOccupied,
    #[serde(rename = "commercialized-res")]
    CommercializedResidential,
    #[serde(rename = "tvr-strh")]
    TvrStrh,
    #[serde(rename = "long-term-rental")]
    LongTermRental,
}

/// Code order as published by RPAD
const BY_CODE: [TaxClass; 13] = [
    TaxClass::Timeshare,
    TaxClass::NonOwnerOccupied,
    TaxClass::Apartment,
    TaxClass::Commercial,
    TaxClass::Industrial,
    TaxClass::Agricultural,
    TaxClass::Conservation,
    TaxClass::HotelResort,
    TaxClass::Unassigned,
    TaxClass::OwnerOccupied,
    TaxClass::CommercializedResidential,
    TaxClass::TvrStrh,
    TaxClass::LongTermRental,
];

impl TaxClass {
    pub fn from_code(code: usize) -> Option<TaxClass> {
        BY_CODE.get(code).copied()
    }

    /// Parse a code as it appears in a sanitized RPAD field ("9", "12", ...)
    pub fn parse_code(raw: &str) -> Result<TaxClass, HousingError> {
        raw.trim()
            .parse::<usize>()
            .ok()
            .and_then(TaxClass::from_code)
            .ok_or_else(|| HousingError::UnknownTaxClass(raw.to_string()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaxClass::Timeshare => "timeshare",
            TaxClass::NonOwnerOccupied => "non-owner-occupied",
            TaxClass::Apartment => "apartment",
            TaxClass::Commercial => "commercial",
            TaxClass::Industrial => "industrial",
            TaxClass::Agricultural => "agricultural",
            TaxClass::Conservation => "conservation",
            TaxClass::HotelResort => "hotel/resort",
            TaxClass::Unassigned => "",
            TaxClass::OwnerOccupied => "owner-occupied",
            TaxClass::CommercializedResidential => "commercialized-res",
            TaxClass::TvrStrh => "tvr-strh",
            TaxClass::LongTermRental => "long-term-rental",
        }
    }

    pub fn from_label(label: &str) -> Option<TaxClass> {
        BY_CODE.iter().copied().find(|c| c.label() == label.trim())
    }

    /// The four classes the housing reports consider. Apartment and
    /// commercialized-residential are too small to matter.
    pub fn is_residential(&self) -> bool {
        matches!(
            self,
            TaxClass::OwnerOccupied
                | TaxClass::NonOwnerOccupied
                | TaxClass::TvrStrh
                | TaxClass::LongTermRental
        )
    }

    /// Occupied by a resident: owner-occupied or rented long term
    pub fn is_resident(&self) -> bool {
        matches!(self, TaxClass::OwnerOccupied | TaxClass::LongTermRental)
    }

    /// Short-term rental use. Older years filed these as hotel/resort.
    pub fn is_short_term_rental(&self) -> bool {
        matches!(self, TaxClass::HotelResort | TaxClass::TvrStrh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping() {
        assert_eq!(TaxClass::parse_code("9").unwrap(), TaxClass::OwnerOccupied);
        assert_eq!(TaxClass::parse_code("11").unwrap(), TaxClass::TvrStrh);
        assert_eq!(TaxClass::parse_code("0").unwrap(), TaxClass::Timeshare);
        assert_eq!(TaxClass::parse_code("8").unwrap().label(), "");
        assert!(TaxClass::parse_code("13").is_err());
        assert!(TaxClass::parse_code("x").is_err());
    }

    #[test]
    fn test_label_round_trip() {
        for class in BY_CODE {
            if class == TaxClass::Unassigned {
                continue;
            }
            assert_eq!(TaxClass::from_label(class.label()), Some(class));
        }
        assert_eq!(TaxClass::from_label("castle"), None);
    }

    #[test]
    fn test_class_groups() {
        assert!(TaxClass::TvrStrh.is_residential());
        assert!(!TaxClass::Apartment.is_residential());
        assert!(TaxClass::LongTermRental.is_resident());
        assert!(!TaxClass::NonOwnerOccupied.is_resident());
        assert!(TaxClass::HotelResort.is_short_term_rental());
        assert!(!TaxClass::OwnerOccupied.is_short_term_rental());
    }
}
