// 🗺️ Regions of Maui County
// Tax map zone/section, census tract, and ZIP code lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label for county-wide rows in every report
pub const COUNTY_LABEL: &str = "Maui County";

/// Variants are declared alphabetically so derived Ord matches how the
/// reports sort region names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "Central Maui")]
    CentralMaui,
    #[serde(rename = "East Maui")]
    EastMaui,
    #[serde(rename = "Lanai")]
    Lanai,
    #[serde(rename = "Molokai")]
    Molokai,
    #[serde(rename = "South Maui")]
    SouthMaui,
    #[serde(rename = "Upcountry")]
    Upcountry,
    #[serde(rename = "West Maui")]
    WestMaui,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::CentralMaui,
        Region::EastMaui,
        Region::Lanai,
        Region::Molokai,
        Region::SouthMaui,
        Region::Upcountry,
        Region::WestMaui,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Region::CentralMaui => "Central Maui",
            Region::EastMaui => "East Maui",
            Region::Lanai => "Lanai",
            Region::Molokai => "Molokai",
            Region::SouthMaui => "South Maui",
            Region::Upcountry => "Upcountry",
            Region::WestMaui => "West Maui",
        }
    }

    pub fn from_label(label: &str) -> Option<Region> {
        Region::ALL.iter().copied().find(|r| r.label() == label.trim())
    }

    /// Zone and section (2nd and 3rd TMK digits) neatly define the regions.
    /// See image M00000 in the Maui County Document Center:
    /// Public Data Extracts > Tax Map Images > Zone 1
    pub fn from_zone_section(zs: u32) -> Option<Region> {
        match zs {
            41..=48 => Some(Region::WestMaui),
            31..=38 => Some(Region::CentralMaui),
            22..=29 => Some(Region::Upcountry),
            21 | 39 => Some(Region::SouthMaui),
            11..=19 => Some(Region::EastMaui),
            50..=59 => Some(Region::Molokai),
            49 => Some(Region::Lanai),
            _ => None,
        }
    }

    /// Census tract code (e.g. 30700 for tract 0307.00). Exact match first,
    /// then the tract's base (hundreds) for split tracts like 30701.
    pub fn from_census_tract(tract: u32) -> Option<Region> {
        tract_region(tract).or_else(|| tract_region(tract / 100 * 100))
    }

    pub fn from_zip(zip: u32) -> Option<Region> {
        ZIP_REGIONS
            .iter()
            .find(|(z, _)| *z == zip)
            .map(|(_, region)| *region)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label for an optional region. Rows without a region are written blank.
pub fn region_label(region: Option<Region>) -> String {
    region.map(|r| r.label().to_string()).unwrap_or_default()
}

// ============================================================================
// REGION FLAGS (zone/section ranges, used to pick condo subsets)
// ============================================================================

pub fn is_west_maui(zs: u32) -> bool {
    (41..=48).contains(&zs)
}

pub fn is_central_maui(zs: u32) -> bool {
    (31..=38).contains(&zs)
}

pub fn is_south_maui(zs: u32) -> bool {
    matches!(zs, 21 | 39)
}

// ============================================================================
// CENSUS TRACTS
// ============================================================================

const TRACT_REGIONS: [(u32, Region); 27] = [
    (30100, Region::EastMaui),    // Hana
    (30200, Region::Upcountry),   // Haiku
    (30301, Region::Upcountry),   // Kula
    (30302, Region::SouthMaui),   // Wailea (2000)
    (30303, Region::SouthMaui),   // Wailea (2010)
    (30304, Region::Upcountry),   // Omaopio
    (30305, Region::Upcountry),   // Kanaio
    (30306, Region::SouthMaui),   // Kula Makai
    (30307, Region::SouthMaui),   // La Perouse
    (30300, Region::Upcountry),   // Kula
    (30400, Region::Upcountry),   // Makawao
    (30500, Region::Upcountry),   // Paia
    (30600, Region::Upcountry),   // Spreckelsville (2000)
    (30700, Region::SouthMaui),   // Kihei
    (30800, Region::CentralMaui), // Waihee-Waikapu
    (30900, Region::CentralMaui), // Wailuku
    (31000, Region::CentralMaui), // Wailuku
    (31100, Region::CentralMaui), // Kahului
    (31200, Region::CentralMaui), // Kahului
    (31300, Region::CentralMaui), // Puunene
    (31400, Region::WestMaui),    // Lahaina
    (31500, Region::WestMaui),    // North West Maui
    (31600, Region::Lanai),
    (31700, Region::Molokai),
    (31800, Region::Molokai),
    (31900, Region::Upcountry), // Spreckelsville, and Kalawao (?)
    (32000, Region::WestMaui),  // Launiopoko
];

fn tract_region(tract: u32) -> Option<Region> {
    TRACT_REGIONS
        .iter()
        .find(|(t, _)| *t == tract)
        .map(|(_, region)| *region)
}

// ============================================================================
// ZIP CODES
// ============================================================================

const ZIP_REGIONS: [(u32, Region); 17] = [
    (96708, Region::Upcountry),   // Haiku
    (96713, Region::EastMaui),    // Hana
    (96729, Region::Molokai),     // Hoolehua
    (96732, Region::CentralMaui), // Kahului
    (96748, Region::Molokai),     // Kaunakakai
    (96753, Region::SouthMaui),   // Kihei
    (96757, Region::Molokai),     // Kualapuu
    (96761, Region::WestMaui),    // Lahaina
    (96763, Region::Lanai),       // Lanai City
    (96767, Region::WestMaui),    // Lahaina
    (96768, Region::Upcountry),   // Makawao
    (96770, Region::Molokai),     // Maunaloa
    (96779, Region::Upcountry),   // Paia
    (96784, Region::CentralMaui), // Puunene
    (96788, Region::Upcountry),   // Pukalani
    (96790, Region::Upcountry),   // Kula
    (96793, Region::CentralMaui), // Wailuku
];

/// "ZCTA5 96753" -> South Maui
pub fn zcta_region(name: &str) -> Option<Region> {
    let zip = name.trim().strip_prefix("ZCTA5")?.trim().parse::<u32>().ok()?;
    Region::from_zip(zip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_section_regions() {
        assert_eq!(Region::from_zone_section(45), Some(Region::WestMaui));
        assert_eq!(Region::from_zone_section(41), Some(Region::WestMaui));
        assert_eq!(Region::from_zone_section(38), Some(Region::CentralMaui));
        assert_eq!(Region::from_zone_section(22), Some(Region::Upcountry));
        assert_eq!(Region::from_zone_section(21), Some(Region::SouthMaui));
        assert_eq!(Region::from_zone_section(39), Some(Region::SouthMaui));
        assert_eq!(Region::from_zone_section(14), Some(Region::EastMaui));
        assert_eq!(Region::from_zone_section(56), Some(Region::Molokai));
        assert_eq!(Region::from_zone_section(49), Some(Region::Lanai));
        assert_eq!(Region::from_zone_section(20), None);
        assert_eq!(Region::from_zone_section(40), None);
    }

    #[test]
    fn test_region_flags() {
        assert!(is_west_maui(46));
        assert!(is_west_maui(41) && !is_west_maui(49));
        assert!(is_south_maui(39) && !is_central_maui(39));
        assert!(is_central_maui(38));
    }

    #[test]
    fn test_census_tracts_fall_back_to_base() {
        assert_eq!(Region::from_census_tract(30700), Some(Region::SouthMaui));
        assert_eq!(Region::from_census_tract(30306), Some(Region::SouthMaui));
        // Split tract with no explicit entry uses its base tract
        assert_eq!(Region::from_census_tract(31401), Some(Region::WestMaui));
        assert_eq!(Region::from_census_tract(30308), Some(Region::Upcountry));
        // Honolulu tract
        assert_eq!(Region::from_census_tract(100), None);
    }

    #[test]
    fn test_zcta_names() {
        assert_eq!(zcta_region("ZCTA5 96753"), Some(Region::SouthMaui));
        assert_eq!(zcta_region("ZCTA5 96763"), Some(Region::Lanai));
        assert_eq!(zcta_region("ZCTA5 96813"), None);
        assert_eq!(zcta_region("Kihei"), None);
    }

    #[test]
    fn test_sort_order_matches_labels() {
        let mut labels: Vec<&str> = Region::ALL.iter().map(|r| r.label()).collect();
        let ordered = labels.clone();
        labels.sort();
        assert_eq!(labels, ordered, "enum order must equal alphabetical label order");
    }
}
