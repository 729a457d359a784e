// 🏠 Household crowding by region
// ACS table B25014 counts occupied units by occupants per room. A unit with
// more than 1.00 occupant per room is crowded. B25014A repeats the count for
// one race group, which is subtracted to show everyone else.

use crate::regions::{zcta_region, Region};
use crate::stats::pct;
use crate::table::{load_records, LoadOptions};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// ACS 5-year estimates covered by the crowding report
pub const ACS_YEARS: [i64; 4] = [2011, 2015, 2020, 2023];

/// One ZCTA row from an ACS occupants-per-room table
pub trait OccupancyRecord: DeserializeOwned {
    /// Geography name, e.g. "ZCTA5 96753"
    fn zcta(&self) -> &str;

    /// Occupied units with more than 1.00 occupant per room
    fn crowded(&self) -> i64;

    /// All occupied units
    fn total(&self) -> i64;
}

/// B25014: tenure by occupants per room
#[derive(Debug, Deserialize)]
pub struct TenureRecord {
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    b25014_001e: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    b25014_005e: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    b25014_006e: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    b25014_007e: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    b25014_011e: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    b25014_012e: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    b25014_013e: Option<i64>,
}

impl OccupancyRecord for TenureRecord {
    fn zcta(&self) -> &str {
        &self.name
    }

    fn crowded(&self) -> i64 {
        // owners 1.01-1.5, 1.51-2.0, 2.01+ then renters
        [
            self.b25014_005e,
            self.b25014_006e,
            self.b25014_007e,
            self.b25014_011e,
            self.b25014_012e,
            self.b25014_013e,
        ]
        .iter()
        .flatten()
        .sum()
    }

    fn total(&self) -> i64 {
        self.b25014_001e.unwrap_or(0)
    }
}

/// B25014A: occupants per room for one race group
#[derive(Debug, Deserialize)]
pub struct RaceRecord {
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    b25014a_001e: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    b25014a_003e: Option<i64>,
}

impl OccupancyRecord for RaceRecord {
    fn zcta(&self) -> &str {
        &self.name
    }

    fn crowded(&self) -> i64 {
        self.b25014a_003e.unwrap_or(0)
    }

    fn total(&self) -> i64 {
        self.b25014a_001e.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionCrowding {
    pub year: i64,
    pub region: Region,
    pub total_crowded: i64,
    pub total: i64,
    pub pct_crowded: Option<f64>,
}

/// Sum one ACS table's Maui ZCTAs per region, sorted by region
pub fn load_region_crowding<R: OccupancyRecord>(path: &Path, year: i64) -> Result<Vec<RegionCrowding>> {
    // row after the header holds column descriptions
    let loaded = load_records::<R>(path, &LoadOptions::new().skip_rows_after_header(1))?;

    let mut sums: BTreeMap<Region, (i64, i64)> = BTreeMap::new();
    for record in &loaded.records {
        if let Some(region) = zcta_region(record.zcta()) {
            let sum = sums.entry(region).or_default();
            sum.0 += record.crowded();
            sum.1 += record.total();
        }
    }

    info!("{} ({}): {} regions", path.display(), year, sums.len());
    Ok(sums
        .into_iter()
        .map(|(region, (total_crowded, total))| RegionCrowding {
            year,
            region,
            total_crowded,
            total,
            pct_crowded: pct(total_crowded as f64, total as f64),
        })
        .collect())
}

/// Tenure and race tables for one ACS year
#[derive(Debug, Clone, Copy)]
pub struct AcsTables<'a> {
    pub year: i64,
    pub occupancy: &'a Path,
    pub occupancy_race: &'a Path,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crowding {
    pub year: i64,
    pub region: Region,
    pub total_crowded: i64,
    pub total: i64,
    pub pct_crowded: Option<f64>,
    pub total_crowded_race: i64,
    pub total_race: i64,
    pub pct_crowded_race: Option<f64>,
    pub total_crowded_diff: i64,
    pub total_diff: i64,
    pub pct_crowded_diff: Option<f64>,
}

/// Join all-household and race-group counts on (year, region) and take the
/// difference. Regions missing from either side are dropped.
pub fn crowding(all: &[RegionCrowding], race: &[RegionCrowding]) -> Vec<Crowding> {
    let race: BTreeMap<(i64, Region), &RegionCrowding> =
        race.iter().map(|r| ((r.year, r.region), r)).collect();

    all.iter()
        .filter_map(|a| {
            let r = race.get(&(a.year, a.region))?;
            let total_crowded_diff = a.total_crowded - r.total_crowded;
            let total_diff = a.total - r.total;
            Some(Crowding {
                year: a.year,
                region: a.region,
                total_crowded: a.total_crowded,
                total: a.total,
                pct_crowded: a.pct_crowded,
                total_crowded_race: r.total_crowded,
                total_race: r.total,
                pct_crowded_race: r.pct_crowded,
                total_crowded_diff,
                total_diff,
                pct_crowded_diff: pct(total_crowded_diff as f64, total_diff as f64),
            })
        })
        .collect()
}

/// Load every year's pair of tables and build the report, years in the
/// order given
pub fn crowding_report(tables: &[AcsTables<'_>]) -> Result<Vec<Crowding>> {
    let mut all = Vec::new();
    let mut race = Vec::new();
    for t in tables {
        all.extend(load_region_crowding::<TenureRecord>(t.occupancy, t.year)?);
        race.extend(load_region_crowding::<RaceRecord>(t.occupancy_race, t.year)?);
    }

    let rows = crowding(&all, &race);
    info!("Crowding: {} rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TENURE_CSV: &str = "\
GEO_ID,NAME,B25014_001E,B25014_005E,B25014_006E,B25014_007E,B25014_011E,B25014_012E,B25014_013E
Geography,Geographic Area Name,Estimate!!Total:,a,b,c,d,e,f
860Z200US96753,ZCTA5 96753,1000,10,5,5,40,20,20
860Z200US96761,ZCTA5 96761,500,5,0,0,30,10,5
860Z200US96767,ZCTA5 96767,100,,0,0,5,0,0
860Z200US96813,ZCTA5 96813,9999,999,0,0,0,0,0
";

    const RACE_CSV: &str = "\
GEO_ID,NAME,B25014A_001E,B25014A_002E,B25014A_003E
Geography,Geographic Area Name,Total,le 1.00,ge 1.01
860Z200US96753,ZCTA5 96753,400,380,20
";

    #[test]
    fn test_load_region_crowding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("b25014.csv");
        fs::write(&path, TENURE_CSV).unwrap();

        let rows = load_region_crowding::<TenureRecord>(&path, 2023).unwrap();

        assert_eq!(rows.len(), 2, "Honolulu ZCTA dropped");
        assert_eq!(rows[0].region, Region::SouthMaui);
        assert_eq!(rows[0].total_crowded, 100);
        assert_eq!(rows[0].pct_crowded, Some(10.0));
        assert_eq!(rows[1].region, Region::WestMaui);
        assert_eq!(rows[1].total, 600, "two Lahaina ZIPs summed");
        assert_eq!(rows[1].total_crowded, 55, "blank cell counts as zero");

        println!("✅ Region crowding load test PASSED");
    }

    #[test]
    fn test_crowding_report() {
        let dir = TempDir::new().unwrap();
        let tenure = dir.path().join("b25014.csv");
        let race = dir.path().join("b25014a.csv");
        fs::write(&tenure, TENURE_CSV).unwrap();
        fs::write(&race, RACE_CSV).unwrap();

        let rows = crowding_report(&[AcsTables {
            year: 2015,
            occupancy: &tenure,
            occupancy_race: &race,
        }])
        .unwrap();

        assert_eq!(rows.len(), 1, "West Maui has no race row");
        let row = &rows[0];
        assert_eq!(row.year, 2015);
        assert_eq!(row.total_crowded_race, 20);
        assert_eq!(row.pct_crowded_race, Some(5.0));
        assert_eq!(row.total_crowded_diff, 80);
        assert_eq!(row.total_diff, 600);
        assert_eq!(row.pct_crowded_diff, Some(13.3));
    }
}
