// 💵 Inflation adjustment
// CPI for all items in urban Hawaii (US BLS), annual averages.

use crate::error::HousingError;
use crate::table::{load_records, LoadOptions};
use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct CpiRow {
    year: i64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    annual: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct CpiTable {
    by_year: BTreeMap<i64, f64>,
}

impl CpiTable {
    pub fn load(path: &Path) -> Result<CpiTable> {
        let loaded = load_records::<CpiRow>(path, &LoadOptions::new())?;
        let table: CpiTable = loaded
            .records
            .into_iter()
            .filter_map(|row| row.annual.map(|cpi| (row.year, cpi)))
            .collect();
        info!("CPI: {} years from {}", table.by_year.len(), path.display());
        Ok(table)
    }

    pub fn get(&self, year: i64) -> Option<f64> {
        self.by_year.get(&year).copied()
    }

    /// Fix dollars to `base_year`. Fails when the base year has no CPI.
    pub fn inflation(&self, base_year: i64) -> Result<Inflation<'_>, HousingError> {
        let base_cpi = self.get(base_year).ok_or(HousingError::MissingBaseCpi(base_year))?;
        Ok(Inflation {
            table: self,
            base_year,
            base_cpi,
        })
    }
}

impl FromIterator<(i64, f64)> for CpiTable {
    fn from_iter<I: IntoIterator<Item = (i64, f64)>>(iter: I) -> Self {
        CpiTable {
            by_year: iter.into_iter().collect(),
        }
    }
}

/// Converts between nominal and base-year dollars
#[derive(Debug, Clone, Copy)]
pub struct Inflation<'a> {
    table: &'a CpiTable,
    pub base_year: i64,
    pub base_cpi: f64,
}

impl Inflation<'_> {
    /// Nominal -> base-year dollars. None when `year` has no CPI.
    pub fn adjust(&self, value: f64, year: i64) -> Option<i64> {
        let cpi = self.table.get(year)?;
        Some((value / cpi * self.base_cpi).round() as i64)
    }

    /// Base-year -> nominal dollars
    pub fn actual(&self, adjusted: f64, year: i64) -> Option<i64> {
        let cpi = self.table.get(year)?;
        Some((adjusted / self.base_cpi * cpi).round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_table() -> CpiTable {
        vec![(2013, 250.0), (2023, 300.0)].into_iter().collect()
    }

    #[test]
    fn test_adjust_and_actual() {
        let table = sample_table();
        let inflation = table.inflation(2023).unwrap();

        assert_eq!(inflation.adjust(500_000.0, 2013), Some(600_000));
        assert_eq!(inflation.actual(600_000.0, 2013), Some(500_000));
        assert_eq!(inflation.adjust(500_000.0, 2023), Some(500_000));
        assert_eq!(inflation.adjust(500_000.0, 1999), None, "no CPI for year");
    }

    #[test]
    fn test_missing_base_year() {
        let table = sample_table();
        let err = table.inflation(2020).unwrap_err();
        assert!(matches!(err, HousingError::MissingBaseCpi(2020)));
    }

    #[test]
    fn test_load_bls_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cpi.csv");
        fs::write(&path, "Year,Jan,Annual\n2022,,290.5\n2023,,302.1\n2024,,\n").unwrap();

        let table = CpiTable::load(&path).unwrap();
        assert_eq!(table.get(2022), Some(290.5));
        assert_eq!(table.get(2023), Some(302.1));
        assert_eq!(table.get(2024), None, "blank annual average is skipped");
    }
}
