// 💵 Household income by region
// NHGIS publishes median household income per census tract. Regions are
// groups of tracts, so a region's median is the population-weighted median
// of its tracts' medians. Census years are sparse; FRED's annual series
// fills the gaps in the interpolated report.

use crate::cpi::Inflation;
use crate::regions::{Region, COUNTY_LABEL};
use crate::stats::{interpolate_linear, weighted_median};
use crate::table::{leading_year, load_records, LoadOptions};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info};

const STATE: &str = "Hawaii";

/// Decennial years look like "1990"; ACS 5-year estimates look like
/// "2011-2015" and are labeled by their final year.
pub fn normalize_acs_year(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let year = match raw.rsplit_once('-') {
        Some((_, end)) => end,
        None => raw,
    };
    year.trim().parse().ok()
}

// ============================================================================
// NHGIS INPUTS
// ============================================================================

#[derive(Debug, Deserialize)]
struct TractIncomeRecord {
    #[serde(default)]
    year: String,
    #[serde(default)]
    state: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    tracta: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    b79aa: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CountyIncomeRecord {
    #[serde(default)]
    year: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    county: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    b79aa: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PopulationRecord {
    #[serde(default)]
    year: String,
    #[serde(default)]
    state: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    tracta: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    av0aa: Option<f64>,
}

/// One census tract in one census year
#[derive(Debug, Clone, PartialEq)]
pub struct TractIncome {
    pub year: i64,
    pub tract: u32,
    pub region: Region,
    pub median_household_income: Option<f64>,
    pub persons_total: Option<f64>,
}

/// NHGIS input files
#[derive(Debug, Clone, Copy)]
pub struct NhgisFiles<'a> {
    pub income: &'a Path,
    pub county_income: &'a Path,
    pub population: &'a Path,
}

/// Tract incomes with population, and the county-wide income
#[derive(Debug, Clone, Default)]
pub struct CensusIncome {
    pub tracts: Vec<TractIncome>,
    pub county: BTreeMap<i64, f64>,
}

impl CensusIncome {
    pub fn load(files: NhgisFiles<'_>) -> Result<CensusIncome> {
        let population: HashMap<(i64, u32), Option<f64>> =
            load_records::<PopulationRecord>(files.population, &LoadOptions::new())?
                .records
                .into_iter()
                .filter(|r| r.state.trim() == STATE)
                .filter_map(|r| Some(((normalize_acs_year(&r.year)?, r.tracta?), r.av0aa)))
                .collect();

        let income = load_records::<TractIncomeRecord>(files.income, &LoadOptions::new())?;
        let mut unmapped = BTreeSet::new();
        let tracts: Vec<TractIncome> = income
            .records
            .into_iter()
            .filter(|r| r.state.trim() == STATE)
            .filter_map(|r| {
                let year = normalize_acs_year(&r.year)?;
                let tract = r.tracta?;
                let region = match Region::from_census_tract(tract) {
                    Some(region) => region,
                    None => {
                        unmapped.insert(tract);
                        return None;
                    }
                };
                Some(TractIncome {
                    year,
                    tract,
                    region,
                    median_household_income: r.b79aa,
                    persons_total: population.get(&(year, tract)).copied().flatten(),
                })
            })
            .collect();
        debug!("{} Hawaii tracts outside Maui County", unmapped.len());

        let county: BTreeMap<i64, f64> =
            load_records::<CountyIncomeRecord>(files.county_income, &LoadOptions::new())?
                .records
                .into_iter()
                .filter(|r| r.state.trim() == STATE && r.county.trim() == COUNTY_LABEL)
                .filter_map(|r| Some((normalize_acs_year(&r.year)?, r.b79aa?)))
                .collect();

        info!(
            "Census income: {} Maui tract-years, {} county years",
            tracts.len(),
            county.len()
        );
        Ok(CensusIncome { tracts, county })
    }
}

// ============================================================================
// FRED INPUTS
// ============================================================================

#[derive(Debug, Deserialize)]
struct FredRecord {
    #[serde(default)]
    observation_date: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    median_household_income: Option<f64>,
}

/// Annual series from FRED. The value column must be renamed to
/// `median_household_income` (FRED names it after the series id).
pub fn load_fred(path: &Path) -> Result<BTreeMap<i64, f64>> {
    let loaded = load_records::<FredRecord>(path, &LoadOptions::new())?;
    let series: BTreeMap<i64, f64> = loaded
        .records
        .into_iter()
        .filter_map(|r| {
            let date = r.observation_date.trim();
            let year = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(|d| i64::from(d.year()))
                .ok()
                .or_else(|| leading_year(date))?;
            Some((year, r.median_household_income?))
        })
        .collect();

    info!("FRED: {} years from {}", series.len(), path.display());
    Ok(series)
}

/// The state series runs from 1984; the county series starts later with
/// gaps. Use the state before `switch_year` and the county from then on.
pub fn combine_fred(hawaii: &BTreeMap<i64, f64>, maui: &BTreeMap<i64, f64>, switch_year: i64) -> BTreeMap<i64, f64> {
    hawaii
        .range(..switch_year)
        .chain(maui.range(switch_year..))
        .map(|(year, income)| (*year, *income))
        .collect()
}

// ============================================================================
// REPORTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HouseholdIncome {
    pub year: i64,
    pub region: String,
    pub adj_median_household_income: Option<i64>,
    pub median_household_income: Option<i64>,
}

/// Population-weighted median of tract incomes, in base-year dollars,
/// per (year, region). A tract without an income still counts its
/// population, so a region's median can come out unknown.
pub fn region_medians(tracts: &[TractIncome], inflation: &Inflation<'_>) -> BTreeMap<(i64, Region), Option<i64>> {
    let mut groups: BTreeMap<(i64, Region), Vec<(Option<f64>, Option<f64>)>> = BTreeMap::new();
    for tract in tracts {
        let adjusted = tract
            .median_household_income
            .and_then(|income| inflation.adjust(income, tract.year))
            .map(|adjusted| adjusted as f64);
        groups
            .entry((tract.year, tract.region))
            .or_default()
            .push((adjusted, tract.persons_total));
    }

    groups
        .into_iter()
        .filter_map(|(key, samples)| weighted_median(&samples).map(|m| (key, m.map(|m| m as i64))))
        .collect()
}

fn keep_row(row: &HouseholdIncome, lanai_first_year: i64) -> bool {
    row.region != Region::Lanai.label() || row.year >= lanai_first_year
}

/// Census years only: regions sorted by year and region, then the county
pub fn household_income(census: &CensusIncome, inflation: &Inflation<'_>, lanai_first_year: i64) -> Vec<HouseholdIncome> {
    let mut rows: Vec<HouseholdIncome> = region_medians(&census.tracts, inflation)
        .into_iter()
        .map(|((year, region), adjusted)| HouseholdIncome {
            year,
            region: region.label().to_string(),
            adj_median_household_income: adjusted,
            median_household_income: adjusted.and_then(|a| inflation.actual(a as f64, year)),
        })
        .collect();

    rows.extend(census.county.iter().map(|(year, income)| HouseholdIncome {
        year: *year,
        region: COUNTY_LABEL.to_string(),
        adj_median_household_income: inflation.adjust(*income, *year),
        median_household_income: Some(income.trunc() as i64),
    }));

    rows.retain(|row| keep_row(row, lanai_first_year));
    info!("Household income: {} rows", rows.len());
    rows
}

/// Scale `reference` by the ratio known[year] / reference[year], with the
/// ratio interpolated linearly between known years and held flat past the
/// ends. Covers every reference year.
pub fn interpolate_against(
    known: &BTreeMap<i64, f64>,
    reference: &BTreeMap<i64, f64>,
    years: (i64, i64),
) -> Vec<(i64, i64)> {
    let (first, last) = years;
    let ratios: Vec<Option<f64>> = (first..=last)
        .map(|year| match (known.get(&year), reference.get(&year)) {
            (Some(value), Some(reference)) if *reference != 0.0 => Some(value / reference),
            _ => None,
        })
        .collect();
    let ratios = interpolate_linear(&ratios);

    (first..=last)
        .zip(ratios)
        .filter_map(|(year, ratio)| {
            let reference = reference.get(&year)?;
            Some((year, (ratio? * reference).round() as i64))
        })
        .collect()
}

/// Every year covered by the census rows or FRED
fn year_span<'a>(years: impl Iterator<Item = &'a i64>, fred: &'a BTreeMap<i64, f64>) -> Option<(i64, i64)> {
    let all: BTreeSet<i64> = years.chain(fred.keys()).copied().collect();
    Some((*all.iter().next()?, *all.iter().next_back()?))
}

/// Census medians carried through every FRED year by interpolating each
/// region's ratio to FRED. Regions first (by region, then year), then the
/// county.
pub fn household_income_interpolated(
    census: &CensusIncome,
    fred: &BTreeMap<i64, f64>,
    inflation: &Inflation<'_>,
    lanai_first_year: i64,
) -> Vec<HouseholdIncome> {
    let fred_adjusted: BTreeMap<i64, f64> = fred
        .iter()
        .filter_map(|(year, income)| Some((*year, inflation.adjust(*income, *year)? as f64)))
        .collect();

    let medians = region_medians(&census.tracts, inflation);
    let mut by_region: BTreeMap<Region, BTreeMap<i64, f64>> = BTreeMap::new();
    for ((year, region), adjusted) in &medians {
        if let Some(adjusted) = adjusted {
            by_region.entry(*region).or_default().insert(*year, *adjusted as f64);
        }
    }

    let county_adjusted: BTreeMap<i64, f64> = census
        .county
        .iter()
        .filter_map(|(year, income)| Some((*year, inflation.adjust(*income, *year)? as f64)))
        .collect();

    let row = |year: i64, region: &str, adjusted: i64| HouseholdIncome {
        year,
        region: region.to_string(),
        adj_median_household_income: Some(adjusted),
        median_household_income: inflation.actual(adjusted as f64, year),
    };

    let mut rows = Vec::new();
    if let Some(span) = year_span(medians.keys().map(|(year, _)| year), &fred_adjusted) {
        for (region, known) in &by_region {
            for (year, adjusted) in interpolate_against(known, &fred_adjusted, span) {
                rows.push(row(year, region.label(), adjusted));
            }
        }
    }
    if let Some(span) = year_span(county_adjusted.keys(), &fred_adjusted) {
        for (year, adjusted) in interpolate_against(&county_adjusted, &fred_adjusted, span) {
            rows.push(row(year, COUNTY_LABEL, adjusted));
        }
    }

    rows.retain(|row| keep_row(row, lanai_first_year));
    info!("Interpolated household income: {} rows", rows.len());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpi::CpiTable;
    use std::fs;
    use tempfile::TempDir;

    fn cpi() -> CpiTable {
        (1980..=2023).map(|year| (year, 100.0)).collect()
    }

    fn tract(year: i64, tract: u32, income: f64, persons: f64) -> TractIncome {
        TractIncome {
            year,
            tract,
            region: Region::from_census_tract(tract).unwrap(),
            median_household_income: Some(income),
            persons_total: Some(persons),
        }
    }

    #[test]
    fn test_normalize_acs_year() {
        assert_eq!(normalize_acs_year("1990"), Some(1990));
        assert_eq!(normalize_acs_year("2011-2015"), Some(2015));
        assert_eq!(normalize_acs_year(""), None);
    }

    #[test]
    fn test_load_census_income() {
        let dir = TempDir::new().unwrap();
        let income = dir.path().join("income.csv");
        let county = dir.path().join("county.csv");
        let population = dir.path().join("population.csv");
        fs::write(
            &income,
            "YEAR,STATE,TRACTA,B79AA\n\
             2011-2015,Hawaii,030701,70000\n\
             2011-2015,Hawaii,000100,90000\n\
             2011-2015,Alaska,030700,10\n",
        )
        .unwrap();
        fs::write(
            &county,
            "YEAR,STATE,COUNTY,B79AA\n\
             2011-2015,Hawaii,Maui County,68000\n\
             2011-2015,Hawaii,Honolulu County,80000\n",
        )
        .unwrap();
        fs::write(&population, "YEAR,STATE,TRACTA,AV0AA\n2011-2015,Hawaii,030701,5000\n").unwrap();

        let census = CensusIncome::load(NhgisFiles {
            income: &income,
            county_income: &county,
            population: &population,
        })
        .unwrap();

        assert_eq!(census.tracts.len(), 1, "Oahu tract and other states dropped");
        assert_eq!(census.tracts[0].year, 2015);
        assert_eq!(census.tracts[0].region, Region::SouthMaui, "split tract maps by its base");
        assert_eq!(census.tracts[0].persons_total, Some(5000.0));
        assert_eq!(census.county.get(&2015), Some(&68000.0));

        println!("✅ Census income load test PASSED");
    }

    #[test]
    fn test_household_income() {
        let table = cpi();
        let inflation = table.inflation(2020).unwrap();
        let mut census = CensusIncome {
            tracts: vec![
                tract(1980, 31600, 20_000.0, 2000.0),
                tract(1990, 31600, 30_000.0, 2000.0),
                tract(1990, 31400, 40_000.0, 100.0),
                tract(1990, 31500, 60_000.0, 300.0),
            ],
            ..CensusIncome::default()
        };
        census.county.insert(1990, 45_000.0);

        let rows = household_income(&census, &inflation, 1990);

        let summary: Vec<(i64, &str, Option<i64>)> = rows
            .iter()
            .map(|r| (r.year, r.region.as_str(), r.adj_median_household_income))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1990, "Lanai", Some(30_000)),
                (1990, "West Maui", Some(60_000)),
                (1990, "Maui County", Some(45_000)),
            ],
            "Lanai 1980 dropped"
        );
        assert_eq!(rows[1].median_household_income, Some(60_000));
    }

    #[test]
    fn test_unknown_income_tract_keeps_its_weight() {
        let table = cpi();
        let inflation = table.inflation(2020).unwrap();
        let mut unknown = tract(1990, 32000, 0.0, 300.0);
        unknown.median_household_income = None;
        let census = CensusIncome {
            tracts: vec![unknown, tract(1990, 31400, 40_000.0, 100.0), tract(1990, 31500, 80_000.0, 100.0)],
            ..CensusIncome::default()
        };

        let rows = household_income(&census, &inflation, 1990);

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].adj_median_household_income,
            Some(40_000),
            "300 people of unknown income sit below the known tracts"
        );
    }

    #[test]
    fn test_combine_fred() {
        let hawaii: BTreeMap<i64, f64> = vec![(1998, 1.0), (1999, 2.0), (2000, 3.0)].into_iter().collect();
        let maui: BTreeMap<i64, f64> = vec![(1999, 20.0), (2000, 30.0), (2001, 40.0)].into_iter().collect();

        let combined = combine_fred(&hawaii, &maui, 2000);
        assert_eq!(combined.values().copied().collect::<Vec<_>>(), vec![1.0, 2.0, 30.0, 40.0]);
    }

    #[test]
    fn test_interpolate_against() {
        let known: BTreeMap<i64, f64> = vec![(2000, 50.0), (2010, 150.0)].into_iter().collect();
        let reference: BTreeMap<i64, f64> = (1998..=2012).map(|y| (y, 100.0)).collect();

        let values = interpolate_against(&known, &reference, (1998, 2012));

        assert_eq!(values.len(), 15);
        assert_eq!(values[0], (1998, 50), "ratio held flat before first census");
        assert_eq!(values[7], (2005, 100), "halfway between 0.5 and 1.5");
        assert_eq!(values[14], (2012, 150));
    }

    #[test]
    fn test_household_income_interpolated() {
        let table = cpi();
        let inflation = table.inflation(2023).unwrap();
        let mut census = CensusIncome {
            tracts: vec![tract(2000, 31400, 50_000.0, 10.0), tract(2010, 31400, 70_000.0, 10.0)],
            ..CensusIncome::default()
        };
        census.county.insert(2000, 60_000.0);
        let fred: BTreeMap<i64, f64> = (2000..=2012).map(|y| (y, 50_000.0)).collect();

        let rows = household_income_interpolated(&census, &fred, &inflation, 1990);

        assert_eq!(rows.len(), 26, "13 years for West Maui and 13 for the county");
        assert_eq!(rows[0].region, "West Maui");
        assert_eq!(rows[5].adj_median_household_income, Some(60_000));
        assert_eq!(rows[12].adj_median_household_income, Some(70_000));
        assert_eq!(rows[13].region, "Maui County");
        assert_eq!(rows[25].adj_median_household_income, Some(60_000));

        println!("✅ Interpolated income test PASSED");
    }
}
