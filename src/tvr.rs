// 🏖️ Minatoya complex vacation rental history
// The Minatoya list names condo complexes in apartment districts where
// short-term rentals were allowed. These reports use the historical
// assessment file (one row per unit per tax year) to see how many units
// in each complex have been used as vacation rentals over time.

use crate::config::YearRange;
use crate::minatoya::{complex_name, is_minatoya_complex};
use crate::regions::{Region, COUNTY_LABEL};
use crate::stats::{pct, round1};
use crate::table::{load_records, LoadOptions};
use crate::tax_class::TaxClass;
use crate::tmk::Tmk;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

/// Placeholder the historical export writes for missing classes
const NULL_CONST: &str = "(null)";

// ============================================================================
// HISTORICAL ASSESSMENTS
// ============================================================================

#[derive(Debug, Deserialize)]
struct HistoryRecord {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    parid: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    taxyr: Option<i64>,
    #[serde(default)]
    valclass: String,
    #[serde(default)]
    ovrclass: String,
    #[serde(default)]
    cur: String,
}

fn present(class: &str) -> Option<&str> {
    let class = class.trim();
    if class.is_empty() || class == NULL_CONST {
        None
    } else {
        Some(class)
    }
}

/// One Minatoya unit in one tax year
#[derive(Debug, Clone, PartialEq)]
pub struct UnitYear {
    pub tmk: Tmk,
    pub complex_id: i64,
    pub region: Region,
    pub taxyr: i64,
    pub tax_class: TaxClass,
}

impl UnitYear {
    /// Vacation rentals were classed hotel/resort before tvr-strh existed
    pub fn is_tvr(&self) -> bool {
        self.tax_class.is_short_term_rental()
    }
}

/// Current-record rows for units in Minatoya complexes, sorted by TMK and
/// tax year. The override class wins over the valuation class.
pub fn load_minatoya_history(path: &Path, years: YearRange) -> Result<Vec<UnitYear>> {
    let loaded = load_records::<HistoryRecord>(path, &LoadOptions::new())?;
    let mut bad_class = 0;

    let mut units: Vec<UnitYear> = loaded
        .records
        .into_iter()
        .filter(|r| r.cur.trim() == "Y")
        .filter_map(|r| {
            let code = present(&r.ovrclass).or_else(|| present(&r.valclass))?;
            let tax_class = match TaxClass::parse_code(code) {
                Ok(class) => class,
                Err(e) => {
                    debug!("{}", e);
                    bad_class += 1;
                    return None;
                }
            };
            let taxyr = r.taxyr.filter(|y| years.contains(*y))?;
            let tmk = r.parid.and_then(Tmk::from_parid)?;
            // a missing region is a rare typo in the TMK
            let region = tmk.region()?;
            let complex_id = tmk.complex_id();
            if !is_minatoya_complex(complex_id) {
                return None;
            }
            Some(UnitYear {
                tmk,
                complex_id,
                region,
                taxyr,
                tax_class,
            })
        })
        .collect();

    units.sort_by_key(|u| (u.tmk, u.taxyr));

    info!(
        "History: {} Minatoya unit-years ({} rows with unknown class)",
        units.len(),
        bad_class
    );
    Ok(units)
}

// ============================================================================
// OCCUPANCY PER COMPLEX
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct YearCounts {
    total: usize,
    tvr: usize,
}

impl YearCounts {
    fn add(&mut self, unit: &UnitYear) {
        self.total += 1;
        if unit.is_tvr() {
            self.tvr += 1;
        }
    }

    fn tvr_pct(&self) -> f64 {
        pct(self.tvr as f64, self.total as f64).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexOccupancy {
    pub complex_name: String,
    pub tmk_sub: i64,
    pub region: Region,
    pub taxyr_of_min_tvr_pct: i64,
    pub min_tvr_count: usize,
    pub total_count_at_min_tvr_pct: usize,
    #[serde(skip_serializing)]
    pub cur_total_count: usize,
    pub min_tvr_pct: f64,
    pub cur_tvr_pct: f64,
    pub tvr_pct_diff: f64,
}

/// For each complex: the year its vacation-rental share was lowest (the
/// earliest such year on a tie) and how that compares to the latest year.
/// Sorted by the lowest share.
pub fn complex_tvr_occupancy(units: &[UnitYear]) -> Vec<ComplexOccupancy> {
    let mut by_complex: BTreeMap<i64, (Region, BTreeMap<i64, YearCounts>)> = BTreeMap::new();
    for unit in units {
        by_complex
            .entry(unit.complex_id)
            .or_insert_with(|| (unit.region, BTreeMap::new()))
            .1
            .entry(unit.taxyr)
            .or_default()
            .add(unit);
    }

    let mut rows: Vec<ComplexOccupancy> = by_complex
        .into_iter()
        .filter_map(|(complex_id, (region, years))| {
            let mut min: Option<(i64, YearCounts)> = None;
            for (year, counts) in &years {
                if min.map_or(true, |(_, best)| counts.tvr_pct() < best.tvr_pct()) {
                    min = Some((*year, *counts));
                }
            }
            let (min_year, min_counts) = min?;
            let (_, current) = years.iter().next_back()?;

            Some(ComplexOccupancy {
                complex_name: complex_name(complex_id).unwrap_or_default().to_string(),
                tmk_sub: complex_id,
                region,
                taxyr_of_min_tvr_pct: min_year,
                min_tvr_count: min_counts.tvr,
                total_count_at_min_tvr_pct: min_counts.total,
                cur_total_count: current.total,
                min_tvr_pct: min_counts.tvr_pct(),
                cur_tvr_pct: current.tvr_pct(),
                tvr_pct_diff: round1(current.tvr_pct() - min_counts.tvr_pct()),
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.min_tvr_pct
            .total_cmp(&b.min_tvr_pct)
            .then(a.tmk_sub.cmp(&b.tmk_sub))
    });

    info!("TVR occupancy: {} complexes", rows.len());
    rows
}

// ============================================================================
// THRESHOLD COUNTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CountType {
    /// Sum of units in the complexes
    Units,
    /// Number of complexes
    Complexes,
}

impl CountType {
    pub fn label(&self) -> &'static str {
        match self {
            CountType::Units => "units",
            CountType::Complexes => "complexes",
        }
    }
}

/// Thresholds from 100% down to 0% in steps of 5
pub fn thresholds() -> Vec<i64> {
    (0..=100).rev().step_by(5).collect()
}

/// Headers and rows of the threshold table
#[derive(Debug, Clone, PartialEq)]
pub struct ThreshTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// How many units (or complexes) would remain if only complexes whose
/// lowest vacation-rental share is at or below each threshold counted.
/// One row per region plus the county, sorted by the 100% column.
pub fn tvr_thresh_counts(complexes: &[ComplexOccupancy], count_type: CountType) -> ThreshTable {
    let thresholds = thresholds();
    let weight = |c: &ComplexOccupancy| match count_type {
        CountType::Units => c.cur_total_count,
        CountType::Complexes => 1,
    };

    let regions: BTreeSet<Region> = complexes.iter().map(|c| c.region).collect();
    let mut table: Vec<(String, Vec<usize>)> = regions
        .iter()
        .map(|region| (region.label().to_string(), Vec::new()))
        .collect();
    table.push((COUNTY_LABEL.to_string(), Vec::new()));

    for thresh in &thresholds {
        let under: Vec<&ComplexOccupancy> = complexes
            .iter()
            .filter(|c| c.min_tvr_pct <= *thresh as f64)
            .collect();

        for (i, region) in regions.iter().enumerate() {
            let count: usize = under
                .iter()
                .filter(|c| c.region == *region)
                .map(|c| weight(*c))
                .sum();
            table[i].1.push(count);
        }
        let county_count: usize = under.iter().map(|c| weight(*c)).sum();
        if let Some(county) = table.last_mut() {
            county.1.push(county_count);
        }
    }

    table.sort_by(|(a_region, a), (b_region, b)| {
        let a_first = a.first().copied().unwrap_or(0);
        let b_first = b.first().copied().unwrap_or(0);
        b_first.cmp(&a_first).then(a_region.cmp(b_region))
    });

    let mut headers = vec!["region".to_string()];
    headers.extend(thresholds.iter().map(|t| format!("{}_{}%", count_type.label(), t)));

    let rows = table
        .into_iter()
        .map(|(region, counts)| {
            let mut row = vec![region];
            row.extend(counts.iter().map(|c| c.to_string()));
            row
        })
        .collect();

    ThreshTable { headers, rows }
}

// ============================================================================
// RATES OVER TIME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TvrRate {
    pub region: String,
    pub taxyr: i64,
    pub tvr_pct: f64,
    pub tvr_count: usize,
    pub total_count: usize,
}

impl TvrRate {
    fn new(region: String, taxyr: i64, counts: &YearCounts) -> Self {
        TvrRate {
            region,
            taxyr,
            tvr_pct: counts.tvr_pct(),
            tvr_count: counts.tvr,
            total_count: counts.total,
        }
    }
}

/// Yearly vacation-rental share across complexes whose lowest share was
/// below `thresh` percent, per region and county-wide
pub fn tvr_rates(units: &[UnitYear], complexes: &[ComplexOccupancy], thresh: i64) -> Vec<TvrRate> {
    let selected: BTreeSet<i64> = complexes
        .iter()
        .filter(|c| c.min_tvr_pct < thresh as f64)
        .map(|c| c.tmk_sub)
        .collect();

    let mut by_region: BTreeMap<(Region, i64), YearCounts> = BTreeMap::new();
    let mut by_year: BTreeMap<i64, YearCounts> = BTreeMap::new();
    for unit in units.iter().filter(|u| selected.contains(&u.complex_id)) {
        by_region.entry((unit.region, unit.taxyr)).or_default().add(unit);
        by_year.entry(unit.taxyr).or_default().add(unit);
    }

    let mut rows: Vec<TvrRate> = by_region
        .iter()
        .map(|((region, taxyr), counts)| TvrRate::new(region.label().to_string(), *taxyr, counts))
        .collect();
    rows.extend(
        by_year
            .iter()
            .map(|(taxyr, counts)| TvrRate::new(COUNTY_LABEL.to_string(), *taxyr, counts)),
    );

    info!("TVR rates: {} complexes under {}%, {} rows", selected.len(), thresh, rows.len());
    rows
}
