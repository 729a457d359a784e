// 🔨 Home construction reports
// How many homes each region built per decade, and who lives in the
// homes built recently.

use crate::config::YearRange;
use crate::regions::{region_label, Region, COUNTY_LABEL};
use crate::rpad::{HomeType, Property};
use crate::stats::{median, pct};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

// ============================================================================
// CONSTRUCTION BY DECADE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecadeConstruction {
    pub home_type: String,
    pub decade: i64,
    pub decade_desc: String,
    pub region: String,
    pub decade_yearly_avg: Option<i64>,
    pub decade_yearly_avg_all_regions: Option<i64>,
    pub decade_region_pct: Option<f64>,
    pub sqft_median: Option<f64>,
    pub sqft_median_all_regions: Option<f64>,
    pub sqft_median_region_pct: Option<f64>,
}

/// Observed span of build years within one decade
#[derive(Debug, Clone, Copy)]
struct DecadeSpan {
    first: i64,
    last: i64,
}

impl DecadeSpan {
    fn desc(&self) -> String {
        format!("{}-{}", self.first, self.last)
    }

    fn num_years(&self) -> i64 {
        self.last - self.first + 1
    }
}

#[derive(Debug, Default)]
struct Group {
    count: i64,
    sqft: Vec<f64>,
}

impl Group {
    fn add(&mut self, property: &Property) {
        self.count += 1;
        if let Some(sqft) = property.dwelling.sf_of_living_area {
            self.sqft.push(sqft);
        }
    }

    fn sqft_median(&self) -> Option<f64> {
        median(self.sqft.iter().copied())
    }
}

/// Counts and medians before they are turned into yearly averages
struct DecadeTotals {
    home_type: String,
    decade: i64,
    region: String,
    count: i64,
    count_all_regions: Option<i64>,
    sqft_median: Option<f64>,
    sqft_median_all_regions: Option<f64>,
}

impl DecadeTotals {
    fn finish(self, span: Option<&DecadeSpan>) -> DecadeConstruction {
        let num_years = span.map(|s| s.num_years()).filter(|n| *n > 0);
        let yearly = |count: i64| num_years.map(|n| count.div_euclid(n));

        DecadeConstruction {
            decade_desc: span.map(|s| s.desc()).unwrap_or_default(),
            decade_yearly_avg: yearly(self.count),
            decade_yearly_avg_all_regions: self.count_all_regions.and_then(yearly),
            decade_region_pct: self
                .count_all_regions
                .and_then(|all| pct(self.count as f64, all as f64)),
            sqft_median_region_pct: match (self.sqft_median, self.sqft_median_all_regions) {
                (Some(sqft), Some(all)) => pct(sqft, all),
                _ => None,
            },
            home_type: self.home_type,
            decade: self.decade,
            region: self.region,
            sqft_median: self.sqft_median,
            sqft_median_all_regions: self.sqft_median_all_regions,
        }
    }
}

/// Average homes built per year in each decade, per region and home type.
///
/// Every observed region, decade and home type combination gets a row, even
/// with a count of zero. Blocks are written in this order: regions by home
/// type, regions for all homes, county by home type, county for all homes.
pub fn home_construction_by_decade(properties: &[Property], years: YearRange) -> Vec<DecadeConstruction> {
    let mut spans: BTreeMap<i64, DecadeSpan> = BTreeMap::new();
    let mut regional: HashMap<(Option<Region>, i64, HomeType), Group> = HashMap::new();
    let mut county: BTreeMap<(HomeType, i64), Group> = BTreeMap::new();
    let mut regions = BTreeSet::new();
    let mut home_types = BTreeSet::new();

    for property in properties {
        let year_built = match property.dwelling.year_built {
            Some(year) if years.contains(year) => year,
            _ => continue,
        };
        let decade = year_built.div_euclid(10) * 10;
        let home_type = property.home_type();

        spans
            .entry(decade)
            .and_modify(|s| {
                s.first = s.first.min(year_built);
                s.last = s.last.max(year_built);
            })
            .or_insert(DecadeSpan {
                first: year_built,
                last: year_built,
            });
        regional
            .entry((property.region, decade, home_type))
            .or_default()
            .add(property);
        county.entry((home_type, decade)).or_default().add(property);
        regions.insert(property.region);
        home_types.insert(home_type);
    }

    let county_count = |home_type: HomeType, decade: i64| county.get(&(home_type, decade)).map(|g| g.count);
    let mut totals: Vec<DecadeTotals> = Vec::new();

    // regions by home type, zero-filled
    for home_type in &home_types {
        for region in &regions {
            for decade in spans.keys() {
                let group = regional.get(&(*region, *decade, *home_type));
                let county_group = county.get(&(*home_type, *decade));
                totals.push(DecadeTotals {
                    home_type: home_type.label().to_string(),
                    decade: *decade,
                    region: region_label(*region),
                    count: group.map_or(0, |g| g.count),
                    count_all_regions: county_group.map(|g| g.count),
                    sqft_median: group.and_then(|g| g.sqft_median()),
                    sqft_median_all_regions: county_group.and_then(|g| g.sqft_median()),
                });
            }
        }
    }

    // regions, all homes
    for region in &regions {
        for decade in spans.keys() {
            let count = home_types
                .iter()
                .filter_map(|t| regional.get(&(*region, *decade, *t)))
                .map(|g| g.count)
                .sum();
            let count_all_regions = home_types.iter().filter_map(|t| county_count(*t, *decade)).sum();
            totals.push(DecadeTotals {
                home_type: HomeType::ALL_HOMES_LABEL.to_string(),
                decade: *decade,
                region: region_label(*region),
                count,
                count_all_regions: Some(count_all_regions),
                sqft_median: None,
                sqft_median_all_regions: None,
            });
        }
    }

    // county by home type
    for ((home_type, decade), group) in &county {
        totals.push(DecadeTotals {
            home_type: home_type.label().to_string(),
            decade: *decade,
            region: COUNTY_LABEL.to_string(),
            count: group.count,
            count_all_regions: Some(group.count),
            sqft_median: group.sqft_median(),
            sqft_median_all_regions: group.sqft_median(),
        });
    }

    // county, all homes
    for decade in spans.keys() {
        let count: i64 = home_types.iter().filter_map(|t| county_count(*t, *decade)).sum();
        totals.push(DecadeTotals {
            home_type: HomeType::ALL_HOMES_LABEL.to_string(),
            decade: *decade,
            region: COUNTY_LABEL.to_string(),
            count,
            count_all_regions: Some(count),
            sqft_median: None,
            sqft_median_all_regions: None,
        });
    }

    let rows: Vec<DecadeConstruction> = totals
        .into_iter()
        .map(|t| {
            let span = spans.get(&t.decade);
            t.finish(span)
        })
        .collect();

    info!("Construction by decade: {} rows over {} decades", rows.len(), spans.len());
    rows
}

// ============================================================================
// NEW HOME USAGE
// ============================================================================

/// Declared in label order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidentType {
    Nonresident,
    Resident,
}

impl ResidentType {
    pub fn of(property: &Property) -> ResidentType {
        if property.tax_class.is_resident() {
            ResidentType::Resident
        } else {
            ResidentType::Nonresident
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewHomeUsage {
    pub home_type: String,
    pub region: String,
    pub resident_type: ResidentType,
    pub count: usize,
    pub pct: Option<f64>,
}

/// Homes built within `years`, split by whether residents live in them
/// (owner-occupied or long-term rental) or not.
pub fn new_home_usage(properties: &[Property], years: YearRange) -> Vec<NewHomeUsage> {
    let mut regional: BTreeMap<(HomeType, Option<Region>, ResidentType), usize> = BTreeMap::new();
    let mut county: BTreeMap<(HomeType, ResidentType), usize> = BTreeMap::new();
    let mut regional_all: BTreeMap<(Option<Region>, ResidentType), usize> = BTreeMap::new();
    let mut county_all: BTreeMap<ResidentType, usize> = BTreeMap::new();

    for property in properties {
        if !property.dwelling.year_built.map_or(false, |y| years.contains(y)) {
            continue;
        }
        let home_type = property.home_type();
        let resident_type = ResidentType::of(property);

        *regional.entry((home_type, property.region, resident_type)).or_default() += 1;
        *county.entry((home_type, resident_type)).or_default() += 1;
        *regional_all.entry((property.region, resident_type)).or_default() += 1;
        *county_all.entry(resident_type).or_default() += 1;
    }

    let mut rows: Vec<NewHomeUsage> = Vec::new();
    let mut push = |home_type: &str, region: String, resident_type: ResidentType, count: usize| {
        rows.push(NewHomeUsage {
            home_type: home_type.to_string(),
            region,
            resident_type,
            count,
            pct: None,
        })
    };

    for ((home_type, region, resident_type), count) in &regional {
        push(home_type.label(), region_label(*region), *resident_type, *count);
    }
    for ((home_type, resident_type), count) in &county {
        push(home_type.label(), COUNTY_LABEL.to_string(), *resident_type, *count);
    }
    for ((region, resident_type), count) in &regional_all {
        push(HomeType::ALL_HOMES_LABEL, region_label(*region), *resident_type, *count);
    }
    for (resident_type, count) in &county_all {
        push(HomeType::ALL_HOMES_LABEL, COUNTY_LABEL.to_string(), *resident_type, *count);
    }

    // share of each resident type within its region and home type
    let mut group_totals: HashMap<(String, String), usize> = HashMap::new();
    for row in &rows {
        *group_totals
            .entry((row.region.clone(), row.home_type.clone()))
            .or_default() += row.count;
    }
    for row in &mut rows {
        let total = group_totals
            .get(&(row.region.clone(), row.home_type.clone()))
            .copied()
            .unwrap_or(0);
        row.pct = pct(row.count as f64, total as f64);
    }

    info!("New home usage: {} rows", rows.len());
    rows
}
