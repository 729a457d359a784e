// 🏠 RPAD property relations
// Loads the CSVs produced by the extract parsers and joins them into the
// relations every property report starts from: residential parcels with a
// dwelling, and their market sales.

use crate::config::{DwellingsConfig, SalesConfig};
use crate::cpi::Inflation;
use crate::regions::Region;
use crate::table::{leading_year, load_records, LoadOptions};
use crate::tax_class::TaxClass;
use crate::tmk::Tmk;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

// ============================================================================
// HOME TYPE
// ============================================================================

/// Declared in label order so derived Ord sorts like the labels do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HomeType {
    #[serde(rename = "Condo")]
    Condo,
    #[serde(rename = "Single Family Home")]
    SingleFamilyHome,
}

impl HomeType {
    /// Label used for rows that total both home types
    pub const ALL_HOMES_LABEL: &'static str = "All Homes";

    pub fn label(&self) -> &'static str {
        match self {
            HomeType::Condo => "Condo",
            HomeType::SingleFamilyHome => "Single Family Home",
        }
    }

    pub fn from_is_condo(is_condo: bool) -> HomeType {
        if is_condo {
            HomeType::Condo
        } else {
            HomeType::SingleFamilyHome
        }
    }
}

// ============================================================================
// ASSESSMENTS
// ============================================================================

#[derive(Debug, Deserialize)]
struct AssessmentRecord {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    tmk: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    tax_rate_class: Option<TaxClass>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    assessed_building_value: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    assessed_land_value: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    building_exemption: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AssessedValues {
    pub building: Option<f64>,
    pub land: Option<f64>,
    pub building_exemption: Option<f64>,
}

/// One residential parcel from the assessment file
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub tmk: Tmk,
    pub region: Option<Region>,
    pub tax_class: TaxClass,
    pub values: AssessedValues,
}

fn read_assessment_records(path: &Path) -> Result<Vec<(Tmk, AssessmentRecord)>> {
    let loaded = load_records::<AssessmentRecord>(path, &LoadOptions::new())?;

    // There are a few bad rows with truncated keys
    let records: Vec<(Tmk, AssessmentRecord)> = loaded
        .records
        .into_iter()
        .filter_map(|r| r.tmk.and_then(Tmk::new).map(|tmk| (tmk, r)))
        .collect();

    debug!(
        "{}: {} rows with a valid TMK ({} unreadable)",
        path.display(),
        records.len(),
        loaded.dropped
    );
    Ok(records)
}

/// Residential parcels, one per TMK.
///
/// When `prior` is given, tax classes still come from `path` but assessed
/// values come from the prior year's file. The current roll zeroes the
/// building values of parcels destroyed in the August 2023 fires.
pub fn load_assessments(path: &Path, prior: Option<&Path>) -> Result<Vec<Assessment>> {
    let current = read_assessment_records(path)?;

    let prior_values: Option<HashMap<Tmk, AssessedValues>> = match prior {
        Some(prior_path) => {
            let mut values = HashMap::new();
            for (tmk, r) in read_assessment_records(prior_path)? {
                values.entry(tmk).or_insert(AssessedValues {
                    building: r.assessed_building_value,
                    land: r.assessed_land_value,
                    building_exemption: r.building_exemption,
                });
            }
            Some(values)
        }
        None => None,
    };

    let mut seen = HashSet::new();
    let mut assessments = Vec::new();

    for (tmk, record) in current {
        let tax_class = match record.tax_rate_class {
            Some(class) if class.is_residential() => class,
            _ => continue,
        };

        // A few TMKs carry two residential classes. Which one doesn't
        // matter here, so the first wins.
        if !seen.insert(tmk) {
            continue;
        }

        let values = match &prior_values {
            Some(prior) => prior.get(&tmk).copied().unwrap_or_default(),
            None => AssessedValues {
                building: record.assessed_building_value,
                land: record.assessed_land_value,
                building_exemption: record.building_exemption,
            },
        };

        assessments.push(Assessment {
            tmk,
            region: tmk.region(),
            tax_class,
            values,
        });
    }

    info!("Assessments: {} residential parcels", assessments.len());
    Ok(assessments)
}

// ============================================================================
// DWELLINGS
// ============================================================================

#[derive(Debug, Deserialize)]
struct DwellingRecord {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    tmk: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    sf_of_living_area: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    year_built: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    bed_rooms: Option<i64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    condo_type: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dwelling {
    pub tmk: Tmk,
    pub sf_of_living_area: Option<f64>,
    pub year_built: Option<i64>,
    pub bed_rooms: Option<i64>,
    pub is_condo: bool,
}

impl Dwelling {
    pub fn home_type(&self) -> HomeType {
        HomeType::from_is_condo(self.is_condo)
    }
}

/// Every dwelling card in the file
pub fn load_dwellings(path: &Path, config: &DwellingsConfig) -> Result<Vec<Dwelling>> {
    let loaded = load_records::<DwellingRecord>(path, &LoadOptions::new())?;
    let min_sqft = config.min_sqft as f64;

    let dwellings: Vec<Dwelling> = loaded
        .records
        .into_iter()
        .filter_map(|r| {
            let tmk = r.tmk.and_then(Tmk::new)?;
            Some(Dwelling {
                tmk,
                // suspiciously small areas are data entry errors
                sf_of_living_area: r.sf_of_living_area.filter(|sqft| *sqft >= min_sqft),
                year_built: r.year_built,
                bed_rooms: r.bed_rooms,
                is_condo: r.condo_type.map_or(false, |t| t > 0),
            })
        })
        .collect();

    info!("Dwellings: {} cards from {}", dwellings.len(), path.display());
    Ok(dwellings)
}

/// Keep the dwelling with the largest living area for each TMK.
/// Cards with an unknown area (including ones under the size floor) rank
/// ahead of every known area; ties keep file order.
pub fn largest_dwelling_per_tmk(dwellings: Vec<Dwelling>) -> Vec<Dwelling> {
    let mut order = Vec::new();
    let mut best: HashMap<Tmk, Dwelling> = HashMap::new();

    for dwelling in dwellings {
        let replace = match best.get(&dwelling.tmk) {
            Some(current) => is_larger(&dwelling, current),
            None => {
                order.push(dwelling.tmk);
                true
            }
        };
        if replace {
            best.insert(dwelling.tmk, dwelling);
        }
    }

    order.into_iter().filter_map(|tmk| best.remove(&tmk)).collect()
}

fn is_larger(candidate: &Dwelling, current: &Dwelling) -> bool {
    match (candidate.sf_of_living_area, current.sf_of_living_area) {
        (Some(a), Some(b)) => a.total_cmp(&b) == Ordering::Greater,
        (None, Some(_)) => true,
        _ => false,
    }
}

// ============================================================================
// COMBINED RELATION
// ============================================================================

/// A residential parcel with its (largest) dwelling
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub tmk: Tmk,
    pub region: Option<Region>,
    pub tax_class: TaxClass,
    pub values: AssessedValues,
    pub dwelling: Dwelling,
}

impl Property {
    pub fn is_condo(&self) -> bool {
        self.dwelling.is_condo
    }

    pub fn home_type(&self) -> HomeType {
        self.dwelling.home_type()
    }
}

/// Inner join on TMK: undeveloped lots (no dwelling) drop out
pub fn combine(assessments: Vec<Assessment>, dwellings: Vec<Dwelling>) -> Vec<Property> {
    let mut by_tmk: HashMap<Tmk, Dwelling> = largest_dwelling_per_tmk(dwellings)
        .into_iter()
        .map(|d| (d.tmk, d))
        .collect();

    assessments
        .into_iter()
        .filter_map(|a| {
            let dwelling = by_tmk.remove(&a.tmk)?;
            Some(Property {
                tmk: a.tmk,
                region: a.region,
                tax_class: a.tax_class,
                values: a.values,
                dwelling,
            })
        })
        .collect()
}

/// Input files for the property relation
#[derive(Debug, Clone, Copy)]
pub struct PropertyFiles<'a> {
    pub assessments: &'a Path,
    pub prior_assessments: Option<&'a Path>,
    pub dwellings: &'a Path,
}

/// Residential parcels with at least one dwelling
pub fn load_properties(files: PropertyFiles<'_>, config: &DwellingsConfig) -> Result<Vec<Property>> {
    let assessments = load_assessments(files.assessments, files.prior_assessments)?;
    let dwellings = load_dwellings(files.dwellings, config)?;
    let properties = combine(assessments, dwellings);
    info!("Properties: {} residential parcels with a dwelling", properties.len());
    Ok(properties)
}

// ============================================================================
// SALES
// ============================================================================

#[derive(Debug, Deserialize)]
struct SaleRecord {
    #[serde(default)]
    parid: String,
    #[serde(default)]
    saledate: String,
    #[serde(default)]
    recorddate: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    price: Option<f64>,
    #[serde(default)]
    instruno: String,
    #[serde(default)]
    landcourt_no: String,
    #[serde(default)]
    cert_no: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub tmk: Tmk,
    pub sale_year: i64,
    pub price: f64,
    pub saledate: String,
    pub recorddate: String,
    pub instruno: String,
    pub landcourt_no: String,
    pub cert_no: String,
}

impl Sale {
    /// One deed recording several parcels repeats these fields on every
    /// parcel's row.
    fn deed_key(&self) -> (String, u64, String, String, String, String) {
        (
            self.saledate.clone(),
            self.price.to_bits(),
            self.recorddate.clone(),
            self.instruno.clone(),
            self.landcourt_no.clone(),
            self.cert_no.clone(),
        )
    }
}

/// Year of sale. Some sale dates read 1900, which is clearly wrong; the
/// recording date stands in for those and for unreadable dates.
pub fn sale_year(saledate: &str, recorddate: &str) -> Option<i64> {
    match leading_year(saledate) {
        Some(year) if year != 1900 => Some(year),
        _ => leading_year(recorddate),
    }
}

/// Market sales within the configured price floor and year range
pub fn load_sales(path: &Path, config: &SalesConfig) -> Result<Vec<Sale>> {
    let loaded = load_records::<SaleRecord>(path, &LoadOptions::new().flexible())?;
    let years = config.years();
    let total = loaded.len();

    let sales: Vec<Sale> = loaded
        .records
        .into_iter()
        .filter_map(|r| {
            let tmk = Tmk::parse_parid(&r.parid)?;
            let price = r.price.filter(|p| *p > config.min_price)?;
            let sale_year = sale_year(&r.saledate, &r.recorddate).filter(|y| years.contains(*y))?;
            Some(Sale {
                tmk,
                sale_year,
                price,
                saledate: r.saledate,
                recorddate: r.recorddate,
                instruno: r.instruno,
                landcourt_no: r.landcourt_no,
                cert_no: r.cert_no,
            })
        })
        .collect();

    info!(
        "Sales: kept {} of {} rows (price > {}, {}-{})",
        sales.len(),
        total,
        config.min_price,
        years.min_year,
        years.max_year
    );
    Ok(sales)
}

/// A sale of a residential property, with its price in base-year dollars
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySale {
    pub property: Property,
    pub sale: Sale,
    pub adj_price: Option<i64>,
}

impl PropertySale {
    pub fn year(&self) -> i64 {
        self.sale.sale_year
    }

    pub fn region(&self) -> Option<Region> {
        self.property.region
    }
}

/// Inner join of properties and sales on TMK. A deed that covers several
/// parcels is counted once.
pub fn join_sales(properties: &[Property], sales: Vec<Sale>, inflation: &Inflation<'_>) -> Vec<PropertySale> {
    let by_tmk: HashMap<Tmk, &Property> = properties.iter().map(|p| (p.tmk, p)).collect();
    let mut deeds = HashSet::new();
    let mut joined = Vec::new();

    for sale in sales {
        let property = match by_tmk.get(&sale.tmk) {
            Some(property) => *property,
            None => continue,
        };
        if !deeds.insert(sale.deed_key()) {
            continue;
        }
        let adj_price = inflation.adjust(sale.price, sale.sale_year);
        joined.push(PropertySale {
            property: property.clone(),
            sale,
            adj_price,
        });
    }

    info!("Sales joined to properties: {}", joined.len());
    joined
}
