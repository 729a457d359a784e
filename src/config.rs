// ⚙️ Report configuration
// Every tunable the reports use, loaded from TOML. Missing fields fall back
// to the defaults below, so an empty file is a valid config.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Dollar year for sale prices. RPAD sales run through 2024 but
    /// household income only through 2023.
    #[serde(default = "default_inflation_base_year")]
    pub inflation_base_year: i64,

    /// Dollar year for the census-only income report
    #[serde(default = "default_income_inflation_base_year")]
    pub income_inflation_base_year: i64,

    /// Dollar year for the FRED-interpolated income report
    #[serde(default = "default_interpolated_income_inflation_base_year")]
    pub interpolated_income_inflation_base_year: i64,

    #[serde(default)]
    pub sales: SalesConfig,

    #[serde(default)]
    pub dwellings: DwellingsConfig,

    /// Years built covered by home-construction-by-decade
    #[serde(default = "default_construction_years", deserialize_with = "construction_years")]
    pub construction: YearRange,

    /// Years built that count as new homes for new-home-usage
    #[serde(default = "default_new_home_years", deserialize_with = "new_home_years")]
    pub new_homes: YearRange,

    #[serde(default)]
    pub affordability: AffordabilityConfig,

    #[serde(default)]
    pub income: IncomeConfig,

    /// Tax years read from the historical assessments. Owner-occupied
    /// classification starts in 1993.
    #[serde(default = "default_history_years", deserialize_with = "history_years")]
    pub history: YearRange,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            inflation_base_year: default_inflation_base_year(),
            income_inflation_base_year: default_income_inflation_base_year(),
            interpolated_income_inflation_base_year:
                default_interpolated_income_inflation_base_year(),
            sales: SalesConfig::default(),
            dwellings: DwellingsConfig::default(),
            construction: default_construction_years(),
            new_homes: default_new_home_years(),
            affordability: AffordabilityConfig::default(),
            income: IncomeConfig::default(),
            history: default_history_years(),
        }
    }
}

fn default_inflation_base_year() -> i64 {
    2023
}

fn default_income_inflation_base_year() -> i64 {
    2020
}

fn default_interpolated_income_inflation_base_year() -> i64 {
    2023
}

/// Inclusive range of years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min_year: i64,
    pub max_year: i64,
}

impl YearRange {
    pub fn new(min_year: i64, max_year: i64) -> Self {
        Self { min_year, max_year }
    }

    pub fn contains(&self, year: i64) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }
}

fn default_construction_years() -> YearRange {
    YearRange::new(1970, 2023)
}

fn default_new_home_years() -> YearRange {
    YearRange::new(2010, 2023)
}

fn default_history_years() -> YearRange {
    YearRange::new(1993, 2025)
}

/// A `[construction]`-style table where either bound may be left out
#[derive(Debug, Deserialize)]
struct PartialYearRange {
    min_year: Option<i64>,
    max_year: Option<i64>,
}

impl PartialYearRange {
    fn or(self, default: YearRange) -> YearRange {
        YearRange::new(
            self.min_year.unwrap_or(default.min_year),
            self.max_year.unwrap_or(default.max_year),
        )
    }
}

fn construction_years<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<YearRange, D::Error> {
    Ok(PartialYearRange::deserialize(d)?.or(default_construction_years()))
}

fn new_home_years<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<YearRange, D::Error> {
    Ok(PartialYearRange::deserialize(d)?.or(default_new_home_years()))
}

fn history_years<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<YearRange, D::Error> {
    Ok(PartialYearRange::deserialize(d)?.or(default_history_years()))
}

/// Sales extract filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesConfig {
    /// Sales at or below this price are transfers, not market sales.
    #[serde(default = "default_min_price")]
    pub min_price: f64,

    /// Very few sales are on record before 1984.
    #[serde(default = "default_sales_min_year")]
    pub min_year: i64,

    #[serde(default = "default_sales_max_year")]
    pub max_year: i64,
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            min_price: default_min_price(),
            min_year: default_sales_min_year(),
            max_year: default_sales_max_year(),
        }
    }
}

impl SalesConfig {
    pub fn years(&self) -> YearRange {
        YearRange::new(self.min_year, self.max_year)
    }
}

fn default_min_price() -> f64 {
    20_000.0
}

fn default_sales_min_year() -> i64 {
    1984
}

fn default_sales_max_year() -> i64 {
    2024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DwellingsConfig {
    /// Living areas smaller than this are treated as unknown
    #[serde(default = "default_min_sqft")]
    pub min_sqft: i64,
}

impl Default for DwellingsConfig {
    fn default() -> Self {
        Self {
            min_sqft: default_min_sqft(),
        }
    }
}

fn default_min_sqft() -> i64 {
    200
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityConfig {
    /// A sale is affordable at or below this multiple of median income
    #[serde(default = "default_price_to_income_ratio")]
    pub price_to_income_ratio: f64,
}

impl Default for AffordabilityConfig {
    fn default() -> Self {
        Self {
            price_to_income_ratio: default_price_to_income_ratio(),
        }
    }
}

fn default_price_to_income_ratio() -> f64 {
    5.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeConfig {
    /// FRED's Maui series has gaps before this year; use Hawaii before it
    #[serde(default = "default_fred_switch_year")]
    pub fred_switch_year: i64,

    /// No tract-level data for Lanai before this year
    #[serde(default = "default_lanai_first_year")]
    pub lanai_first_year: i64,
}

impl Default for IncomeConfig {
    fn default() -> Self {
        Self {
            fred_switch_year: default_fred_switch_year(),
            lanai_first_year: default_lanai_first_year(),
        }
    }
}

fn default_fred_switch_year() -> i64 {
    2000
}

fn default_lanai_first_year() -> i64 {
    1990
}

impl ReportConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ReportConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Default configuration as a commented TOML document.
    pub fn default_toml() -> Result<String> {
        let body = toml::to_string_pretty(&ReportConfig::default())
            .context("Failed to serialize default config")?;
        Ok(format!(
            "# maui-housing report configuration\n\
             # Every field is optional; omitted fields use the values shown.\n\n{}",
            body
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ReportConfig::default();
        assert_eq!(config.inflation_base_year, 2023);
        assert_eq!(config.income_inflation_base_year, 2020);
        assert_eq!(config.sales.min_price, 20_000.0);
        assert_eq!(config.construction, YearRange::new(1970, 2023));
        assert_eq!(config.history, YearRange::new(1993, 2025));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let toml_content = r#"
inflation_base_year = 2024

[sales]
min_price = 50000

[new_homes]
min_year = 2015
max_year = 2024
"#;

        let config: ReportConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.inflation_base_year, 2024);
        assert_eq!(config.sales.min_price, 50_000.0);
        assert_eq!(config.sales.min_year, 1984, "unset field keeps its default");
        assert_eq!(config.new_homes, YearRange::new(2015, 2024));
        assert_eq!(config.dwellings.min_sqft, 200);
    }

    #[test]
    fn test_year_range_with_one_bound() {
        let toml_content = r#"
[construction]
min_year = 1980

[history]
max_year = 2020
"#;

        let config: ReportConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.construction, YearRange::new(1980, 2023), "max_year keeps its default");
        assert_eq!(config.history, YearRange::new(1993, 2020), "min_year keeps its default");
        assert_eq!(config.new_homes, YearRange::new(2010, 2023));
    }

    #[test]
    fn test_default_toml_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("maui-housing.toml");
        std::fs::write(&path, ReportConfig::default_toml().unwrap()).unwrap();

        let config = ReportConfig::load(&path).unwrap();
        assert_eq!(config.income.fred_switch_year, 2000);
        assert_eq!(config.affordability.price_to_income_ratio, 5.0);

        assert!(ReportConfig::load_or_default(None).is_ok());
    }
}
