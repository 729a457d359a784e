//! Command-line interface argument parsing.
//!
//! One subcommand per report. Every report writes a CSV plus a companion
//! .txt with a source link and input checksums.

use clap::{Args as ClapArgs, Parser, Subcommand};
use maui_housing::crowding::ACS_YEARS;
use maui_housing::tvr::CountType;
use std::path::{Path, PathBuf};

/// maui-housing - housing reports from Maui County public data
///
/// Converts RPAD fixed-width extracts to CSV and builds sales, construction,
/// vacation rental, income, and crowding reports by region.
///
/// Examples:
///   maui-housing parse-assessments -f ASMTGIS.txt -o assessments.csv
///   maui-housing condo-sales -a assessments.csv -d dwellings.csv -s sales.csv -c cpi.csv -o condo-sales.csv
///   maui-housing init-config
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, built-in defaults are used
    #[arg(long, global = true, value_name = "FILE", env = "MAUI_HOUSING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (warnings and errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::WARN
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

// ============================================================================
// SHARED OPTION GROUPS
// ============================================================================

/// Input and output of a fixed-width conversion
#[derive(ClapArgs, Debug, Clone)]
pub struct ParseArgs {
    /// RPAD fixed-width extract
    #[arg(short, long = "file", value_name = "FILE")]
    pub file: PathBuf,

    /// Output filename (csv format). Prints to stdout when omitted
    #[arg(short, long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,
}

/// Assessment and dwelling files that make up the property relation
#[derive(ClapArgs, Debug, Clone)]
pub struct PropertyArgs {
    /// Assessments filename (csv format)
    #[arg(short, long, value_name = "FILE")]
    pub assessments: PathBuf,

    /// Prior-year assessments filename (csv format). Assessed values come
    /// from this file, tax class from the current one
    #[arg(long, value_name = "FILE")]
    pub prior_assessments: Option<PathBuf>,

    /// Dwellings filename (csv format)
    #[arg(short, long, value_name = "FILE")]
    pub dwellings: PathBuf,
}

impl PropertyArgs {
    pub fn files(&self) -> maui_housing::rpad::PropertyFiles<'_> {
        maui_housing::rpad::PropertyFiles {
            assessments: &self.assessments,
            prior_assessments: self.prior_assessments.as_deref(),
            dwellings: &self.dwellings,
        }
    }
}

/// Properties plus sales and CPI
#[derive(ClapArgs, Debug, Clone)]
pub struct SalesArgs {
    #[command(flatten)]
    pub properties: PropertyArgs,

    /// Sales filename (csv format)
    #[arg(short, long, value_name = "FILE")]
    pub sales: PathBuf,

    /// CPI filename (csv format)
    #[arg(short, long, value_name = "FILE")]
    pub cpi: PathBuf,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct OutArgs {
    /// Output filename (csv format)
    #[arg(short, long = "out", value_name = "FILE")]
    pub out: PathBuf,
}

// ============================================================================
// SUBCOMMANDS
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert the RPAD assessments extract to CSV
    ParseAssessments(ParseArgs),

    /// Convert the RPAD dwellings extract to CSV
    ParseDwellings(ParseArgs),

    /// Convert the RPAD owners extract to CSV
    ParseOwners(ParseArgs),

    /// Convert the RPAD sales extract to CSV
    ParseSales(ParseArgs),

    /// Convert any RPAD extract, detecting its kind from the filename
    ParseExtract(ParseArgs),

    /// Median single family home sale prices by region and year
    SingleFamilyHomeSales {
        #[command(flatten)]
        inputs: SalesArgs,
        #[command(flatten)]
        out: OutArgs,
    },

    /// Median condo sale prices by region and year
    CondoSales {
        #[command(flatten)]
        inputs: SalesArgs,
        #[command(flatten)]
        out: OutArgs,
    },

    /// Share of sales affordable at a multiple of median household income
    AffordableSales {
        #[command(flatten)]
        inputs: SalesArgs,

        /// Household income filename (output of maui-household-income)
        #[arg(short, long, value_name = "FILE")]
        income: PathBuf,

        #[command(flatten)]
        out: OutArgs,
    },

    /// Homes built per year and median living area by decade and region
    HomeConstructionByDecade {
        #[command(flatten)]
        inputs: PropertyArgs,
        #[command(flatten)]
        out: OutArgs,
    },

    /// Resident and nonresident use of recently built homes
    NewHomeUsage {
        #[command(flatten)]
        inputs: PropertyArgs,
        #[command(flatten)]
        out: OutArgs,
    },

    /// Compare Minatoya condos with resident-occupied condos
    CondoCharacteristics {
        #[command(flatten)]
        inputs: PropertyArgs,
        #[command(flatten)]
        out: OutArgs,
    },

    /// Lowest vacation rental share per Minatoya complex since 1993
    MinatoyaTvrOccupancy {
        /// Historical assessments filename (csv format)
        #[arg(short, long, value_name = "FILE")]
        assessments: PathBuf,
        #[command(flatten)]
        out: OutArgs,
    },

    /// Units or complexes that would lose vacation rental use per threshold
    MinatoyaTvrThreshCounts {
        /// Historical assessments filename (csv format)
        #[arg(short, long, value_name = "FILE")]
        assessments: PathBuf,

        /// Count units or complexes
        #[arg(short = 'c', long, value_enum)]
        count_type: CountType,

        #[command(flatten)]
        out: OutArgs,
    },

    /// Yearly vacation rental share of complexes below a threshold
    MinatoyaTvrRates {
        /// Historical assessments filename (csv format)
        #[arg(short, long, value_name = "FILE")]
        assessments: PathBuf,

        /// Keep complexes whose lowest vacation rental share is below this
        #[arg(short, long)]
        thresh: i64,

        #[command(flatten)]
        out: OutArgs,
    },

    /// Median household income by region for census years
    MauiHouseholdIncome {
        #[command(flatten)]
        inputs: IncomeArgs,
        #[command(flatten)]
        out: OutArgs,
    },

    /// Median household income by region for every year, scaled by FRED
    MauiHouseholdIncomeInterpolated {
        #[command(flatten)]
        inputs: IncomeArgs,

        /// FRED median household income for Hawaii (csv format)
        #[arg(short, long, value_name = "FILE")]
        fred_hawaii_income: PathBuf,

        /// FRED median household income for Maui County (csv format)
        #[arg(short = 'g', long, value_name = "FILE")]
        fred_maui_income: PathBuf,

        #[command(flatten)]
        out: OutArgs,
    },

    /// Crowded households by region, with one race group subtracted
    Crowding(CrowdingArgs),

    /// Write a default configuration file
    InitConfig {
        /// Where to write the file
        #[arg(short, long = "out", default_value = "maui-housing.toml")]
        out: PathBuf,
    },
}

/// NHGIS census inputs
#[derive(ClapArgs, Debug, Clone)]
pub struct IncomeArgs {
    /// Tract median household income filename (csv format)
    #[arg(short, long, value_name = "FILE")]
    pub income: PathBuf,

    /// County median household income filename (csv format)
    #[arg(short = 'j', long, alias = "county_income", value_name = "FILE")]
    pub county_income: PathBuf,

    /// Tract population filename (csv format)
    #[arg(short, long, value_name = "FILE")]
    pub population: PathBuf,

    /// CPI filename (csv format)
    #[arg(short, long, value_name = "FILE")]
    pub cpi: PathBuf,
}

/// ACS B25014 and B25014A tables per year
#[derive(ClapArgs, Debug, Clone)]
pub struct CrowdingArgs {
    /// Occupancy filename for 2011 American Community Survey (csv format)
    #[arg(short = 'b', long = "occupancy-2011", value_name = "FILE")]
    pub occupancy_2011: PathBuf,

    /// Occupancy filename for 2015 American Community Survey (csv format)
    #[arg(short = 'c', long = "occupancy-2015", value_name = "FILE")]
    pub occupancy_2015: PathBuf,

    /// Occupancy filename for 2020 American Community Survey (csv format)
    #[arg(short = 'd', long = "occupancy-2020", value_name = "FILE")]
    pub occupancy_2020: PathBuf,

    /// Occupancy filename for 2023 American Community Survey (csv format)
    #[arg(short = 'e', long = "occupancy-2023", value_name = "FILE")]
    pub occupancy_2023: PathBuf,

    /// Race occupancy filename for 2011 American Community Survey (csv format)
    #[arg(short = 'f', long = "occupancy-race-2011", value_name = "FILE")]
    pub occupancy_race_2011: PathBuf,

    /// Race occupancy filename for 2015 American Community Survey (csv format)
    #[arg(short = 'g', long = "occupancy-race-2015", value_name = "FILE")]
    pub occupancy_race_2015: PathBuf,

    /// Race occupancy filename for 2020 American Community Survey (csv format)
    #[arg(short = 'i', long = "occupancy-race-2020", value_name = "FILE")]
    pub occupancy_race_2020: PathBuf,

    /// Race occupancy filename for 2023 American Community Survey (csv format)
    #[arg(short = 'j', long = "occupancy-race-2023", value_name = "FILE")]
    pub occupancy_race_2023: PathBuf,

    #[command(flatten)]
    pub out: OutArgs,
}

impl CrowdingArgs {
    /// (year, tenure table, race table) in report order
    pub fn tables(&self) -> [(i64, &Path, &Path); 4] {
        let [y2011, y2015, y2020, y2023] = ACS_YEARS;
        [
            (y2011, self.occupancy_2011.as_path(), self.occupancy_race_2011.as_path()),
            (y2015, self.occupancy_2015.as_path(), self.occupancy_race_2015.as_path()),
            (y2020, self.occupancy_2020.as_path(), self.occupancy_race_2020.as_path()),
            (y2023, self.occupancy_2023.as_path(), self.occupancy_race_2023.as_path()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_sales_report() {
        let args = Args::try_parse_from([
            "maui-housing",
            "condo-sales",
            "-a",
            "asmt.csv",
            "-d",
            "dwel.csv",
            "-s",
            "sales.csv",
            "-c",
            "cpi.csv",
            "-o",
            "out.csv",
            "--verbose",
        ])
        .unwrap();

        assert_eq!(args.log_level(), tracing::Level::DEBUG);
        match args.command {
            Command::CondoSales { inputs, out } => {
                assert_eq!(inputs.properties.assessments, PathBuf::from("asmt.csv"));
                assert!(inputs.properties.prior_assessments.is_none());
                assert_eq!(out.out, PathBuf::from("out.csv"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_thresh_counts() {
        let args = Args::try_parse_from([
            "maui-housing",
            "minatoya-tvr-thresh-counts",
            "-a",
            "history.csv",
            "-c",
            "complexes",
            "-o",
            "out.csv",
        ])
        .unwrap();

        match args.command {
            Command::MinatoyaTvrThreshCounts { count_type, .. } => {
                assert_eq!(count_type, CountType::Complexes)
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_quiet_keeps_warnings() {
        let args = Args::try_parse_from(["maui-housing", "--quiet", "init-config"]).unwrap();
        assert_eq!(args.log_level(), tracing::Level::WARN, "empty-report warnings still show");

        let args = Args::try_parse_from(["maui-housing", "init-config"]).unwrap();
        assert_eq!(args.log_level(), tracing::Level::INFO);
    }
}
