// Maui Housing - Core Library
// Exposes all modules for use in the CLI and tests

pub mod error;
pub mod output;
pub mod config;
pub mod table;
pub mod stats;
pub mod cpi;

// Static lookups
pub mod tax_class;
pub mod regions;
pub mod tmk;
pub mod minatoya;

// RPAD extracts and the relations built from them
pub mod parser;
pub mod rpad;

// Reports
pub mod sales;
pub mod construction;
pub mod condos;
pub mod tvr;
pub mod income;
pub mod crowding;

// Re-export commonly used types
pub use error::HousingError;
pub use config::{ReportConfig, YearRange};
pub use cpi::{CpiTable, Inflation};
pub use output::{write_report, Provenance, SourceLocation};
pub use parser::{
    ExtractParser, ExtractKind, ParsedExtract,
    detect_extract, get_parser,
    AssessmentsParser, DwellingsParser, OwnersParser, SalesParser,
};
pub use regions::{Region, COUNTY_LABEL};
pub use rpad::{HomeType, Property, PropertySale};
pub use tax_class::TaxClass;
pub use tmk::Tmk;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
