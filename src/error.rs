// ⚠️ Domain errors
// Everything else flows through anyhow with file context attached.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HousingError {
    /// The CPI table has no row for the inflation base year
    #[error("CPI data has no entry for base year {0}")]
    MissingBaseCpi(i64),

    /// Tax rate class code outside 0..=12
    #[error("unknown tax rate class code: {0}")]
    UnknownTaxClass(String),

    /// A fixed-width record that can't be converted
    #[error("malformed {kind} record at line {line}: {reason}")]
    MalformedRecord {
        kind: &'static str,
        line: usize,
        reason: String,
    },

    /// Filename doesn't look like any RPAD extract
    #[error("could not detect RPAD extract type from filename: {0}")]
    UnknownExtract(String),
}
