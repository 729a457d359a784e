// 🏗️ RPAD Extract Parsers
// Maui County Real Property Tax data is published to the Document Center
// every April as fixed-width text. Each field starts at a fixed column
// (1-based), as documented in the PDF that ships with the data.
// These parsers turn each extract into a plain CSV.

use crate::error::HousingError;
use crate::tax_class::TaxClass;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

// ============================================================================
// CORE TYPES
// ============================================================================

/// ExtractKind - which RPAD file a parser handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractKind {
    Assessments,
    Dwellings,
    Owners,
    Sales,
}

impl ExtractKind {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            ExtractKind::Assessments => "RPT Full Assessment File",
            ExtractKind::Dwellings => "RPT Full Dwellings File",
            ExtractKind::Owners => "RPT Full Owner File",
            ExtractKind::Sales => "RPT Sales File",
        }
    }

    /// Short code for logs and errors
    pub fn code(&self) -> &'static str {
        match self {
            ExtractKind::Assessments => "assessment",
            ExtractKind::Dwellings => "dwelling",
            ExtractKind::Owners => "owner",
            ExtractKind::Sales => "sale",
        }
    }
}

/// ParsedExtract - output of parser.parse(), ready to write as CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedExtract {
    pub kind: ExtractKind,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,

    /// Lines that could not be converted
    pub skipped: usize,
}

impl ParsedExtract {
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// ExtractParser - one implementation per RPAD file layout
pub trait ExtractParser: Send + Sync {
    /// Parse a raw fixed-width file
    fn parse(&self, file_path: &Path) -> Result<ParsedExtract>;

    /// Which extract this parser handles
    fn kind(&self) -> ExtractKind;

    /// Layout version (RPAD has changed layouts between years before)
    fn version(&self) -> &str {
        "2024"
    }
}

// ============================================================================
// FIXED-WIDTH HELPERS
// ============================================================================

/// Cut a line at 1-based start columns. The last field runs to the end of
/// the line; columns past the end read as empty.
pub fn slices(line: &str, starts: &[usize]) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let from = start.saturating_sub(1).min(len);
            let to = starts
                .get(i + 1)
                .map(|next| next.saturating_sub(1))
                .unwrap_or(len)
                .min(len);
            if from >= to {
                String::new()
            } else {
                chars[from..to].iter().collect()
            }
        })
        .collect()
}

/// Trim whitespace and zero padding. An empty result means zero.
pub fn sanitize_value(value: &str) -> String {
    let v = value.trim().trim_start_matches('0');
    if v.is_empty() {
        "0".to_string()
    } else {
        v.to_string()
    }
}

pub fn sanitize(values: &[String]) -> Vec<String> {
    values.iter().map(|v| sanitize_value(v)).collect()
}

/// Owner and sales files are Windows-1252, not UTF-8
pub fn decode_windows_1252(bytes: &[u8]) -> String {
    let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

fn read_lines(file_path: &Path, windows_1252: bool) -> Result<Vec<String>> {
    let bytes = fs::read(file_path)
        .with_context(|| format!("Failed to open file: {}", file_path.display()))?;

    let text = if windows_1252 {
        decode_windows_1252(&bytes)
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    Ok(text.lines().map(|l| l.to_string()).collect())
}

// ============================================================================
// FACTORY FUNCTIONS
// ============================================================================

/// Detect extract kind from the file name RPAD gives its downloads
///
/// # Examples:
/// ```
/// # use maui_housing::parser::{detect_extract, ExtractKind};
/// # use std::path::Path;
/// assert_eq!(detect_extract(Path::new("MAUI_ASMT_2024.txt")).unwrap(), ExtractKind::Assessments);
/// assert_eq!(detect_extract(Path::new("dwellings.txt")).unwrap(), ExtractKind::Dwellings);
/// ```
pub fn detect_extract(file_path: &Path) -> Result<ExtractKind, HousingError> {
    let filename = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let filename_lower = filename.to_lowercase();

    if filename_lower.contains("asmt") || filename_lower.contains("assess") {
        return Ok(ExtractKind::Assessments);
    }

    if filename_lower.contains("dwel") {
        return Ok(ExtractKind::Dwellings);
    }

    if filename_lower.contains("own") {
        return Ok(ExtractKind::Owners);
    }

    if filename_lower.contains("sale") {
        return Ok(ExtractKind::Sales);
    }

    Err(HousingError::UnknownExtract(filename.to_string()))
}

/// Get the parser for an extract kind
pub fn get_parser(kind: ExtractKind) -> Box<dyn ExtractParser> {
    match kind {
        ExtractKind::Assessments => Box::new(AssessmentsParser::new()),
        ExtractKind::Dwellings => Box::new(DwellingsParser::new()),
        ExtractKind::Owners => Box::new(OwnersParser::new()),
        ExtractKind::Sales => Box::new(SalesParser::new()),
    }
}

fn split_layout(layout: &[(&str, usize)]) -> (Vec<String>, Vec<usize>) {
    layout
        .iter()
        .map(|(name, start)| (name.to_string(), *start))
        .unzip()
}

// ============================================================================
// ASSESSMENTS
// ============================================================================

const ASSESSMENT_LAYOUT: [(&str, usize); 8] = [
    ("tmk", 1),
    ("parcel_year", 14),
    ("land_class", 19),
    ("tax_rate_class", 23),
    ("assessed_land_value", 27),
    ("land_exemption", 40),
    ("assessed_building_value", 53),
    ("building_exemption", 66),
];

const TAX_RATE_CLASS_FIELD: usize = 3;

pub struct AssessmentsParser;

impl AssessmentsParser {
    pub fn new() -> Self {
        AssessmentsParser
    }
}

impl Default for AssessmentsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractParser for AssessmentsParser {
    fn parse(&self, file_path: &Path) -> Result<ParsedExtract> {
        let (headers, starts) = split_layout(&ASSESSMENT_LAYOUT);
        let mut rows = Vec::new();
        let mut skipped = 0;

        for (line_num, line) in read_lines(file_path, false)?.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = sanitize(&slices(line, &starts));

            // Replace numeric tax rate class with its description
            match TaxClass::parse_code(&fields[TAX_RATE_CLASS_FIELD]) {
                Ok(class) => fields[TAX_RATE_CLASS_FIELD] = class.label().to_string(),
                Err(e) => {
                    let err = HousingError::MalformedRecord {
                        kind: self.kind().code(),
                        line: line_num + 1,
                        reason: e.to_string(),
                    };
                    warn!("{}", err);
                    skipped += 1;
                    continue;
                }
            }

            rows.push(fields);
        }

        debug!("Parsed {} assessment rows ({} skipped)", rows.len(), skipped);
        Ok(ParsedExtract {
            kind: self.kind(),
            headers,
            rows,
            skipped,
        })
    }

    fn kind(&self) -> ExtractKind {
        ExtractKind::Assessments
    }
}

// ============================================================================
// DWELLINGS
// ============================================================================

const DWELLING_LAYOUT: [(&str, usize); 45] = [
    ("tmk", 1),
    ("parcel_year", 14),
    ("card_number", 19),
    ("story_height", 24),
    ("exterior_wall", 31),
    ("framing", 34),
    ("style_occupancy", 37),
    ("roof_design", 39),
    ("full_baths", 42),
    ("half_baths", 49),
    ("additional_fixtures", 56),
    ("total_fixtures", 63),
    ("air_conditioning", 69),
    ("attic", 70),
    ("total_rooms", 71),
    ("bed_rooms", 76),
    ("family_rooms", 81),
    ("foundation", 86),
    ("basement", 89),
    ("construction", 90),
    ("flooring", 92),
    ("interior_wall_structure", 95),
    ("roof_material", 98),
    ("interior_wall_material", 101),
    ("condo_floor_level", 104),
    ("condo_type", 112),
    ("condo_view", 115),
    ("condo_parking_spaces", 118),
    ("condo_style", 121),
    ("duplex", 124),
    ("year_built", 127),
    ("effective_year_built", 132),
    ("physical_condition", 137),
    ("building_grade", 138),
    ("building_shape_factor", 141),
    ("percent_complete", 144),
    ("ceiling_material", 155),
    ("sf_of_living_area", 158),
    ("sf_of_bldg_foot_print", 165),
    ("addition_living_area_in_sf", 173),
    ("building_value", 181),
    ("built_in_fire_place_linear_feet", 192),
    ("no_prefab_fire_places", 198),
    ("no_wood_burning_fire_places", 200),
    ("cost_and_design_adjustment", 202),
];

pub struct DwellingsParser;

impl DwellingsParser {
    pub fn new() -> Self {
        DwellingsParser
    }
}

impl Default for DwellingsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractParser for DwellingsParser {
    fn parse(&self, file_path: &Path) -> Result<ParsedExtract> {
        let (headers, starts) = split_layout(&DWELLING_LAYOUT);

        let rows: Vec<Vec<String>> = read_lines(file_path, false)?
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| sanitize(&slices(line, &starts)))
            .collect();

        debug!("Parsed {} dwelling rows", rows.len());
        Ok(ParsedExtract {
            kind: self.kind(),
            headers,
            rows,
            skipped: 0,
        })
    }

    fn kind(&self) -> ExtractKind {
        ExtractKind::Dwellings
    }
}

// ============================================================================
// OWNERS
// ============================================================================

const OWNER_LAYOUT: [(&str, usize); 11] = [
    ("tmk", 1),
    ("owner", 14),
    ("owner_type", 54),
    ("co_mailing_address", 94),
    ("mailing_street_address", 215),
    ("mailing_city_state_zip", 295),
    ("mailing_city_name", 387),
    ("mailing_state", 427),
    ("mailing_zip1", 429),
    ("mailing_zip2", 434),
    ("country", 438),
];

pub struct OwnersParser;

impl OwnersParser {
    pub fn new() -> Self {
        OwnersParser
    }
}

impl Default for OwnersParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractParser for OwnersParser {
    fn parse(&self, file_path: &Path) -> Result<ParsedExtract> {
        let (headers, starts) = split_layout(&OWNER_LAYOUT);

        // Commas become | so names and addresses stay in one CSV cell.
        // Replacement is one char for one char, so offsets don't move.
        let rows: Vec<Vec<String>> = read_lines(file_path, true)?
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| sanitize(&slices(&line.replace(',', "|"), &starts)))
            .collect();

        debug!("Parsed {} owner rows", rows.len());
        Ok(ParsedExtract {
            kind: self.kind(),
            headers,
            rows,
            skipped: 0,
        })
    }

    fn kind(&self) -> ExtractKind {
        ExtractKind::Owners
    }
}

// ============================================================================
// SALES
// ============================================================================

const SALES_STARTS: [usize; 15] = [
    1, 19, 30, 41, 52, 73, 114, 155, 196, 205, 214, 255, 296, 337, 340,
];

pub struct SalesParser;

impl SalesParser {
    pub fn new() -> Self {
        SalesParser
    }

    /// Fields in this file end with a stray ","
    fn clean_field(field: &str) -> String {
        let field = field.strip_suffix(',').unwrap_or(field).trim();
        field.replace(',', "|")
    }
}

impl Default for SalesParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractParser for SalesParser {
    fn parse(&self, file_path: &Path) -> Result<ParsedExtract> {
        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        let mut skipped = 0;

        for line in read_lines(file_path, true)? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Unlike the other extracts, this one carries its own header.
            // It is repeated throughout the file, and a report footer
            // ("N rows selected") closes it.
            let is_header = headers.is_none();
            if !is_header && (line.starts_with("PARID") || line.contains("rows select")) {
                skipped += 1;
                continue;
            }

            let source = if is_header { line.to_lowercase() } else { line.to_string() };
            let fields: Vec<String> = sanitize(&slices(&source, &SALES_STARTS))
                .iter()
                .map(|f| Self::clean_field(f))
                .collect();

            if is_header {
                headers = Some(fields);
            } else {
                rows.push(fields);
            }
        }

        let headers = headers.ok_or_else(|| HousingError::MalformedRecord {
            kind: self.kind().code(),
            line: 1,
            reason: "file has no header line".to_string(),
        })?;

        debug!("Parsed {} sale rows", rows.len());
        Ok(ParsedExtract {
            kind: self.kind(),
            headers,
            rows,
            skipped,
        })
    }

    fn kind(&self) -> ExtractKind {
        ExtractKind::Sales
    }
}
