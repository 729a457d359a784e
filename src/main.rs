//! maui-housing - Maui County housing reports
//!
//! Converts RPAD extracts to CSV and builds region-level reports from them
//! and from census data.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing input, bad config, missing base-year CPI, etc.)

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Command, CrowdingArgs, IncomeArgs, ParseArgs, PropertyArgs, SalesArgs};
use maui_housing::condos::condo_characteristics;
use maui_housing::config::ReportConfig;
use maui_housing::construction::{home_construction_by_decade, new_home_usage};
use maui_housing::cpi::CpiTable;
use maui_housing::crowding::{crowding_report, AcsTables};
use maui_housing::income::{
    combine_fred, household_income, household_income_interpolated, load_fred, CensusIncome, NhgisFiles,
};
use maui_housing::output::{write_report, write_table, Provenance};
use maui_housing::parser::{detect_extract, get_parser, ExtractKind};
use maui_housing::rpad::{join_sales, load_properties, load_sales, HomeType, Property, PropertySale};
use maui_housing::sales::{affordable_sales, property_sales, IncomeTable};
use maui_housing::source_location;
use maui_housing::tvr::{complex_tvr_occupancy, load_minatoya_history, tvr_rates, tvr_thresh_counts};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse();

    // Handle init-config early (no logging needed)
    if let Command::InitConfig { out } = &args.command {
        return handle_init_config(out);
    }

    init_logging(&args);

    info!("maui-housing v{}", maui_housing::VERSION);
    debug!("Arguments: {:?}", args);

    let config = ReportConfig::load_or_default(args.config.as_deref())?;

    if let Err(e) = run(args.command, &config) {
        error!("Report failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Write a default maui-housing.toml
fn handle_init_config(out: &Path) -> Result<()> {
    if out.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", out.display());
        std::process::exit(1);
    }

    let content = ReportConfig::default_toml()?;
    std::fs::write(out, content).with_context(|| format!("Failed to write {}", out.display()))?;

    println!("✅ Created {} with default settings.", out.display());
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn run(command: Command, config: &ReportConfig) -> Result<()> {
    match command {
        Command::ParseAssessments(args) => run_parse(&args, Some(ExtractKind::Assessments)),
        Command::ParseDwellings(args) => run_parse(&args, Some(ExtractKind::Dwellings)),
        Command::ParseOwners(args) => run_parse(&args, Some(ExtractKind::Owners)),
        Command::ParseSales(args) => run_parse(&args, Some(ExtractKind::Sales)),
        Command::ParseExtract(args) => run_parse(&args, None),
        Command::SingleFamilyHomeSales { inputs, out } => {
            run_property_sales(&inputs, &out.out, HomeType::SingleFamilyHome, config)
        }
        Command::CondoSales { inputs, out } => run_property_sales(&inputs, &out.out, HomeType::Condo, config),
        Command::AffordableSales { inputs, income, out } => run_affordable_sales(&inputs, &income, &out.out, config),
        Command::HomeConstructionByDecade { inputs, out } => run_construction(&inputs, &out.out, config),
        Command::NewHomeUsage { inputs, out } => run_new_home_usage(&inputs, &out.out, config),
        Command::CondoCharacteristics { inputs, out } => run_condo_characteristics(&inputs, &out.out, config),
        Command::MinatoyaTvrOccupancy { assessments, out } => run_tvr_occupancy(&assessments, &out.out, config),
        Command::MinatoyaTvrThreshCounts {
            assessments,
            count_type,
            out,
        } => {
            let units = load_minatoya_history(&assessments, config.history)?;
            let table = tvr_thresh_counts(&complex_tvr_occupancy(&units), count_type);
            println!("🏨 Counting {} per TVR threshold", count_type.label());
            write_table(&out.out, &table.headers, &table.rows)?;
            Provenance::new(source_location!()).input(&assessments).write(&out.out)?;
            println!("✅ Wrote {} rows to {}", table.rows.len(), out.out.display());
            Ok(())
        }
        Command::MinatoyaTvrRates {
            assessments,
            thresh,
            out,
        } => run_tvr_rates(&assessments, thresh, &out.out, config),
        Command::MauiHouseholdIncome { inputs, out } => run_household_income(&inputs, &out.out, config),
        Command::MauiHouseholdIncomeInterpolated {
            inputs,
            fred_hawaii_income,
            fred_maui_income,
            out,
        } => run_household_income_interpolated(&inputs, &fred_hawaii_income, &fred_maui_income, &out.out, config),
        Command::Crowding(args) => run_crowding(&args),
        Command::InitConfig { out } => handle_init_config(&out),
    }
}

// ============================================================================
// FIXED-WIDTH CONVERSION
// ============================================================================

fn run_parse(args: &ParseArgs, kind: Option<ExtractKind>) -> Result<()> {
    let kind = match kind {
        Some(kind) => kind,
        None => detect_extract(&args.file)?,
    };
    let parser = get_parser(kind);
    info!("Parsing {} ({} layout {})", args.file.display(), kind.name(), parser.version());

    let parsed = parser.parse(&args.file)?;

    match &args.out {
        Some(out) => {
            let file = File::create(out).with_context(|| format!("Failed to create output file: {}", out.display()))?;
            parsed.write_csv(BufWriter::new(file))?;
            Provenance::new(source_location!()).input(&args.file).write(out)?;
            println!("✅ Wrote {} {} rows to {}", parsed.rows.len(), kind.code(), out.display());
        }
        None => parsed.write_csv(std::io::stdout().lock())?,
    }

    if parsed.skipped > 0 {
        info!("Skipped {} malformed {} records", parsed.skipped, kind.code());
    }
    Ok(())
}

// ============================================================================
// PROPERTY REPORTS
// ============================================================================

fn property_provenance(inputs: &PropertyArgs, provenance: Provenance) -> Provenance {
    provenance
        .input(&inputs.assessments)
        .optional_input(inputs.prior_assessments.as_deref())
        .input(&inputs.dwellings)
}

fn load_property_inputs(inputs: &PropertyArgs, config: &ReportConfig) -> Result<Vec<Property>> {
    println!("📂 Loading assessments and dwellings...");
    let properties = load_properties(inputs.files(), &config.dwellings)?;
    println!("✓ {} developed residential properties", properties.len());
    Ok(properties)
}

fn load_property_sales(inputs: &SalesArgs, cpi: &CpiTable, config: &ReportConfig) -> Result<Vec<PropertySale>> {
    let inflation = cpi.inflation(config.inflation_base_year)?;
    let properties = load_property_inputs(&inputs.properties, config)?;

    println!("📂 Loading sales...");
    let sales = load_sales(&inputs.sales, &config.sales)?;
    let joined = join_sales(&properties, sales, &inflation);
    println!("✓ {} sales of residential properties", joined.len());
    Ok(joined)
}

fn run_property_sales(inputs: &SalesArgs, out: &Path, home_type: HomeType, config: &ReportConfig) -> Result<()> {
    let cpi = CpiTable::load(&inputs.cpi)?;
    let sales = load_property_sales(inputs, &cpi, config)?;

    let rows = property_sales(&sales, home_type);
    let provenance = property_provenance(&inputs.properties, Provenance::new(source_location!()))
        .input(&inputs.sales)
        .input(&inputs.cpi);
    write_report(out, &rows, &provenance)?;
    println!("✅ Wrote {} {} sales rows to {}", rows.len(), home_type.label(), out.display());
    Ok(())
}

fn run_affordable_sales(inputs: &SalesArgs, income: &Path, out: &Path, config: &ReportConfig) -> Result<()> {
    let cpi = CpiTable::load(&inputs.cpi)?;
    let sales = load_property_sales(inputs, &cpi, config)?;
    let income_table = IncomeTable::load(income)?;

    let rows = affordable_sales(&sales, &income_table, config.affordability.price_to_income_ratio);
    let provenance = property_provenance(&inputs.properties, Provenance::new(source_location!()))
        .input(&inputs.sales)
        .input(&inputs.cpi)
        .input(income);
    write_report(out, &rows, &provenance)?;
    println!("✅ Wrote {} affordable sales rows to {}", rows.len(), out.display());
    Ok(())
}

fn run_construction(inputs: &PropertyArgs, out: &Path, config: &ReportConfig) -> Result<()> {
    let properties = load_property_inputs(inputs, config)?;

    let rows = home_construction_by_decade(&properties, config.construction);
    write_report(out, &rows, &property_provenance(inputs, Provenance::new(source_location!())))?;
    println!("✅ Wrote {} construction rows to {}", rows.len(), out.display());
    Ok(())
}

fn run_new_home_usage(inputs: &PropertyArgs, out: &Path, config: &ReportConfig) -> Result<()> {
    let properties = load_property_inputs(inputs, config)?;

    let rows = new_home_usage(&properties, config.new_homes);
    write_report(out, &rows, &property_provenance(inputs, Provenance::new(source_location!())))?;
    println!("✅ Wrote {} new home usage rows to {}", rows.len(), out.display());
    Ok(())
}

fn run_condo_characteristics(inputs: &PropertyArgs, out: &Path, config: &ReportConfig) -> Result<()> {
    let properties = load_property_inputs(inputs, config)?;

    let rows = condo_characteristics(&properties);
    write_report(out, &rows, &property_provenance(inputs, Provenance::new(source_location!())))?;
    println!("✅ Wrote {} condo rows to {}", rows.len(), out.display());
    Ok(())
}

// ============================================================================
// MINATOYA VACATION RENTALS
// ============================================================================

fn run_tvr_occupancy(assessments: &Path, out: &Path, config: &ReportConfig) -> Result<()> {
    println!("📂 Loading historical assessments...");
    let units = load_minatoya_history(assessments, config.history)?;

    let rows = complex_tvr_occupancy(&units);
    write_report(out, &rows, &Provenance::new(source_location!()).input(assessments))?;
    println!("✅ Wrote {} complexes to {}", rows.len(), out.display());
    Ok(())
}

fn run_tvr_rates(assessments: &Path, thresh: i64, out: &Path, config: &ReportConfig) -> Result<()> {
    println!("📂 Loading historical assessments...");
    let units = load_minatoya_history(assessments, config.history)?;
    let complexes = complex_tvr_occupancy(&units);

    let rows = tvr_rates(&units, &complexes, thresh);
    write_report(out, &rows, &Provenance::new(source_location!()).input(assessments))?;
    println!("✅ Wrote {} TVR rate rows to {}", rows.len(), out.display());
    Ok(())
}

// ============================================================================
// CENSUS REPORTS
// ============================================================================

fn nhgis_files(inputs: &IncomeArgs) -> NhgisFiles<'_> {
    NhgisFiles {
        income: &inputs.income,
        county_income: &inputs.county_income,
        population: &inputs.population,
    }
}

fn income_provenance(inputs: &IncomeArgs, provenance: Provenance) -> Provenance {
    provenance
        .input(&inputs.income)
        .input(&inputs.county_income)
        .input(&inputs.population)
        .input(&inputs.cpi)
}

fn run_household_income(inputs: &IncomeArgs, out: &Path, config: &ReportConfig) -> Result<()> {
    let cpi = CpiTable::load(&inputs.cpi)?;
    let inflation = cpi.inflation(config.income_inflation_base_year)?;
    let census = CensusIncome::load(nhgis_files(inputs))?;

    let rows = household_income(&census, &inflation, config.income.lanai_first_year);
    write_report(out, &rows, &income_provenance(inputs, Provenance::new(source_location!())))?;
    println!("✅ Wrote {} household income rows to {}", rows.len(), out.display());
    Ok(())
}

fn run_household_income_interpolated(
    inputs: &IncomeArgs,
    fred_hawaii: &Path,
    fred_maui: &Path,
    out: &Path,
    config: &ReportConfig,
) -> Result<()> {
    let cpi = CpiTable::load(&inputs.cpi)?;
    let inflation = cpi.inflation(config.interpolated_income_inflation_base_year)?;
    let census = CensusIncome::load(nhgis_files(inputs))?;
    let fred = combine_fred(
        &load_fred(fred_hawaii)?,
        &load_fred(fred_maui)?,
        config.income.fred_switch_year,
    );

    let rows = household_income_interpolated(&census, &fred, &inflation, config.income.lanai_first_year);
    let provenance = income_provenance(inputs, Provenance::new(source_location!()))
        .input(fred_hawaii)
        .input(fred_maui);
    write_report(out, &rows, &provenance)?;
    println!("✅ Wrote {} household income rows to {}", rows.len(), out.display());
    Ok(())
}

fn run_crowding(args: &CrowdingArgs) -> Result<()> {
    let tables: Vec<AcsTables<'_>> = args
        .tables()
        .into_iter()
        .map(|(year, occupancy, occupancy_race)| AcsTables {
            year,
            occupancy,
            occupancy_race,
        })
        .collect();

    let rows = crowding_report(&tables)?;
    let provenance = tables.iter().fold(Provenance::new(source_location!()), |p, t| {
        p.input(t.occupancy).input(t.occupancy_race)
    });
    write_report(&args.out.out, &rows, &provenance)?;
    println!("✅ Wrote {} crowding rows to {}", rows.len(), args.out.out.display());
    Ok(())
}
