use crate::config::{parse_reporting_date, EngineConfig};
use crate::core::{Classifier, Consolidator, Diagnostics, HeaderNormalizer, Outcome, SheetStatus};
use crate::error::{ConsolidationError, ConsolidationResult};
use crate::types::{format_number, CellValue, Dataset, InstrumentType};
use crate::writer;
use colored::Colorize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Configuration sources, lowest precedence first: defaults, YAML file, flags
#[derive(Debug, Clone, Default)]
pub struct ConfigArgs {
    pub config: Option<PathBuf>,
    pub amc: Option<String>,
    pub date: Option<String>,
    pub header_offset: Option<usize>,
}

impl ConfigArgs {
    pub fn resolve(&self) -> ConsolidationResult<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_path(path)?,
            None => EngineConfig::default(),
        };
        if let Some(amc) = &self.amc {
            config = config.with_amc_name(amc.clone());
        }
        if let Some(date) = &self.date {
            config = config.with_reporting_date(parse_reporting_date(date)?);
        }
        if let Some(offset) = self.header_offset {
            config = config.with_header_offset(offset);
        }
        config.validate()?;
        Ok(config)
    }
}

/// How a command finished when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// Nothing to show: no sheet contributed holdings
    Empty,
}

/// Column keys the `--rating` and `--name` shortcuts fill for `classify`
const RATING_FIELD: &str = "rating";
const NAME_FIELD: &str = "name_of_the_instrument";

/// Destination for human-facing lines; stderr while stdout carries the dataset
#[derive(Debug, Clone, Copy)]
struct Console {
    stderr: bool,
}

impl Console {
    fn line(self, text: impl fmt::Display) {
        if self.stderr {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }
}

/// Execute the consolidate command
pub fn consolidate(
    input: PathBuf,
    output: Option<PathBuf>,
    config: &ConfigArgs,
    summary: bool,
    verbose: bool,
) -> ConsolidationResult<RunStatus> {
    let csv_to_stdout = output.is_none() && !summary;
    let console = Console {
        stderr: csv_to_stdout,
    };

    console.line("📊 Portfolio Consolidation".bold().green());
    console.line(format!("   Input: {}", input.display()));
    if let Some(ref out) = output {
        console.line(format!("   Output: {}", out.display()));
    }
    console.line("");

    let config = config.resolve()?;
    if verbose {
        console.line(format!(
            "   AMC: {}  Date: {}  Header row: {}\n",
            config.amc_name.bright_blue(),
            config.reporting_date,
            config.header_offset + 1
        ));
    }

    let bytes = fs::read(&input)?;
    let consolidator = Consolidator::new(config)?;
    let outcome = consolidator.consolidate_bytes(&bytes)?;

    if verbose {
        print_diagnostics(console, outcome.diagnostics());
    }

    let dataset = match &outcome {
        Outcome::Consolidated { dataset, .. } => dataset,
        Outcome::Empty { diagnostics } => {
            print_empty(console, diagnostics);
            return Ok(RunStatus::Empty);
        }
    };

    console.line(format!(
        "{} {} holdings from {} schemes",
        "✅ Consolidated".bold().green(),
        dataset.len().to_string().bold(),
        outcome.diagnostics().contributing_sheets()
    ));

    if summary {
        print_summary(dataset);
    }

    match output {
        Some(path) => {
            let format = writer::write_dataset(dataset, &path)?;
            console.line(format!("   Wrote {:?}: {}\n", format, path.display()));
        }
        None if csv_to_stdout => writer::write_csv(dataset, io::stdout().lock())?,
        None => {}
    }

    Ok(RunStatus::Completed)
}

/// Execute the inspect command: per-sheet diagnostics without export
pub fn inspect(input: PathBuf, config: &ConfigArgs) -> ConsolidationResult<RunStatus> {
    let console = Console { stderr: false };
    console.line("🔍 Portfolio Inspection".bold().green());
    console.line(format!("   File: {}\n", input.display()));

    let bytes = fs::read(&input)?;
    let consolidator = Consolidator::new(config.resolve()?)?;
    let outcome = consolidator.consolidate_bytes(&bytes)?;
    print_diagnostics(console, outcome.diagnostics());

    if outcome.is_empty_result() {
        print_empty(console, outcome.diagnostics());
        return Ok(RunStatus::Empty);
    }
    Ok(RunStatus::Completed)
}

/// Execute the classify command for one holding
///
/// `fields` are `KEY=VALUE` pairs; keys go through header normalization so
/// `"Issuer Rating=CARE AA"` reaches a rule on `issuer_rating`.
pub fn classify(
    rating: String,
    name: String,
    fields: Vec<String>,
    config: &ConfigArgs,
) -> ConsolidationResult<InstrumentType> {
    let consolidator = Consolidator::new(config.resolve()?)?;
    let classifier = Classifier::new(&consolidator.config().classification);
    let headers = HeaderNormalizer::new()?;

    let mut row: HashMap<String, CellValue> = HashMap::new();
    row.insert(RATING_FIELD.to_string(), CellValue::Text(rating));
    row.insert(NAME_FIELD.to_string(), CellValue::Text(name));
    for pair in &fields {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            ConsolidationError::Config(format!("Expected KEY=VALUE, got '{}'", pair))
        })?;
        row.insert(headers.normalize(key), CellValue::text(value.trim()));
    }

    let category = classifier.classify(|field| row.get(field));
    println!("{}", category.to_string().bold());
    Ok(category)
}

fn print_diagnostics(console: Console, diagnostics: &Diagnostics) {
    console.line("📋 Sheets:".cyan());
    for sheet in &diagnostics.sheets {
        let status = match sheet.status {
            SheetStatus::Consolidated => "consolidated".green(),
            SheetStatus::MissingQuantity => "no quantity column".yellow(),
            SheetStatus::NoQualifyingRows => "no qualifying rows".yellow(),
        };
        console.line(format!(
            "   {} - {} of {} rows kept ({})",
            sheet.name.bright_blue(),
            sheet.kept_rows,
            sheet.raw_rows,
            status
        ));
    }
    console.line(format!(
        "   Index sheets skipped: {}, sheets skipped: {}, rows filtered: {}, unparsable numbers: {}\n",
        diagnostics.index_sheets_skipped,
        diagnostics.sheets_skipped,
        diagnostics.rows_filtered,
        diagnostics.coercion_failures
    ));
}

fn print_empty(console: Console, diagnostics: &Diagnostics) {
    console.line(
        "⚠️  No holdings found: every sheet was skipped or had no qualifying rows".yellow(),
    );
    console.line(format!(
        "   Sheets read: {}, without quantity column: {}, rows filtered: {}\n",
        diagnostics.sheets.len(),
        diagnostics.sheets_skipped,
        diagnostics.rows_filtered
    ));
}

fn print_summary(dataset: &Dataset) {
    println!("\n{}", "📈 Summary".bold());
    println!("   Total holdings: {}", dataset.len());

    println!("\n   {}", "By instrument type:".cyan());
    for (category, count) in dataset.type_breakdown() {
        println!("      {:<12} {}", category.to_string(), count);
    }

    println!("\n   {}", "By scheme:".cyan());
    let values = dataset.market_value_by_scheme();
    for (scheme, count) in dataset.by_scheme() {
        let value = values.get(&scheme).copied().unwrap_or(0.0);
        println!("      {:<40} {:>6}  {:>14.2}", scheme, count, value);
    }

    let top = dataset.top_by_market_value(10);
    if !top.is_empty() {
        println!("\n   {}", "Top 10 holdings by market value:".cyan());
        for record in top {
            println!(
                "      {:<16} {:>14}  {}",
                record.instrument_code,
                record.market_fair_value.map(format_number).unwrap_or_default(),
                record.scheme_name
            );
        }
    }
    println!();
}
