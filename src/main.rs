use clap::{Args, Parser, Subcommand};
use portfolio_consolidator::cli::{self, ConfigArgs, RunStatus};
use portfolio_consolidator::error::ConsolidationResult;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Consolidate a monthly mutual fund portfolio disclosure into one holdings dataset")]
#[command(long_about = "Portfolio Consolidator - one dataset from a multi-sheet disclosure

Reads a workbook with one sheet per scheme (an \"Index\" sheet is ignored),
keeps every row with an instrument code and a positive quantity, stamps the
fund house and reporting date, classifies each holding, and writes the union.

COMMANDS:
  consolidate - Build the consolidated dataset (CSV, JSON or XLSX)
  inspect     - Show per-sheet row counts and skip reasons
  classify    - Classify one holding from its rating, name or other columns

EXAMPLES:
  portfolio consolidate \"Monthly Portfolio-31 12 25.xlsx\" -o portfolio.csv
  portfolio consolidate portfolio.xlsx --amc \"HDFC Mutual Fund\" --date 2026-01-31 --summary
  portfolio inspect portfolio.xlsx
  portfolio classify --rating \"CRISIL AAA\" --name \"ABC Ltd\"
  portfolio classify -f \"Issuer Rating=CARE AA\" --config rules.yaml

EXIT STATUS:
  0 success, 1 error, 2 no sheet contributed any holdings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigFlags {
    /// YAML configuration file (fund house, date, header offset, rules)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fund house name stamped on every record
    #[arg(long, env = "PORTFOLIO_AMC")]
    amc: Option<String>,

    /// Reporting date (YYYY-MM-DD)
    #[arg(long, env = "PORTFOLIO_DATE")]
    date: Option<String>,

    /// Zero-indexed row holding the column headers
    #[arg(long)]
    header_offset: Option<usize>,
}

impl From<ConfigFlags> for ConfigArgs {
    fn from(flags: ConfigFlags) -> Self {
        ConfigArgs {
            config: flags.config,
            amc: flags.amc,
            date: flags.date,
            header_offset: flags.header_offset,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Consolidate every scheme sheet into one dataset
    Consolidate {
        /// Workbook to read (.xlsx, .xls, .xlsb, .ods)
        input: PathBuf,

        /// Output file; format from extension (.csv, .json, .xlsx). Prints CSV when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print holdings totals, type breakdown and top holdings
        #[arg(short, long)]
        summary: bool,

        /// Show per-sheet diagnostics
        #[arg(short, long)]
        verbose: bool,

        #[command(flatten)]
        config: ConfigFlags,
    },

    /// Show per-sheet diagnostics without writing output
    Inspect {
        /// Workbook to read
        input: PathBuf,

        #[command(flatten)]
        config: ConfigFlags,
    },

    /// Classify one holding from its rating and instrument name
    Classify {
        #[arg(short, long, default_value = "")]
        rating: String,

        #[arg(short, long, default_value = "")]
        name: String,

        /// Any other column as KEY=VALUE (repeatable), e.g. "Issuer Rating=CARE AA"
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        #[command(flatten)]
        config: ConfigFlags,
    },
}

fn main() -> ConsolidationResult<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_consolidator=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let status = match cli.command {
        Commands::Consolidate {
            input,
            output,
            summary,
            verbose,
            config,
        } => cli::consolidate(input, output, &config.into(), summary, verbose)?,

        Commands::Inspect { input, config } => cli::inspect(input, &config.into())?,

        Commands::Classify {
            rating,
            name,
            fields,
            config,
        } => {
            cli::classify(rating, name, fields, &config.into())?;
            RunStatus::Completed
        }
    };

    Ok(match status {
        RunStatus::Completed => ExitCode::SUCCESS,
        RunStatus::Empty => ExitCode::from(2),
    })
}
