use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use sales_insight::cli;
use sales_insight::cli::commands::Options;
use sales_insight::error::InsightResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "insight")]
#[command(about = "Anomaly detection and column profiling for sales data.")]
#[command(long_about = "Sales Insight - outlier detection and column profiling for tabular sales data
CSV | Excel (.xlsx/.xls/.ods) | YAML

COMMANDS:
  analyze    - Full pass: roles, statistics, anomalies, breakdown, trends
  classify   - Split columns into numeric, date and categorical roles
  anomalies  - Flag outliers with Z-Score or IQR
  aggregate  - Top categories by sum of a numeric column
  trends     - Region and overall revenue metrics
  describe   - Summary statistics of numeric columns
  correlate  - Pearson correlation matrix
  prompt     - Print the prompt for the narrative generator

EXAMPLES:
  insight analyze sales.csv                        # Everything at once
  insight anomalies sales.csv --method iqr         # IQR over every numeric column
  insight anomalies sales.csv -c revenue -t 3.0    # One column, Z-Score 3.0
  insight aggregate sales.csv --by region --value revenue
  insight classify sales.xlsx --json               # Machine-readable output

LOGGING:
  Set RUST_LOG (e.g. RUST_LOG=sales_insight=debug) or pass --verbose.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags accepted by every command
#[derive(Args, Clone)]
struct CommonArgs {
    /// Path to data file (.csv, .xlsx, .xls, .ods, .yaml)
    file: PathBuf,

    /// YAML configuration file (thresholds, column names, top-N)
    #[arg(long, env = "INSIGHT_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Show verbose steps and debug logs
    #[arg(short, long)]
    verbose: bool,
}

impl CommonArgs {
    fn split(self) -> (PathBuf, Options) {
        (
            self.file,
            Options {
                config: self.config,
                json: self.json,
                verbose: self.verbose,
            },
        )
    }
}

/// Anomaly method selection
#[derive(Args, Clone)]
struct DetectionArgs {
    /// Detection method: zscore or iqr (default: zscore)
    #[arg(short, long)]
    method: Option<String>,

    /// Z-Score threshold [1.5, 4.0] or IQR multiplier [1.0, 3.0]
    #[arg(short, long)]
    threshold: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Run every analysis over a table in one pass.

Classifies columns once, then computes summary statistics, anomalies for
every numeric column, a breakdown of the first numeric column by the first
categorical column, correlations and trends.

EXAMPLES:
  insight analyze sales.csv
  insight analyze sales.csv --method iqr --threshold 2.0 --json")]
    /// Run every analysis in one pass
    Analyze {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        detection: DetectionArgs,
    },

    #[command(long_about = "Classify columns into roles.

ROLES:
  numeric      - float or integer storage
  date         - named date/datetime/timestamp/invoicedate/orderdate/time
                 (any case) and every value parses as a date
  categorical  - 2 to 49 distinct values
  unclassified - everything else

Use --verbose to see storage type and distinct count per column.")]
    /// Classify columns into numeric, date and categorical roles
    Classify {
        #[command(flatten)]
        common: CommonArgs,
    },

    #[command(long_about = "Flag outliers in numeric columns.

METHODS:
  zscore - flag |x - mean| / stddev > threshold (default 2.5, range 1.5-4.0)
  iqr    - flag values outside [Q1 - m*IQR, Q3 + m*IQR]
           (default 1.5, range 1.0-3.0)

Missing values are never flagged. A column with no spread yields no
anomalies. Without --column every numeric column is scanned.

EXAMPLES:
  insight anomalies sales.csv
  insight anomalies sales.csv --column revenue --method iqr")]
    /// Flag outliers with Z-Score or IQR
    Anomalies {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Only this column (prints flagged rows and fences)
        #[arg(short, long)]
        column: Option<String>,
    },

    #[command(long_about = "Aggregate a numeric column by a categorical column.

Each group reports sum, mean and row count. Groups are sorted by sum,
highest first, and cut to the top N (default 15).

Defaults to the first categorical and first numeric column.")]
    /// Top categories by sum of a numeric column
    Aggregate {
        #[command(flatten)]
        common: CommonArgs,

        /// Category column to group by
        #[arg(long)]
        by: Option<String>,

        /// Numeric column to reduce
        #[arg(long)]
        value: Option<String>,

        /// Number of groups to keep
        #[arg(long)]
        top: Option<usize>,
    },

    /// Region and overall revenue metrics
    Trends {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Summary statistics of numeric columns
    Describe {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Pearson correlation matrix of numeric columns
    Correlate {
        #[command(flatten)]
        common: CommonArgs,
    },

    #[command(long_about = "Print the prompt sent to the narrative generator.

The prompt holds a dataset overview, key statistics, the anomaly summary,
trends and the most recent rows. A warning is shown when the API key
environment variable (default GEMINI_API_KEY) is not set.")]
    /// Print the narrative generator prompt
    Prompt {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        detection: DetectionArgs,
    },
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Analyze { common, .. }
            | Commands::Classify { common }
            | Commands::Anomalies { common, .. }
            | Commands::Aggregate { common, .. }
            | Commands::Trends { common }
            | Commands::Describe { common }
            | Commands::Correlate { common }
            | Commands::Prompt { common, .. } => common.verbose,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sales_insight=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "sales_insight=warn".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.command.verbose());

    if let Err(e) = run(cli.command) {
        eprintln!("{} {}", "❌ Error:".bold().red(), e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> InsightResult<()> {
    match command {
        Commands::Analyze { common, detection } => {
            let (file, opts) = common.split();
            cli::analyze(file, detection.method, detection.threshold, opts)
        }

        Commands::Classify { common } => {
            let (file, opts) = common.split();
            cli::classify(file, opts)
        }

        Commands::Anomalies {
            common,
            detection,
            column,
        } => {
            let (file, opts) = common.split();
            cli::anomalies(file, column, detection.method, detection.threshold, opts)
        }

        Commands::Aggregate {
            common,
            by,
            value,
            top,
        } => {
            let (file, opts) = common.split();
            cli::aggregate(file, by, value, top, opts)
        }

        Commands::Trends { common } => {
            let (file, opts) = common.split();
            cli::trends(file, opts)
        }

        Commands::Describe { common } => {
            let (file, opts) = common.split();
            cli::describe(file, opts)
        }

        Commands::Correlate { common } => {
            let (file, opts) = common.split();
            cli::correlate(file, opts)
        }

        Commands::Prompt { common, detection } => {
            let (file, opts) = common.split();
            cli::prompt(file, detection.method, detection.threshold, opts)
        }
    }
}
