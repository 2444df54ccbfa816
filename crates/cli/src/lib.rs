use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "optlens")]
#[command(about = "OptionLens - options chain analytics and volatility regime tracking")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "optlens.yaml", env = "OPTLENS_CONFIG")]
    pub config: PathBuf,

    /// Override the configured log format
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one analysis pass over an option chain snapshot
    Analyze {
        /// Underlying symbol, e.g. NIFTY
        #[arg(short, long)]
        symbol: String,

        /// Option chain JSON file (records.data[] layout)
        #[arg(long)]
        chain: PathBuf,

        /// Spot price; defaults to records.underlyingValue
        #[arg(long)]
        spot: Option<f64>,

        /// Volatility index level
        #[arg(long)]
        vix: Option<f64>,

        /// Override days to expiry for ATM greeks
        #[arg(long)]
        days: Option<u32>,

        /// Override the risk-free rate
        #[arg(long)]
        rate: Option<f64>,

        /// Also print strategy templates
        #[arg(long)]
        strategies: bool,
    },

    /// Show the persisted volatility history without modifying it
    History,

    /// Validate configuration
    Validate,

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "optlens.yaml")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable multi-line output
    Pretty,

    /// One JSON object per line
    Json,

    /// Single-line output
    Compact,
}

impl LogFormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormatArg::Pretty => "pretty",
            LogFormatArg::Json => "json",
            LogFormatArg::Compact => "compact",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
