use clap::{Parser, Subcommand};
use domain::analytics::MAX_WINDOW_DAYS;
use infrastructure::FrontDeskConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Play area front desk", long_about = None)]
pub struct Args {
    /// Path to config directory
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Override the database URL
    #[arg(long)]
    pub database_url: Option<String>,

    /// Override the auto-refresh period in seconds
    #[arg(long)]
    pub refresh_interval: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Keep the session list in sync until Ctrl-C
    Serve,
    /// Handle one bracelet scan
    Scan { code: String },
    /// Register a bracelet for a new visit
    Register {
        #[arg(long)]
        code: String,
        #[arg(long)]
        parent_name: String,
        #[arg(long)]
        parent_phone: String,
        /// Tariff plan id or name
        #[arg(long)]
        tariff: String,
        #[arg(long)]
        child_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// End an active session
    End { session_id: String },
    /// List active sessions, optionally filtered
    Sessions {
        #[arg(long)]
        query: Option<String>,
    },
    /// Price a session with extra products
    Quote {
        session_id: String,
        /// Product id, repeat for more than one
        #[arg(long = "product")]
        products: Vec<String>,
    },
    /// List tariff plans
    Tariffs,
    /// Print an analytics report as JSON
    Report {
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_WINDOW_DAYS))
        )]
        days: u32,
    },
}

impl Args {
    /// CLI flags win over every config source
    pub fn apply_overrides(&self, config: &mut FrontDeskConfig) {
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        if let Some(secs) = self.refresh_interval {
            config.refresh_interval_secs = secs;
        }
    }
}
