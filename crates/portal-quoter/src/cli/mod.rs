//! Command-line interface of the `portal-quoter` binary.

pub mod commands;
pub mod output;

use crate::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
use crate::ops::Series;
use clap::{Args, Parser, Subcommand};
use portal_extract::Keyword;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "portal-quoter", version)]
#[command(about = "Read and drive the back-office portal from the command line")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Login email address.
    #[arg(long, env = "PORTAL_EMAIL", global = true)]
    pub email: Option<String>,
    /// Login password.
    #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
    /// Portal origin.
    #[arg(long, env = "PORTAL_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS, global = true)]
    pub timeout_ms: u64,
    /// Override the User-Agent header.
    #[arg(long, global = true)]
    pub user_agent: Option<String>,
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
    /// Print the session diagnostics to stderr when done.
    #[arg(long, global = true)]
    pub diagnostics: bool,
    /// Suppress status lines.
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract script declarations from a saved HTML page (no login).
    ///
    /// Without markers, reads the page's leading `let` block.
    Extract {
        file: PathBuf,
        /// Substring the target script must contain; repeatable.
        #[arg(long = "marker")]
        markers: Vec<String>,
        #[arg(long, default_value = "var")]
        keyword: Keyword,
    },
    /// Filter a local model catalog file and sum columns (no login).
    Catalog {
        file: PathBuf,
        /// Wildcard pattern to include; repeatable.
        #[arg(long = "include")]
        include: Vec<String>,
        /// Wildcard pattern to exclude; repeatable.
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        /// Model field the patterns match against.
        #[arg(long)]
        field: Option<String>,
        /// Numeric field to total over the matches; repeatable.
        #[arg(long = "sum")]
        sums: Vec<String>,
    },
    /// List back-office users.
    Users,
    /// List all companies.
    Companies {
        #[arg(long)]
        reload: bool,
    },
    /// Show a company's page data.
    Company { id: String },
    /// Show a quote's page data.
    Quote { company: String, quote: String },
    /// Create a quote and add the lines listed in a JSON file.
    ///
    /// The file is an array of `{"modelId", "pricePerUnit",
    /// "desiredQuantity", "minimumQuantity"}` entries.
    NewQuote {
        company: String,
        #[arg(long)]
        title: String,
        /// Expiry date (YYYY-MM-DD).
        #[arg(long)]
        expiry: String,
        /// Customer contact id.
        #[arg(long)]
        contact: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Mark the quote as a special price request.
        #[arg(long)]
        spr: bool,
        #[arg(long)]
        lines: PathBuf,
        /// Reject model ids missing from this catalog before creating anything.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Show an order's display fields.
    Order { id: String },
    /// List orders between two dates (YYYY-MM-DD).
    Orders { start: String, end: String },
    /// Fetch model lists for product series.
    Models {
        /// Series as `slug=Series Name`; repeatable.
        #[arg(long = "series", required = true)]
        series: Vec<Series>,
    },
}
