//! CLI command definitions
//!
//! Defines the clap commands for the probe harness.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a probe suite against the target service
    Run {
        /// Path to a YAML suite; runs the built-in suite when omitted
        suite: Option<PathBuf>,

        /// Endpoint root, e.g. http://localhost:8080
        #[arg(long)]
        base_url: Option<String>,

        /// Username for the login probe
        #[arg(long, short = 'u')]
        username: Option<String>,

        /// Password for the login probe
        #[arg(long, short = 'p')]
        password: Option<String>,

        /// Per-step timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Run only the named steps; can be repeated: --step login --step jwt-roles
        #[arg(long = "step")]
        steps: Vec<String>,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Path to a config file (default: platform config dir)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Decode a token payload and print its claims
    Decode {
        /// The compact dot-separated token
        token: String,
    },
}
