//! apiprobe - contract verification harness for HTTP authentication APIs
//!
//! Issues a sequence of dependent HTTP probes (login, authorized listing,
//! token claims) and reports structured pass/fail results.

use apiprobe::{cli, commands::Commands, common};
use clap::Parser;

#[derive(Parser)]
#[command(name = "apiprobe", about = "Contract probes for HTTP authentication APIs")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    common::logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
