//! Command dispatch
//!
//! Turns parsed CLI commands into probe runs. Presentation lives here:
//! the runner hands back data and this layer decides how to print it.

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use serde_json::Value;

use crate::commands::Commands;
use crate::common::{Config, Result};
use crate::probe::ProbeRunner;
use crate::suite::{builtin_suite, ProbeSuite};
use crate::token;

/// Dispatch a parsed command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            suite,
            base_url,
            username,
            password,
            timeout_ms,
            steps,
            json,
            config,
        } => {
            run(RunArgs {
                suite,
                base_url,
                username,
                password,
                timeout_ms,
                steps,
                json,
                config,
            })
            .await
        }
        Commands::Decode { token } => decode(&token),
    }
}

struct RunArgs {
    suite: Option<PathBuf>,
    base_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout_ms: Option<u64>,
    steps: Vec<String>,
    json: bool,
    config: Option<PathBuf>,
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // CLI flags win over config file values
    if let Some(base_url) = args.base_url {
        config.target.base_url = base_url;
    }
    if let Some(username) = args.username {
        config.credentials.username = username;
    }
    if let Some(password) = args.password {
        config.credentials.password = password;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeouts.step_ms = timeout_ms;
    }

    let suite = match &args.suite {
        Some(path) => ProbeSuite::from_file(path)?,
        None => builtin_suite(&config),
    };

    let selection = if !args.steps.is_empty() {
        args.steps.clone()
    } else {
        config.steps.clone()
    };
    let suite = if selection.is_empty() {
        suite
    } else {
        suite.select(&selection)?
    };

    if !args.json {
        println!(
            "\n{} {}",
            "Running Suite:".blue().bold(),
            suite.name.white().bold()
        );
        if let Some(desc) = &suite.description {
            println!("  {}", desc.dimmed());
        }
        println!(
            "  {} {}\n",
            "Target:".cyan(),
            config.target.base_url.dimmed()
        );
    }

    let runner = ProbeRunner::new(
        config.target.base_url.clone(),
        Duration::from_millis(config.timeouts.step_ms),
    );
    let report = runner.run(&suite.steps).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    if !report.passed {
        // Report already printed; nonzero exit for CI consumers
        std::process::exit(1);
    }
    Ok(())
}

fn decode(token: &str) -> Result<()> {
    let claims = token::decode(token)?;
    println!("{}", serde_json::to_string_pretty(&Value::Object(claims))?);
    Ok(())
}
