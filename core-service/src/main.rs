//! RiskScan CLI
//!
//! Scans one target and prints the result as JSON.
//!
//! Exit codes: 0 success, 2 malformed target, 3 model unavailable, 1 other.

use std::process::ExitCode;

use clap::Parser;
use riskscan_core::{constants, EngineError, RiskEngine};

#[derive(Parser)]
#[command(name = "riskscan", version)]
#[command(about = "Cyber risk score for a domain or IP address", long_about = None)]
struct Cli {
    /// Domain name or IP address
    target: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Print a report document (reuses a recent cached scan)
    #[arg(long)]
    report: bool,
}

fn exit_code(err: &EngineError) -> u8 {
    match err {
        EngineError::MalformedTarget(_) => 2,
        EngineError::ModelUnavailable(_) => 3,
        _ => 1,
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), EngineError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| EngineError::Internal(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

async fn run(cli: &Cli) -> Result<(), EngineError> {
    let engine = RiskEngine::from_env()?;

    if cli.report {
        let document = engine.report(&cli.target).await?;
        print_json(&document, cli.pretty)
    } else {
        let outcome = engine.scan(&cli.target).await?;
        print_json(&outcome, cli.pretty)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("{} v{}", constants::APP_NAME, constants::APP_VERSION);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}
