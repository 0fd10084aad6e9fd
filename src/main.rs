//! Point Ledger CLI
//!
//! Applies a CSV batch of charge/use commands and prints the resulting
//! balances (or the full transaction history) as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > balances.csv
//! cargo run -- commands.csv --history > history.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `POINT_LEDGER_LOCK_TIMEOUT_MS`: Optional per-user lock wait limit

use point_ledger::{LedgerConfig, LedgerEngine, LedgerError, LedgerService, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;
use std::sync::Arc;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let show_history = args.iter().any(|a| a == "--history");
    let input_path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .ok_or(LedgerError::MissingArgument)?;

    let config = LedgerConfig::from_env()?;
    let service = Arc::new(LedgerService::in_memory().with_config(config));

    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let mut engine = LedgerEngine::with_service(service);
    engine.process_csv(reader)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    if show_history {
        engine.write_history(handle)?;
    } else {
        engine.write_balances(handle)?;
    }

    Ok(())
}
