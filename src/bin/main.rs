//! groonga-stdio CLI - run Groonga commands through a queued stdio client
//!
//! Usage:
//!   groonga-stdio <db_path> [command]...
//!   groonga-stdio <db_path> < commands.txt
//!
//! Examples:
//!   groonga-stdio ./db/people.db status
//!   groonga-stdio ./db/people.db "table_create People TABLE_HASH_KEY ShortText" dump
//!   groonga-stdio ./db/people.db "load --table People" --values people.json

use clap::Parser;
use groonga_stdio::command::ArgValue;
use groonga_stdio::config::{parse_duration, Settings};
use groonga_stdio::{ClientResult, GroongaClient, PendingResponse, Response};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "groonga-stdio")]
#[command(about = "Run Groonga commands through a queued stdio client")]
#[command(version)]
struct Cli {
    /// Path to the Groonga database (created if missing unless --open-only)
    db_path: PathBuf,

    /// Commands to run in order (reads stdin when omitted)
    commands: Vec<String>,

    /// Path to the groonga executable
    #[arg(long)]
    groonga_path: Option<PathBuf>,

    /// Never create the database
    #[arg(long)]
    open_only: bool,

    /// Output poll interval (e.g. 300ms, 1s)
    #[arg(long, value_parser = duration_arg)]
    read_interval: Option<Duration>,

    /// Per-command timeout (e.g. 30s, 5m)
    #[arg(long, value_parser = duration_arg)]
    timeout: Option<Duration>,

    /// Settings file (defaults to the usual search locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File holding the payload for load commands
    #[arg(long)]
    values: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn duration_arg(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let mut options = match settings.and_then(|s| s.client_options()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = &cli.groonga_path {
        options = options.with_groonga_path(path);
    }
    if cli.open_only {
        options = options.with_open_only(true);
    }
    if let Some(interval) = cli.read_interval {
        options = options.with_read_interval(interval);
    }
    if let Some(timeout) = cli.timeout {
        options = options.with_timeout(timeout);
    }

    let values = match &cli.values {
        Some(path) => match fs::read_to_string(path) {
            Ok(s) => Some(s),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let client = GroongaClient::spawn(&cli.db_path, options);

    let ok = if cli.commands.is_empty() {
        run_stdin(&client, values.as_deref()).await
    } else {
        run_args(&client, &cli.commands, values.as_deref()).await
    };

    if let Some(e) = client.last_error() {
        eprintln!("groonga: {}", e);
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("groonga_stdio=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn submit(client: &GroongaClient, line: &str, values: Option<&str>) -> PendingResponse {
    match values {
        Some(values) if is_load(line) => {
            client.command_with(line, [("values", ArgValue::from(values))])
        }
        _ => client.command(line),
    }
}

fn is_load(line: &str) -> bool {
    line.split_whitespace().next() == Some("load")
}

/// Queue every command up front, then print results in order.
async fn run_args(client: &GroongaClient, commands: &[String], values: Option<&str>) -> bool {
    let pending: Vec<_> = commands
        .iter()
        .map(|c| submit(client, c, values))
        .collect();

    let mut ok = true;
    for (command, result) in commands.iter().zip(pending) {
        ok &= print_result(command, result.await);
    }
    ok
}

/// Run commands read line by line. A `load` without `--values` takes the
/// next line as its payload.
async fn run_stdin(client: &GroongaClient, values: Option<&str>) -> bool {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ok = true;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error reading stdin: {}", e);
                return false;
            }
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let payload = match values {
            Some(v) => Some(v.to_string()),
            None if is_load(line) => lines.next_line().await.ok().flatten(),
            None => None,
        };

        let result = submit(client, line, payload.as_deref()).await;
        ok &= print_result(line, result);
    }
    ok
}

fn print_result(command: &str, result: ClientResult<Response>) -> bool {
    match result {
        Ok(Response::Json(value)) => {
            match serde_json::to_string_pretty(&value) {
                Ok(s) => println!("{}", s),
                Err(_) => println!("{}", value),
            }
            true
        }
        Ok(Response::Text(text)) => {
            println!("{}", text.trim_end());
            true
        }
        Ok(Response::Binary(bytes)) => {
            let mut stdout = std::io::stdout();
            stdout.write_all(&bytes).is_ok() && stdout.flush().is_ok()
        }
        Err(e) => {
            eprintln!("Error running '{}': {}", command, e);
            false
        }
    }
}
