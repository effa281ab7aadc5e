//! plantbook-demo -- command-line front end for the Open Plantbook client.
//!
//! Loads configuration, initialises logging, runs one lookup and prints the
//! result as JSON.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use plantbook_sdk::config::Config;
use plantbook_sdk::{PlantbookClientBuilder, TransportError};

// ---------------------------------------------------------------------------
// CLI argument parsing (minimal, no clap dependency)
// ---------------------------------------------------------------------------

enum Command {
    Search { alias: String },
    Detail { pid: String, lang: Option<String> },
}

struct CliArgs {
    config_path: PathBuf,
    json_logs: bool,
    command: Command,
}

fn parse_args() -> CliArgs {
    let mut args = std::env::args().skip(1);
    let mut config_path = PathBuf::from("plantbook.toml");
    let mut json_logs = false;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                if let Some(path) = args.next() {
                    config_path = PathBuf::from(path);
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--json-logs" => json_logs = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("plantbook-demo {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown argument: {other}");
                eprintln!("Run with --help for usage information.");
                std::process::exit(1);
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match (positional.next().as_deref(), positional.next(), positional.next()) {
        (Some("search"), Some(alias), None) => Command::Search { alias },
        (Some("detail"), Some(pid), lang) => Command::Detail { pid, lang },
        _ => {
            print_usage();
            std::process::exit(1);
        }
    };
    if positional.next().is_some() {
        eprintln!("Too many arguments");
        std::process::exit(1);
    }

    CliArgs {
        config_path,
        json_logs,
        command,
    }
}

fn print_usage() {
    println!(
        "\
plantbook-demo {version} -- Open Plantbook API client

USAGE:
    plantbook-demo [OPTIONS] search <TEXT>
    plantbook-demo [OPTIONS] detail <PID> [LANG]

OPTIONS:
    -c, --config <PATH>    Path to configuration file [default: plantbook.toml]
        --json-logs        Emit logs as JSON
    -h, --help             Print this help message
    -V, --version          Print version information

ENVIRONMENT:
    RUST_LOG               Override log level (e.g. RUST_LOG=debug)
    PLANTBOOK_CONFIG       Alternative to --config flag
    PLANTBOOK_CLIENT_ID    OAuth client ID
    PLANTBOOK_SECRET       OAuth client secret
    PLANTBOOK_BASE_URL     API base URL
",
        version = env!("CARGO_PKG_VERSION")
    );
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    let config_path = std::env::var("PLANTBOOK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or(cli.config_path);

    let mut config = Config::load(&config_path)?;
    if cli.json_logs {
        config.logging.json = true;
    }
    init_tracing(&config);

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "Starting plantbook-demo"
    );

    for key in ["client_id", "secret", "base_url", "logging.level", "logging.json"] {
        if let Some(var) = config.env_overrides.env_var_for(key) {
            tracing::debug!(setting = key, env = var, "Setting overridden by environment");
        }
    }

    let client = PlantbookClientBuilder::from_config(&config).build()?;

    let output = match cli.command {
        Command::Search { alias } => client
            .search(&alias)
            .await?
            .map(serde_json::to_value)
            .into_result()?,
        Command::Detail { pid, lang } => client
            .plant_detail(&pid, lang.as_deref())
            .await?
            .map(serde_json::to_value)
            .into_result()
            .map_err(|e| match e {
                plantbook_sdk::Error::Transport(TransportError::Status { status: 404, .. }) => {
                    anyhow::anyhow!("No plant with pid '{pid}'")
                }
                other => other.into(),
            })?,
    }?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tracing initialization
// ---------------------------------------------------------------------------

/// Set up the tracing subscriber based on configuration.
fn init_tracing(config: &Config) {
    // RUST_LOG env var takes precedence over config file
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.logging.level;
        EnvFilter::new(format!("plantbook_sdk={level},plantbook_demo={level},warn"))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
