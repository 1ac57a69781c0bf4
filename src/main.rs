//! Forge CORE command-line entry point.
//!
//! ## CLI Subcommands
//!
//! - `forge-core-cli generate` - Run prompts through the single-request pipeline
//! - `forge-core-cli batch` - Enqueue prompts as one job and wait for it
//! - `forge-core-cli config` - Show, print defaults for, or validate configuration

use std::process::ExitCode;

use forge_core::cli::{config_cmd, parse_batch_args, parse_run_args, run_batch, run_generate};
use forge_core::config::{self as forge_config, EnvConfig};
use forge_core::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "generate" | "batch" => {
            let config = match load_config() {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Configuration error: {}", e);
                    return ExitCode::from(2u8);
                }
            };
            if let Err(e) = telemetry::init_logging(&config.log) {
                eprintln!("Warning: logging disabled: {}", e);
            }
            telemetry::init_metrics();

            let parsed = if command == "generate" {
                parse_run_args(&args[2..])
            } else {
                parse_batch_args(&args[2..])
            };
            let run_args = match parsed {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    print_command_help(command);
                    return ExitCode::FAILURE;
                }
            };
            let code = if command == "generate" {
                run_generate(&config, run_args).await
            } else {
                tokio::select! {
                    code = run_batch(&config, run_args) => code,
                    _ = tokio::signal::ctrl_c() => {
                        eprintln!("Interrupted");
                        130
                    }
                }
            };
            ExitCode::from(code as u8)
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            let config = match load_config() {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Configuration error: {}", e);
                    return ExitCode::from(2u8);
                }
            };
            match subcommand {
                "show" => {
                    config_cmd::run_show(&config);
                    ExitCode::SUCCESS
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => {
                    let code = config_cmd::run_validate(&config);
                    ExitCode::from(code as u8)
                }
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = args.get(2) {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("forge-core {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

/// Environment config, or the TOML file named by `FORGE_CONFIG`.
fn load_config() -> Result<EnvConfig, String> {
    match std::env::var("FORGE_CONFIG") {
        Ok(path) => {
            let source = std::fs::read_to_string(&path)
                .map_err(|e| format!("cannot read {}: {}", path, e))?;
            forge_config::from_toml_str(&source).map_err(|e| e.to_string())
        }
        Err(_) => Ok(forge_config::load()),
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "Forge CORE - credit-gated artifact generation v{}

USAGE:
    forge-core-cli [COMMAND] [OPTIONS]

COMMANDS:
    generate     Run prompts through the generation pipeline
    batch        Enqueue prompts as a prioritized batch job
    config       Manage configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

EXAMPLES:
    forge-core-cli generate --owner u1 --prompt \"Signup form\"
    forge-core-cli batch --owner u1 --priority 3 --prompt A --prompt B
    forge-core-cli config validate

ENVIRONMENT:
    FORGE_CONFIG      Path to a TOML config file (replaces FORGE_* variables)
    FORGE_LOG_LEVEL   Log filter (debug, info, warn, error)
    FORGE_LOG_FORMAT  json or pretty

EXIT CODES:
    0  Success
    1  Failure
    2  Configuration error
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "generate" => {
            eprintln!(
                "forge-core-cli generate - Run prompts through the pipeline

USAGE:
    forge-core-cli generate --prompt TEXT [--prompt TEXT ...] [OPTIONS]

OPTIONS:
    --owner ID      Owner identifier (default: local)
    --balance N     Opening credit balance for the owner (default: 10)
    --no-cache      Bypass the result cache

DESCRIPTION:
    Opens an in-process account, then runs each prompt through the credit
    gate, cache, draft and polish stages. Prints one JSON outcome per line.
    Repeating a prompt returns the cached artifact and still debits.
"
            );
        }
        "batch" => {
            eprintln!(
                "forge-core-cli batch - Run prompts as one scheduled job

USAGE:
    forge-core-cli batch --prompt TEXT [--prompt TEXT ...] [OPTIONS]

OPTIONS:
    --owner ID      Owner identifier (default: local)
    --priority N    Job priority, higher runs first (default: 1)
    --balance N     Opening credit balance for the owner (default: 10)

DESCRIPTION:
    Starts the batch worker, enqueues the job, waits until it completes and
    prints the job with per-prompt results in prompt order.
"
            );
        }
        "config" => {
            eprintln!(
                "forge-core-cli config - Manage configuration

USAGE:
    forge-core-cli config [SUBCOMMAND]

SUBCOMMANDS:
    show        Show effective configuration (default)
    defaults    Show default values
    validate    Check for misconfigurations (exit 1 on warnings)
"
            );
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
        }
    }
}
