//! CLI module for Forge CORE commands.
//!
//! ## Usage
//!
//! ```bash
//! forge-core-cli generate --owner u1 --prompt "Contact form"
//! forge-core-cli batch --owner u1 --priority 3 --prompt A --prompt B
//! forge-core-cli config show
//! ```
//!
//! Commands run against an in-process runtime with the offline echo backend.

pub mod config_cmd;
pub mod run_cmd;

pub use run_cmd::{run_batch, run_generate, RunArgs};

/// Parse `--flag value` style arguments following the subcommand.
///
/// Returns the error message to print on a malformed argument list.
pub fn parse_run_args(args: &[String]) -> Result<RunArgs, String> {
    let mut parsed = RunArgs::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = || {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| format!("Missing value for {flag}"))
        };
        match flag {
            "--owner" => parsed.owner_id = value()?,
            "--prompt" => parsed.prompts.push(value()?),
            "--priority" => {
                parsed.priority = value()?
                    .parse()
                    .map_err(|_| "--priority must be an integer".to_string())?
            }
            "--balance" => {
                parsed.balance = value()?
                    .parse()
                    .map_err(|_| "--balance must be an integer".to_string())?
            }
            "--no-cache" => {
                parsed.use_cache = false;
                i += 1;
                continue;
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 2;
    }
    if parsed.prompts.is_empty() {
        return Err("At least one --prompt is required".to_string());
    }
    Ok(parsed)
}

/// [`parse_run_args`] for `batch`. Jobs always use the cache, so
/// `--no-cache` is rejected.
pub fn parse_batch_args(args: &[String]) -> Result<RunArgs, String> {
    if args.iter().any(|a| a == "--no-cache") {
        return Err("--no-cache is not supported for batch".to_string());
    }
    parse_run_args(args)
}
