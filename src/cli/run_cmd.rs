//! `generate` and `batch` subcommands.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::EnvConfig;
use crate::generation::EchoBackend;
use crate::ledger::{CreditAccount, Credits, PlanTier};
use crate::scheduler::{JobStatus, Priority, DEFAULT_PRIORITY};
use crate::workflow::GenerationRequest;
use crate::{Collaborators, Runtime};

/// Arguments shared by the run subcommands.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub owner_id: String,
    pub prompts: Vec<String>,
    pub priority: Priority,
    pub balance: Credits,
    pub use_cache: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            owner_id: "local".to_string(),
            prompts: Vec::new(),
            priority: DEFAULT_PRIORITY,
            balance: 10,
            use_cache: true,
        }
    }
}

async fn runtime_for(config: &EnvConfig, args: &RunArgs) -> Result<Runtime, String> {
    let runtime = Runtime::new(config, Collaborators::in_memory(Arc::new(EchoBackend::new())));
    runtime
        .ledger
        .open_account(CreditAccount::new(args.owner_id.clone(), PlanTier::Basic), args.balance)
        .await
        .map_err(|e| e.to_string())?;
    Ok(runtime)
}

/// Run each prompt synchronously and print the outcomes as JSON lines.
pub async fn run_generate(config: &EnvConfig, args: RunArgs) -> i32 {
    let runtime = match runtime_for(config, &args).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let mut code = 0;
    for prompt in &args.prompts {
        let request = GenerationRequest::new(args.owner_id.clone(), prompt.clone())
            .with_cache(args.use_cache);
        match runtime.orchestrator.process_generation_request(request).await {
            Ok(outcome) => match serde_json::to_string(&outcome) {
                Ok(line) => println!("{line}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    code = 1;
                }
            },
            Err(e) => {
                eprintln!("Error: {e}");
                code = 1;
            }
        }
    }
    code
}

/// Enqueue all prompts as one job, wait for it, print the job view.
pub async fn run_batch(config: &EnvConfig, args: RunArgs) -> i32 {
    let runtime = match runtime_for(config, &args).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let handle = runtime.scheduler.start(CancellationToken::new());
    let id = runtime
        .scheduler
        .add_job(args.owner_id.clone(), args.prompts.clone(), args.priority);

    let view = loop {
        match runtime.scheduler.get_job(&id) {
            Ok(view) if view.status == JobStatus::Completed => break view,
            Ok(_) => tokio::time::sleep(Duration::from_millis(20)).await,
            Err(e) => {
                eprintln!("Error: {e}");
                return 1;
            }
        }
    };

    if let Err(e) = handle.shutdown(config.shutdown_timeout).await {
        eprintln!("Warning: {e}");
    }
    match serde_json::to_string_pretty(&view) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}
