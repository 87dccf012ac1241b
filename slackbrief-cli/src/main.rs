mod cli;

use clap::Parser;
use cli::Cli;
use slackbrief_core::application::digest::DigestJob;
use slackbrief_core::application::schedule::Scheduler;
use slackbrief_core::config::loader::ensure_env_loaded;
use slackbrief_core::init_tracing;
use slackbrief_core::model::DynamicModelProvider;
use std::process::ExitCode;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // clap reads SLACKBRIEF_* defaults, so config/.env must be loaded first.
    ensure_env_loaded();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing();
    info!("Starting slackbrief");
    debug!(
        delay = cli.delay,
        config = ?cli.config,
        channel = ?cli.channel,
        server = ?cli.server,
        "CLI arguments parsed"
    );

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let provider = DynamicModelProvider::from_configs(&config.providers, config.request_timeout());
    let job = match DigestJob::new(&config, provider) {
        Ok(job) => job,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let scheduler = Scheduler::from_minutes(cli.delay).with_max_runs(cli.max_runs());
    info!(
        provider = %config.default_provider,
        model = %config.model,
        interval_secs = scheduler.interval().as_secs(),
        max_runs = ?scheduler.max_runs(),
        "Scheduler configured"
    );

    let schedule = scheduler.run(&job, |run, result| match result {
        Ok(outcome) => {
            debug!(run, turns = outcome.turns, steps = outcome.steps.len(), "Digest ready");
            println!("\n{}", outcome.render());
        }
        Err(err) => eprintln!("Error: {err}"),
    });

    tokio::select! {
        summary = schedule => {
            info!(runs = summary.runs, failures = summary.failures, "Schedule finished");
            if summary.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        _ = interrupted() => {
            info!("Interrupted, stopping scheduler");
            ExitCode::SUCCESS
        }
    }
}

async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
