mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use nvhook::HookConfig;
use nvhook::monitoring::tracing_setup::TracingConfig;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let guard = TracingConfig::new(cli.debug, cli.json_logs, cli.log_file.clone()).init_tracing()?;

    match cli.command {
        Commands::Prestart => prestart(&cli, guard),
        Commands::Poststart | Commands::Poststop => {
            debug!("Nothing to do for {:?}", cli.command);
            Ok(())
        }
    }
}

fn prestart(cli: &Cli, guard: Option<WorkerGuard>) -> Result<()> {
    let hook = HookConfig::load_from(&cli.config)
        .with_context(|| format!("Failed to load hook configuration from {:?}", cli.config))?;

    let stdin = std::io::stdin().lock();
    let Some(invocation) = nvhook::runtime::prestart(&hook, stdin).context("Prestart hook failed")?
    else {
        return Ok(());
    };

    info!(
        "🚀 Executing {:?} {}",
        invocation.program,
        invocation.args.join(" ")
    );
    // exec never runs destructors; flush the file sink first.
    drop(guard);
    let err = invocation.exec();
    Err(err).with_context(|| format!("Failed to exec {:?}", invocation.program))
}
