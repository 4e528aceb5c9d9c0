//! DevSecOps CLI main entry point

use anyhow::Result;
use clap::Parser;
use devsecops_cli::{
    commands::{Cli, CommandExecutor},
    config::SiteConfig,
    interactive::start_interactive,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = SiteConfig::load_or_default(cli.config.as_deref())?;
    let mut executor = CommandExecutor::from_config(config)?;

    let Some(command) = cli.command else {
        // No command given, start interactive mode
        return start_interactive(executor).await;
    };

    let result = executor.execute(command).await?;
    if !result.message.is_empty() {
        eprintln!("{}", result.message);
    }

    // Exit with appropriate code
    if result.success {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}
