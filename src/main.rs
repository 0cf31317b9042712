mod cli;
mod commands;
mod config;
mod error;
mod export;
mod mcp;
mod naming;
mod page_range;
mod pdf;
mod registry;
mod session;
mod sidecar;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, PrefixArgs};
use config::Config;
use naming::YearPrefix;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "atchsplit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stdout carries MCP frames and command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn prefix(config: &Config, args: &PrefixArgs) -> Result<YearPrefix> {
    config.resolve_prefix(args.year.as_deref(), args.custom_year.as_deref())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::from_env();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server(config).await?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
        Commands::Preview {
            path,
            output_dir,
            pages,
        } => {
            commands::preview::run(&path, &pages, &output_dir)?;
        }
        Commands::Split {
            path,
            names,
            prefix: args,
        } => {
            commands::split::run(&path, &names, prefix(&config, &args)?)?;
        }
        Commands::SaveNames {
            path,
            names,
            prefix: args,
        } => {
            commands::names::save(&path, &names, prefix(&config, &args)?)?;
        }
        Commands::ShowNames {
            path,
            sidecar,
            prefix: args,
        } => {
            commands::names::show(&path, sidecar, prefix(&config, &args)?)?;
        }
    }

    Ok(())
}
