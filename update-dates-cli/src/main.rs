mod cli;
mod config;
mod errors;
mod output;

use std::{io, path::PathBuf};

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands};
use color_eyre::Result;
use config::Config;
use tracing::debug;
use update_dates_core::{DateUpdater, Scope, init_logging, report::RunReport, vault::FsVault};

fn main() -> Result<()> {
    crate::errors::init()?;
    init_logging()?;

    let args = Cli::parse();
    match &args.command {
        Commands::GenerateConfig { path } => Config::generate_config(path.clone()),
        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "update-dates", &mut io::stdout());
            Ok(())
        }
        command => {
            let config = Config::new(&args)?;
            let (scope, report) = run(&config, command)?;
            println!("{}", output::notice(&scope, &report));
            println!("{}", output::table(&report));
            Ok(())
        }
    }
}

fn run(config: &Config, command: &Commands) -> Result<(Scope, RunReport)> {
    // No configured vault: work in the current directory
    let vault_path = if config.core.vault_path == PathBuf::new() {
        PathBuf::from(".")
    } else {
        config.core.vault_path.clone()
    };
    debug!("Opening vault at {}", vault_path.display());
    let mut updater = DateUpdater::new(FsVault::new(vault_path)?)
        .with_invalid_filter_policy(config.core.invalid_priority_policy);

    match command {
        Commands::Highlight { target, filter } => {
            let scope = config.scope(target);
            let report = updater.highlight_past_dates(
                &scope,
                &config.excluded(target),
                Config::reference(target),
                config.role(target),
                Some(&config.task_filter(filter)),
            )?;
            Ok((scope, report))
        }
        Commands::Unhighlight { target } => {
            let scope = config.scope(target);
            let report = updater.unhighlight_past_dates(
                &scope,
                &config.excluded(target),
                Config::reference(target),
                config.role(target),
            )?;
            Ok((scope, report))
        }
        Commands::Update { target, filter } => {
            let scope = config.scope(target);
            let report = updater.update_past_dates_to_reference(
                &scope,
                &config.excluded(target),
                Config::reference(target),
                config.role(target),
                Some(&config.task_filter(filter)),
            )?;
            Ok((scope, report))
        }
        Commands::GenerateConfig { .. } | Commands::Completions { .. } => {
            color_eyre::eyre::bail!("{command:?} does not touch the vault")
        }
    }
}
