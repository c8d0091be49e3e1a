use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use chore_sync::cli::args::{Cli, Commands};
use chore_sync::cli::commands::{self, Backend};
use chore_sync::config::{ColorSetting, Config};
use chore_sync::features::sync::SyncEngine;
use chore_sync::storage::Database;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter).with_context(|| format!("invalid log filter '{filter}'"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = Config::load()
        .context("loading configuration")?
        .with_remote_overrides(cli.url.clone(), cli.anon_key.clone());

    match config.general.color {
        ColorSetting::Always => colored::control::set_override(true),
        ColorSetting::Never => colored::control::set_override(false),
        ColorSetting::Auto => {},
    }
    let format = cli.output.unwrap_or(config.general.default_output);

    if let Commands::Completions { shell } = cli.command {
        print!("{}", commands::generate_completions(shell)?);
        return Ok(());
    }

    let db = Database::open().context("opening local database")?;
    let backend = Backend::connect(&config.remote, cli.offline).context("connecting to remote store")?;
    let mut engine = SyncEngine::new(&db, backend.remote(), backend.connectivity())
        .with_max_observers(config.sync.max_observers);

    let output = match &cli.command {
        Commands::Complete(args) => commands::complete(&engine, args, format)?,
        Commands::Nightly(args) => commands::nightly(&engine, args, format)?,
        Commands::RequestBonus(args) => commands::request_bonus(&engine, args, format)?,
        Commands::Today(args) => {
            commands::today(&engine, args, config.sync.cache_max_age(), format)?
        },
        Commands::Sync(args) => commands::sync(&engine, &args.command, format)?,
        Commands::Cache(args) => commands::cache(&engine, &args.command, format)?,
        Commands::Watch { ticks } => commands::watch(&mut engine, &config.sync, *ticks, format)?,
        Commands::Completions { .. } => String::new(),
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
