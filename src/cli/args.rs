use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "chore-sync")]
#[command(about = "Offline-first sync client for the family chore chart")]
#[command(long_about = "chore-sync - offline-first sync client for the family chore chart

Chore completions, nightly zones and bonus requests are queued locally and
replayed against the hosted database whenever it is reachable. Reads go
through a local cache so today's chart still works without a connection.

QUICK START:
  chore-sync complete <assignment> --child <id> --xp 10
  chore-sync today --child <id>
  chore-sync sync status
  chore-sync watch

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  chore-sync <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Defaults to `general.default_output` from the config file.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Treat the remote store as unreachable
    #[arg(long, global = true)]
    pub offline: bool,

    /// Remote store URL (overrides remote.url)
    #[arg(long, env = "CHORE_SYNC_URL", global = true, hide_env_values = true)]
    pub url: Option<String>,

    /// Remote store API key (overrides remote.anon_key)
    #[arg(long, env = "CHORE_SYNC_ANON_KEY", global = true, hide_env_values = true)]
    pub anon_key: Option<String>,

    /// Log filter, e.g. `info` or `chore_sync=debug`
    #[arg(long, env = "CHORE_SYNC_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mark a chore assignment complete for today
    ///
    /// The completion is queued and shown in today's chart right away with
    /// a pending marker. If the remote store is reachable it is synced
    /// immediately; otherwise it waits for the next pass.
    ///
    /// # Examples
    ///
    ///   chore-sync complete a-123 --child kid-1 --xp 10
    ///   chore-sync --offline complete a-123 --child kid-1 --xp 10
    #[command(alias = "c")]
    Complete(CompleteArgs),

    /// Mark a nightly cleanup zone done for the current week
    Nightly(NightlyArgs),

    /// Ask a parent to approve a bonus task
    RequestBonus(RequestBonusArgs),

    /// Show a child's completions for today
    ///
    /// Reads from the remote store and refreshes the cache. When offline,
    /// the cached chart is shown regardless of age. When the remote store
    /// errors, a cache entry younger than --max-age is used instead.
    #[command(alias = "t")]
    Today(TodayArgs),

    /// Pending queue management
    ///
    /// # Subcommands
    ///
    ///   status   Show how many operations are waiting
    ///   run      Run a reconciliation pass now
    ///   list     Show queued operations in replay order
    ///   clear    Drop every queued operation
    Sync(SyncArgs),

    /// Read cache inspection
    Cache(CacheArgs),

    /// Watch connectivity and sync on reconnect and on an interval
    ///
    /// Runs until interrupted, or for --ticks polls.
    Watch {
        /// Stop after this many connectivity polls
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Generate shell completions
    ///
    /// Example: chore-sync completions bash > ~/.bash_completion.d/chore-sync
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct CompleteArgs {
    /// Chore assignment id
    pub assignment_id: String,

    /// Child completing the chore
    #[arg(long)]
    pub child: String,

    /// XP awarded for the chore
    #[arg(long, default_value = "0")]
    pub xp: i64,
}

#[derive(Args)]
pub struct NightlyArgs {
    #[arg(long)]
    pub child: String,

    #[arg(long)]
    pub zone: String,

    /// Day of week, 0 = Sunday .. 6 = Saturday
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=6))]
    pub day: u8,
}

#[derive(Args)]
pub struct RequestBonusArgs {
    /// Bonus task id
    #[arg(long)]
    pub task: String,

    #[arg(long)]
    pub child: String,
}

#[derive(Args)]
pub struct TodayArgs {
    #[arg(long)]
    pub child: String,

    /// Oldest cache entry (seconds) to fall back on when the remote errors
    #[arg(long)]
    pub max_age: Option<u64>,
}

#[derive(Args)]
pub struct SyncArgs {
    #[command(subcommand)]
    pub command: SyncCommands,
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Show pending queue status
    Status,

    /// Run a reconciliation pass now
    Run,

    /// List queued operations in replay order
    List,

    /// Drop every queued operation
    ///
    /// Queued writes that never reached the remote store are lost.
    Clear {
        /// Required confirmation
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// List cache keys with their age
    List,

    /// Print one cache entry regardless of age
    Get { key: String },

    /// Wipe the read cache
    Clear,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_output_format_unset() {
        let cli = Cli::try_parse_from(["chore-sync", "sync", "status"]).unwrap();
        assert!(cli.output.is_none());
        assert!(!cli.offline);
    }

    #[test]
    fn test_cli_output_format_short() {
        let cli = Cli::try_parse_from(["chore-sync", "-o", "json", "sync", "status"]).unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["chore-sync", "sync", "run", "--offline", "--output", "json"])
            .unwrap();
        assert!(cli.offline);
        assert_eq!(cli.output, Some(OutputFormat::Json));
    }

    #[test]
    fn test_cli_complete_command() {
        let cli = Cli::try_parse_from([
            "chore-sync", "complete", "a-1", "--child", "kid", "--xp", "15",
        ])
        .unwrap();
        if let Commands::Complete(args) = cli.command {
            assert_eq!(args.assignment_id, "a-1");
            assert_eq!(args.child, "kid");
            assert_eq!(args.xp, 15);
        } else {
            panic!("Expected Complete command");
        }
    }

    #[test]
    fn test_cli_nightly_day_range() {
        assert!(Cli::try_parse_from([
            "chore-sync", "nightly", "--child", "kid", "--zone", "z", "--day", "6",
        ])
        .is_ok());
        assert!(Cli::try_parse_from([
            "chore-sync", "nightly", "--child", "kid", "--zone", "z", "--day", "7",
        ])
        .is_err());
    }

    #[test]
    fn test_cli_sync_clear_force() {
        let cli = Cli::try_parse_from(["chore-sync", "sync", "clear", "--force"]).unwrap();
        if let Commands::Sync(args) = cli.command {
            assert!(matches!(args.command, SyncCommands::Clear { force: true }));
        } else {
            panic!("Expected Sync command");
        }
    }

    #[test]
    fn test_cli_cache_get() {
        let cli = Cli::try_parse_from(["chore-sync", "cache", "get", "completions_kid_2024-06-12"])
            .unwrap();
        if let Commands::Cache(args) = cli.command {
            assert!(matches!(args.command, CacheCommands::Get { key } if key == "completions_kid_2024-06-12"));
        } else {
            panic!("Expected Cache command");
        }
    }

    #[test]
    fn test_cli_completions_shell() {
        let cli = Cli::try_parse_from(["chore-sync", "completions", "zsh"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions { shell: Shell::Zsh }));
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Pretty);
    }
}
