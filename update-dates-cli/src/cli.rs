use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use update_dates_core::{
    config::{get_config_dir, get_data_dir},
    filter::TaskStatus,
    markers::{DateRole, Priority},
};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Vault to work in
    #[arg(short, long, value_name = "PATH")]
    pub vault_path: Option<PathBuf>,
    /// Use a custom config file
    #[arg(short, long, value_name = "PATH")]
    pub config_path: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

/// Highlight, unhighlight or roll forward past dates in your task lists.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wrap past dates in `==` highlight markers
    #[command(alias = "hl")]
    Highlight {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        filter: TaskFilterArgs,
    },
    /// Remove highlight markers from dates
    #[command(alias = "uhl")]
    Unhighlight {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Replace past dates with the reference date
    Update {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        filter: TaskFilterArgs,
    },
    /// Generates a new configuration file from the default one
    GenerateConfig { path: Option<PathBuf> },
    /// Print shell completions
    Completions { shell: Shell },
}

/// Documents to act on and how.
#[derive(Args, Debug, Default)]
#[command(group(ArgGroup::new("scope").args(["file", "folder"])))]
pub struct TargetArgs {
    /// Single document, relative to the vault.
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,
    /// Folder, relative to the vault. Defaults to the configured folder.
    #[arg(long, value_name = "PATH")]
    pub folder: Option<String>,
    /// Folder paths or names to skip, separated by comma.
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,
    /// Reference date. Defaults to today.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
    /// Dates to act on.
    #[arg(long, value_enum)]
    pub date_type: Option<CliDateRole>,
}

/// Restrict the operation to some tasks.
///
/// Omitted flags fall back to the configuration.
#[derive(Args, Debug, Default)]
pub struct TaskFilterArgs {
    /// Task completion state.
    #[arg(long, value_enum)]
    pub status: Option<CliTaskStatus>,
    /// Priorities to keep, separated by comma.
    #[arg(long, value_delimiter = ',', value_enum)]
    pub priority: Vec<CliPriority>,
    /// Only recurring tasks.
    #[arg(long)]
    pub recurring: bool,
    /// Only tasks with a due date.
    #[arg(long)]
    pub due: bool,
    /// Only tasks with a scheduled date.
    #[arg(long)]
    pub scheduled: bool,
    /// Only tasks with a start date.
    #[arg(long)]
    pub start: bool,
}

impl TaskFilterArgs {
    pub const fn has_attribute_flag(&self) -> bool {
        self.recurring || self.due || self.scheduled || self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliDateRole {
    Both,
    Due,
    Scheduled,
}

impl From<CliDateRole> for DateRole {
    fn from(role: CliDateRole) -> Self {
        match role {
            CliDateRole::Both => Self::Both,
            CliDateRole::Due => Self::Due,
            CliDateRole::Scheduled => Self::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliTaskStatus {
    Unfinished,
    Completed,
    All,
}

impl From<CliTaskStatus> for TaskStatus {
    fn from(status: CliTaskStatus) -> Self {
        match status {
            CliTaskStatus::Unfinished => Self::Unfinished,
            CliTaskStatus::Completed => Self::Completed,
            CliTaskStatus::All => Self::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliPriority {
    Lowest,
    Low,
    Normal,
    Medium,
    High,
    Highest,
}

impl From<CliPriority> for Priority {
    fn from(priority: CliPriority) -> Self {
        match priority {
            CliPriority::Lowest => Self::Lowest,
            CliPriority::Low => Self::Low,
            CliPriority::Normal => Self::Normal,
            CliPriority::Medium => Self::Medium,
            CliPriority::High => Self::High,
            CliPriority::Highest => Self::Highest,
        }
    }
}

const VERSION_MESSAGE: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> String {
    let author = clap::crate_authors!();

    let config_dir_path = get_config_dir().display().to_string();
    let data_dir_path = get_data_dir().display().to_string();

    format!(
        "\
{VERSION_MESSAGE}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}
