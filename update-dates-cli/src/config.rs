use std::path::PathBuf;

use color_eyre::Result;
use tracing::debug;
use update_dates_core::{
    Scope,
    config::{ProtoConfig, UpdateDatesConfig},
    date::ReferenceDate,
    filter::{AttributeFlags, TaskFilter},
    markers::{DateRole, Priority},
};

use crate::cli::{Cli, TargetArgs, TaskFilterArgs};

/// Persisted defaults, completed by command-line flags.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub core: UpdateDatesConfig,
}

impl Config {
    pub fn new(args: &Cli) -> Result<Self> {
        let core = UpdateDatesConfig::new(&ProtoConfig {
            vault_path: args.vault_path.clone(),
            config_path: args.config_path.clone(),
        })?;
        debug!("Config loaded: {core:#?}");
        Ok(Self { core })
    }

    pub fn generate_config(path: Option<PathBuf>) -> Result<()> {
        let dest = UpdateDatesConfig::generate_config(path)?;
        println!(
            "Configuration has been created at {}. You can fill the `vault_path` value to set a default vault.",
            dest.display()
        );
        Ok(())
    }

    pub fn scope(&self, target: &TargetArgs) -> Scope {
        match (&target.file, &target.folder) {
            (Some(file), _) => Scope::Document(Some(file.clone())),
            (None, Some(folder)) => Scope::Folder(folder.clone()),
            (None, None) => Scope::Folder(self.core.folder_path.clone()),
        }
    }

    pub fn excluded(&self, target: &TargetArgs) -> Vec<String> {
        if target.exclude.is_empty() {
            self.core.excluded_folders.clone()
        } else {
            target.exclude.clone()
        }
    }

    pub fn role(&self, target: &TargetArgs) -> DateRole {
        target.date_type.map_or(self.core.date_role, DateRole::from)
    }

    pub fn reference(target: &TargetArgs) -> Option<ReferenceDate> {
        target.date.map(ReferenceDate::from)
    }

    pub fn task_filter(&self, args: &TaskFilterArgs) -> TaskFilter {
        let mut filter = self.core.task_filter();
        if let Some(status) = args.status {
            filter.status = status.into();
        }
        if !args.priority.is_empty() {
            filter.priorities = args.priority.iter().copied().map(Priority::from).collect();
        }
        if args.has_attribute_flag() {
            filter.attributes = AttributeFlags {
                has_recurring: args.recurring,
                has_due_date: args.due,
                has_scheduled_date: args.scheduled,
                has_start_date: args.start,
            };
        }
        filter
    }
}
