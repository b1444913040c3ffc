use std::{
    collections::BTreeSet,
    env,
    fs::{File, create_dir_all},
    io::Write,
    path::PathBuf,
};

use color_eyre::{Result, eyre::WrapErr};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    filter::{AttributeFlags, InvalidFilterPolicy, TaskFilter, TaskStatus},
    markers::{DateRole, Priority},
};

const CONFIG: &str = include_str!("../../.config/core.toml");
const CONFIG_FILE_NAME: &str = "core";

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

/// One toggle per priority, as the settings tab shows them.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PriorityToggles {
    pub lowest: bool,
    pub low: bool,
    pub normal: bool,
    pub medium: bool,
    pub high: bool,
    pub highest: bool,
}

impl PriorityToggles {
    #[must_use]
    pub fn selected(&self) -> BTreeSet<Priority> {
        [
            (Priority::Lowest, self.lowest),
            (Priority::Low, self.low),
            (Priority::Normal, self.normal),
            (Priority::Medium, self.medium),
            (Priority::High, self.high),
            (Priority::Highest, self.highest),
        ]
        .into_iter()
        .filter_map(|(priority, on)| on.then_some(priority))
        .collect()
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct UpdateDatesConfig {
    #[serde(default)]
    pub vault_path: PathBuf,
    /// Folder processed when no document or folder is given.
    #[serde(default)]
    pub folder_path: String,
    #[serde(default)]
    pub excluded_folders: Vec<String>,
    #[serde(default)]
    pub date_role: DateRole,
    #[serde(default)]
    pub task_status: TaskStatus,
    #[serde(default)]
    pub priorities: PriorityToggles,
    #[serde(default)]
    pub attributes: AttributeFlags,
    #[serde(default)]
    pub invalid_priority_policy: InvalidFilterPolicy,
}

pub struct ProtoConfig {
    pub vault_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

impl UpdateDatesConfig {
    /// Loads the user configuration over the defaults.
    ///
    /// # Errors
    ///
    /// Will return an error if a configuration file exists but can't be parsed.
    pub fn new(params: &ProtoConfig) -> Result<Self> {
        let default_config = Self::default();
        let data_dir = get_data_dir();
        let config_path = params.config_path.clone().unwrap_or_else(get_config_dir);
        debug!(
            "Using data directory at {} and config directory at {}",
            data_dir.display(),
            config_path.display()
        );

        // A config file was provided
        let builder = if config_path.is_file() {
            config::Config::builder()
                .set_default("data_dir", data_dir.to_string_lossy().into_owned())?
                .add_source(config::File::from(config_path))
        } else {
            let mut builder = config::Config::builder()
                .set_default("data_dir", data_dir.to_string_lossy().into_owned())?
                .set_default("config_dir", config_path.to_string_lossy().into_owned())?;

            let config_files = [
                (
                    format!("{CONFIG_FILE_NAME}.json5"),
                    config::FileFormat::Json5,
                ),
                (format!("{CONFIG_FILE_NAME}.json"), config::FileFormat::Json),
                (format!("{CONFIG_FILE_NAME}.yaml"), config::FileFormat::Yaml),
                (format!("{CONFIG_FILE_NAME}.toml"), config::FileFormat::Toml),
                (format!("{CONFIG_FILE_NAME}.ini"), config::FileFormat::Ini),
            ];
            let mut found_config = false;
            for (file, format) in &config_files {
                let source = config::File::from(config_path.join(file))
                    .format(*format)
                    .required(false);
                builder = builder.add_source(source);
                if config_path.join(file).exists() {
                    found_config = true;
                }
            }
            if !found_config && !cfg!(test) {
                info!(
                    "No configuration file found. Create one at {config_path:?} or generate one using `update-dates generate-config`"
                );
            }
            builder
        };

        let user_config: Self = builder
            .build()?
            .try_deserialize()
            .wrap_err("Invalid configuration")?;

        let mut cfg = Self::merge(user_config, default_config);
        if let Some(path) = &params.vault_path {
            cfg.vault_path.clone_from(path);
        }
        Ok(cfg)
    }

    fn merge(user_config: Self, default_config: Self) -> Self {
        Self {
            vault_path: if user_config.vault_path == PathBuf::new() {
                default_config.vault_path
            } else {
                user_config.vault_path
            },
            folder_path: if user_config.folder_path.is_empty() {
                default_config.folder_path
            } else {
                user_config.folder_path
            },
            excluded_folders: if user_config.excluded_folders.is_empty() {
                default_config.excluded_folders
            } else {
                user_config.excluded_folders
            },
            date_role: user_config.date_role,
            task_status: user_config.task_status,
            priorities: user_config.priorities,
            attributes: user_config.attributes,
            invalid_priority_policy: user_config.invalid_priority_policy,
        }
    }

    /// The task filter described by the configured defaults.
    #[must_use]
    pub fn task_filter(&self) -> TaskFilter {
        TaskFilter {
            status: self.task_status,
            priorities: self.priorities.selected(),
            attributes: self.attributes,
        }
    }

    /// Writes the default configuration file and returns its path.
    ///
    /// # Errors
    ///
    /// Will return an error if the directory or the file can't be created.
    pub fn generate_config(path: Option<PathBuf>) -> Result<PathBuf> {
        let config_dir = path.unwrap_or_else(get_config_dir);
        let dest = config_dir.join(format!("{CONFIG_FILE_NAME}.toml"));
        create_dir_all(&config_dir)
            .wrap_err_with(|| format!("Failed to create config directory at {config_dir:?}"))?;
        File::create(&dest)
            .and_then(|mut file| file.write_all(CONFIG.as_bytes()))
            .wrap_err_with(|| format!("Failed to write default config at {dest:?}"))?;
        Ok(dest)
    }
}

pub fn get_data_dir() -> PathBuf {
    DATA_FOLDER.clone().map_or_else(
        || {
            project_directory().map_or_else(
                || PathBuf::from(".").join(".data"),
                |proj_dirs| proj_dirs.data_local_dir().to_path_buf(),
            )
        },
        |s| s,
    )
}

pub fn get_config_dir() -> PathBuf {
    CONFIG_FOLDER.clone().map_or_else(
        || {
            project_directory().map_or_else(
                || PathBuf::from(".").join(".config"),
                |proj_dirs| proj_dirs.config_local_dir().to_path_buf(),
            )
        },
        |s| s,
    )
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "update-dates", env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use pretty_assertions::assert_eq;

    use super::{CONFIG, ProtoConfig, UpdateDatesConfig};
    use crate::{
        filter::{InvalidFilterPolicy, TaskStatus},
        markers::{DateRole, Priority},
    };

    #[test]
    fn embedded_config_matches_default() {
        let embedded: UpdateDatesConfig = toml::from_str(CONFIG).unwrap();
        assert_eq!(embedded, UpdateDatesConfig::default());
    }

    #[test]
    fn default_filter_selects_unfinished_tasks_of_any_priority() {
        let filter = UpdateDatesConfig::default().task_filter();
        assert_eq!(filter.status, TaskStatus::Unfinished);
        assert!(filter.priorities.is_empty());
        assert!(!filter.attributes.any());
    }

    #[test]
    fn user_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.toml");
        fs::write(
            &path,
            r#"
folder_path = "tasks"
excluded_folders = ["archive"]
date_role = "due"
task_status = "all"
invalid_priority_policy = "ignore"

[priorities]
high = true

[attributes]
has_due_date = true
"#,
        )
        .unwrap();

        let cfg = UpdateDatesConfig::new(&ProtoConfig {
            vault_path: Some(PathBuf::from("/vault")),
            config_path: Some(path),
        })
        .unwrap();

        assert_eq!(cfg.vault_path, PathBuf::from("/vault"));
        assert_eq!(cfg.folder_path, "tasks");
        assert_eq!(cfg.excluded_folders, vec!["archive"]);
        assert_eq!(cfg.date_role, DateRole::Due);
        assert_eq!(cfg.invalid_priority_policy, InvalidFilterPolicy::Ignore);

        let filter = cfg.task_filter();
        assert_eq!(filter.status, TaskStatus::All);
        assert_eq!(filter.priorities.into_iter().collect::<Vec<_>>(), vec![Priority::High]);
        assert!(filter.attributes.has_due_date);
        assert!(!filter.attributes.has_scheduled_date);
    }

    #[test]
    fn empty_config_dir_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = UpdateDatesConfig::new(&ProtoConfig {
            vault_path: None,
            config_path: Some(dir.path().to_path_buf()),
        })
        .unwrap();
        assert_eq!(cfg, UpdateDatesConfig::default());
    }

    #[test]
    fn generated_config_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let dest = UpdateDatesConfig::generate_config(Some(dir.path().join("nested"))).unwrap();
        assert!(dest.ends_with("nested/core.toml"));
        let cfg = UpdateDatesConfig::new(&ProtoConfig {
            vault_path: None,
            config_path: Some(dest),
        })
        .unwrap();
        assert_eq!(cfg, UpdateDatesConfig::default());
    }
}
