//! Configuration management module.
//!
//! This module handles loading and saving the application configuration:
//! service location, default paging and sorting, login credentials, store
//! behavior and logging.

mod error;

pub use error::ConfigError;

use crate::service::DEFAULT_BASE_URL;
use crate::store::{SortOption, DEFAULT_PAGE_SIZE};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

const FILE_NAME: &str = "config.yml";
const DEFAULT_DIRECTORY_PATH: &str = ".config/dog-search";

/// Oversees management of configuration file.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub page_size: usize,
    pub default_sort: Option<SortOption>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub discard_stale_responses: bool,
    pub slow_action_threshold: Duration,
    pub log_level: LevelFilter,
    file_path: Option<PathBuf>,
}

/// Define specification for configuration file.
///
#[derive(Serialize, Deserialize)]
struct FileSpec {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub discard_stale_responses: bool,
    #[serde(default = "default_slow_action_threshold_ms")]
    pub slow_action_threshold_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_slow_action_threshold_ms() -> u64 {
    16
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Return a new instance holding the defaults.
    ///
    pub fn new() -> Config {
        Config {
            base_url: default_base_url(),
            page_size: default_page_size(),
            default_sort: None,
            name: None,
            email: None,
            discard_stale_responses: false,
            slow_action_threshold: Duration::from_millis(default_slow_action_threshold_ms()),
            log_level: LevelFilter::Info,
            file_path: None,
        }
    }

    /// Try to load an existing configuration from the disk using the custom
    /// directory if provided. A missing file leaves the defaults in place;
    /// the path is remembered for a later `save`.
    ///
    pub fn load(&mut self, custom_path: Option<&str>) -> Result<(), ConfigError> {
        // Use default path unless custom path provided
        let dir_path = match custom_path {
            Some(path) => Path::new(&path).to_path_buf(),
            None => Config::default_path()?,
        };
        let file_path = dir_path.join(Path::new(FILE_NAME));

        if file_path.exists() {
            let contents = fs::read_to_string(&file_path).map_err(|e| ConfigError::LoadFailed {
                path: file_path.clone(),
                message: format!("IO error: {}", e),
            })?;
            let data: FileSpec = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::DeserializationFailed(e.to_string()))?;
            self.apply(data)?;
        }

        self.file_path = Some(file_path);
        Ok(())
    }

    /// Save the current configuration to disk.
    ///
    pub fn save(&self) -> Result<(), ConfigError> {
        let file_path = self.file_path.as_ref().ok_or(ConfigError::FilePathNotSet)?;
        let content = serde_yaml::to_string(&self.file_spec())
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirectoryFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut file = fs::File::create(file_path).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        write!(file, "{}", content).map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        file.flush().map_err(|e| ConfigError::SaveFailed {
            path: file_path.clone(),
            source: e,
        })?;
        Ok(())
    }

    /// Store the given credentials and write the configuration back to disk.
    ///
    pub fn save_credentials(
        &mut self,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), ConfigError> {
        if let Some(name) = name {
            self.name = Some(name.to_owned());
        }
        if let Some(email) = email {
            self.email = Some(email.to_owned());
        }
        self.save()
    }

    /// Returns the file the configuration was loaded from or will be saved to.
    ///
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Returns both credentials when they are configured.
    ///
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.name, &self.email) {
            (Some(name), Some(email)) => Some((name.as_str(), email.as_str())),
            _ => None,
        }
    }

    fn apply(&mut self, data: FileSpec) -> Result<(), ConfigError> {
        if data.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "page_size",
                message: "must be positive".to_string(),
            });
        }
        let default_sort = data
            .default_sort
            .map(|sort| sort.parse::<SortOption>())
            .transpose()
            .map_err(|e| ConfigError::InvalidValue {
                key: "default_sort",
                message: e.to_string(),
            })?;
        let log_level = data
            .log_level
            .parse::<LevelFilter>()
            .map_err(|e| ConfigError::InvalidValue {
                key: "log_level",
                message: e.to_string(),
            })?;

        self.base_url = data.base_url;
        self.page_size = data.page_size;
        self.default_sort = default_sort;
        self.name = data.name;
        self.email = data.email;
        self.discard_stale_responses = data.discard_stale_responses;
        self.slow_action_threshold = Duration::from_millis(data.slow_action_threshold_ms);
        self.log_level = log_level;
        Ok(())
    }

    fn file_spec(&self) -> FileSpec {
        FileSpec {
            base_url: self.base_url.clone(),
            page_size: self.page_size,
            default_sort: self.default_sort.as_ref().map(ToString::to_string),
            name: self.name.clone(),
            email: self.email.clone(),
            discard_stale_responses: self.discard_stale_responses,
            slow_action_threshold_ms: self.slow_action_threshold.as_millis() as u64,
            log_level: self.log_level.to_string().to_lowercase(),
        }
    }

    /// Returns the path buffer for the default configuration directory or
    /// an error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, ConfigError> {
        match dirs::home_dir() {
            Some(home) => {
                let home_path = Path::new(&home);
                let default_config_path = Path::new(DEFAULT_DIRECTORY_PATH);
                Ok(home_path.join(default_config_path))
            }
            None => Err(ConfigError::HomeDirectoryNotFound),
        }
    }
}
