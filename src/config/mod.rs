use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{app_data_dir, config_file_in, session_file_in, tmp_path, users_dir_in},
    errors::StoreError,
    utils::DEFAULT_LOG_FILTER,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub log_filter: String,
    pub salary_cycle_days: i64,
    pub category_min_len: usize,
    pub category_max_len: usize,
    pub currency_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_filter: DEFAULT_LOG_FILTER.into(),
            salary_cycle_days: 30,
            category_min_len: 3,
            category_max_len: 50,
            currency_label: "Rs".into(),
        }
    }
}

impl Config {
    fn validate(&self) -> Result<(), StoreError> {
        if self.salary_cycle_days <= 0 {
            return Err(StoreError::Config(
                "salary_cycle_days must be positive".into(),
            ));
        }
        if self.category_min_len > self.category_max_len {
            return Err(StoreError::Config(
                "category_min_len must not exceed category_max_len".into(),
            ));
        }
        Ok(())
    }
}

/// Resolves the data directory layout and persists [`Config`].
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, StoreError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, StoreError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)
            .map_err(|err| StoreError::Config(format!("{}: {}", self.path.display(), err)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), StoreError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data directory for `config`, falling back to the manager's base directory.
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config.data_dir.clone().unwrap_or_else(|| self.base.clone())
    }

    pub fn users_dir(&self, config: &Config) -> PathBuf {
        users_dir_in(&self.data_dir(config))
    }

    pub fn session_file(&self, config: &Config) -> PathBuf {
        session_file_in(&self.data_dir(config))
    }
}
