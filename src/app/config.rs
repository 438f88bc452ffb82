use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_DATA: &str = "LAUNCHBAR_DATA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_file: Option<PathBuf>,
    pub channel_capacity: usize,
    pub open_externally_on_kill: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            channel_capacity: 100,
            open_externally_on_kill: false,
        }
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    home::home_dir().map(|mut path| {
        path.push(".config");
        path.push("launchbar");
        path.push("config.toml");
        path
    })
}

pub fn default_data_path() -> Option<PathBuf> {
    home::home_dir().map(|mut path| {
        path.push(".launchbar");
        path.push("entries.json");
        path
    })
}

impl Config {
    pub fn load() -> Self {
        get_config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Missing or broken config files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| toml::from_str::<Config>(&content).map_err(|e| e.to_string()))
        {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("ignoring {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// `LAUNCHBAR_DATA` wins over the config file, which wins over the default.
    pub fn data_path(&self) -> Option<PathBuf> {
        std::env::var_os(ENV_DATA)
            .map(PathBuf::from)
            .or_else(|| self.data_file.clone())
            .or_else(default_data_path)
    }
}
