use std::fs::read_to_string;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::forecast::{ForecastConfig, ForecastConfigError};

pub const DEFAULT_DEV_SERVER_URL: &str = "http://localhost:5173";
pub const CONTAINER_DEV_SERVER_URL: &str = "http://client:5173";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file format")]
    DecodingError {
        #[from]
        source: toml::de::Error,
    },
    #[error("invalid forecast settings")]
    InvalidForecast {
        #[from]
        source: ForecastConfigError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        CorsConfig {
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://client:5173".to_string(),
                "http://localhost:3000".to_string(),
                "http://localhost:4173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpaConfig {
    pub assets_dir: PathBuf,
    pub dev_server_url: Option<String>,
}

impl Default for SpaConfig {
    fn default() -> Self {
        SpaConfig {
            assets_dir: PathBuf::from("assets"),
            dev_server_url: None,
        }
    }
}

impl SpaConfig {
    /// The development server to proxy to. An explicit setting wins, otherwise
    /// the container network name is used when running inside a container.
    pub fn resolve_dev_server_url(&self, running_in_container: bool) -> String {
        match &self.dev_server_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if running_in_container => CONTAINER_DEV_SERVER_URL.to_string(),
            None => DEFAULT_DEV_SERVER_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub forecast: ForecastConfig,
    pub cors: CorsConfig,
    pub spa: SpaConfig,
}

impl HostConfig {
    pub fn from_toml(contents: &str) -> Result<HostConfig, ConfigError> {
        let config: HostConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the config file at `path`. A file that does not exist gives the
    /// defaults.
    pub fn load(path: &Path) -> Result<HostConfig, ConfigError> {
        match read_to_string(path) {
            Ok(contents) => HostConfig::from_toml(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("no config file at {}, using defaults", path.display());
                Ok(HostConfig::default())
            }
            Err(source) => Err(ConfigError::IoError {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.forecast.validate()?;
        Ok(())
    }
}

pub fn running_in_container() -> bool {
    std::env::var("RUNNING_IN_CONTAINER").is_ok_and(|value| value == "true")
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HostConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.forecast.min_temperature_c, -20);
        assert_eq!(config.forecast.max_temperature_c, 54);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[forecast]\nmax_temperature_c = 30").unwrap();
        let config = HostConfig::load(file.path()).unwrap();
        assert_eq!(config.forecast.min_temperature_c, -20);
        assert_eq!(config.forecast.max_temperature_c, 30);
        assert_eq!(config.cors, CorsConfig::default());
        assert_eq!(config.spa.assets_dir, PathBuf::from("assets"));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let result =
            HostConfig::from_toml("[forecast]\nmin_temperature_c = 10\nmax_temperature_c = 0");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidForecast {
                source: ForecastConfigError::InvertedTemperatureRange { min: 10, max: 0 }
            })
        ));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            HostConfig::from_toml("[forecast\n"),
            Err(ConfigError::DecodingError { .. })
        ));
    }

    #[test]
    fn test_dev_server_url_resolution() {
        let mut spa = SpaConfig::default();
        assert_eq!(spa.resolve_dev_server_url(false), "http://localhost:5173");
        assert_eq!(spa.resolve_dev_server_url(true), "http://client:5173");
        spa.dev_server_url = Some("http://vite:8080/".to_string());
        assert_eq!(spa.resolve_dev_server_url(true), "http://vite:8080");
    }
}
