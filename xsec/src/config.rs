use crate::error::Error;
use arch::FillByte;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// Defaults for every run, read from a YAML file:
///
/// ```yaml
/// autobank: true
/// fill: 0xFF
/// dynamic: 0x720000
/// format: text
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub autobank: bool,
    pub fill: FillByte,
    /// Dynamic base for scripts without `#dynamic`
    pub dynamic: Option<u32>,
    pub format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            autobank: true,
            fill: FillByte::Full,
            dynamic: None,
            format: Format::Text,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| Error::Open(name.clone(), e))?;
        let config: Config =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|e| Error::Config(name, e))?;
        tracing::debug!("config: {config:?}");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config() {
        let config: Config = serde_yaml::from_str("fill: 0\nformat: json\n").unwrap();
        assert_eq!(
            config,
            Config {
                fill: FillByte::Zero,
                format: Format::Json,
                ..Config::default()
            }
        );
    }

    #[test]
    fn dynamic_base() {
        let config: Config = serde_yaml::from_str("autobank: false\ndynamic: 7471104\n").unwrap();
        assert!(!config.autobank);
        assert_eq!(config.dynamic, Some(0x720000));
    }

    #[test]
    fn invalid_fill() {
        assert!(serde_yaml::from_str::<Config>("fill: 18\n").is_err());
    }

    #[test]
    fn no_file() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
