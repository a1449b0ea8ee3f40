use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::clock::DEFAULT_START_SECONDS;
use crate::command::{Ticks, DEFAULT_WAIT_SECONDS};
use crate::world::{Inn, Npc};

pub const CONFIG_ENV_VAR: &str = "CHRONOS_CONFIG";
pub const DEFAULT_PATRON_VISIT_SECONDS: Ticks = 30 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config at {field}: {message}")]
    Validation { field: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatronArrival {
    pub name: String,
    pub far_description: String,
    pub near_description: String,
    #[serde(default)]
    pub arrive_after: Ticks,
}

impl PatronArrival {
    pub fn npc(&self) -> Npc {
        Npc::new(
            self.name.clone(),
            self.far_description.clone(),
            self.near_description.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub clock_start_seconds: Ticks,
    pub default_wait_seconds: Ticks,
    pub patron_visit_seconds: Ticks,
    pub inn_name: String,
    pub innkeeper: String,
    pub inn_description: String,
    pub patrons: Vec<PatronArrival>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            clock_start_seconds: DEFAULT_START_SECONDS,
            default_wait_seconds: DEFAULT_WAIT_SECONDS,
            patron_visit_seconds: DEFAULT_PATRON_VISIT_SECONDS,
            inn_name: "Ugly Ogre Inn".to_string(),
            innkeeper: "Bork".to_string(),
            inn_description: "A darkened and smokey room, crowded with travellers.".to_string(),
            patrons: vec![
                PatronArrival {
                    name: "Galadriel".to_string(),
                    far_description: "A tall, slender elf in a shimmering grey cloak.".to_string(),
                    near_description: "Her grey eyes study you without blinking.".to_string(),
                    arrive_after: 10 * 60,
                },
                PatronArrival {
                    name: "Falsoon".to_string(),
                    far_description: "A burly fighter with a battered shield.".to_string(),
                    near_description: "His knuckles are scarred and his breath smells of ale."
                        .to_string(),
                    arrive_after: 45 * 60,
                },
            ],
        }
    }
}

impl GameConfig {
    pub fn build_inn(&self) -> Inn {
        Inn::new(
            self.inn_name.clone(),
            self.innkeeper.clone(),
            self.inn_description.clone(),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("clock_start_seconds", self.clock_start_seconds)?;
        non_negative("patron_visit_seconds", self.patron_visit_seconds)?;
        if self.default_wait_seconds <= 0 {
            return Err(validation_err(
                "default_wait_seconds",
                "must be greater than zero",
            ));
        }
        non_empty("inn_name", &self.inn_name)?;
        non_empty("innkeeper", &self.innkeeper)?;

        let mut seen: Vec<String> = Vec::with_capacity(self.patrons.len());
        for (index, patron) in self.patrons.iter().enumerate() {
            non_empty(&format!("patrons[{index}].name"), &patron.name)?;
            non_negative(&format!("patrons[{index}].arrive_after"), patron.arrive_after)?;
            let lower = patron.name.to_ascii_lowercase();
            if seen.contains(&lower) {
                return Err(validation_err(
                    &format!("patrons[{index}].name"),
                    format!("duplicate patron '{}'", patron.name),
                ));
            }
            seen.push(lower);
        }
        Ok(())
    }
}

/// Reads and validates the config at `path`.
pub fn load_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config_json(path, &raw)?;
    config.validate()?;
    info!(
        path = %path.display(),
        patrons = config.patrons.len(),
        "config_loaded"
    );
    Ok(config)
}

/// Loads the file named by `CHRONOS_CONFIG`, or the defaults when it is unset.
pub fn load_config_from_env() -> Result<GameConfig, ConfigError> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(raw) if !raw.is_empty() => load_config(Path::new(&raw)),
        _ => Ok(GameConfig::default()),
    }
}

fn parse_config_json(path: &Path, raw: &str) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer).map_err(|error| {
        let at = error.path().to_string();
        let source = error.into_inner();
        let message = if at.is_empty() || at == "." {
            source.to_string()
        } else {
            format!("at {at}: {source}")
        };
        ConfigError::Parse {
            path: path.to_path_buf(),
            message,
            source,
        }
    })
}

fn validation_err(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.to_string(),
        message: message.into(),
    }
}

fn non_negative(field: &str, value: Ticks) -> Result<(), ConfigError> {
    if value < 0 {
        return Err(validation_err(field, "must not be negative"));
    }
    Ok(())
}

fn non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(validation_err(field, "must not be empty"));
    }
    Ok(())
}
