//! Configuration for decoding and logging
//!
//! Defaults work out of the box. Values can be overridden from the
//! environment (`RIAK_*`) or loaded from a TOML file; either way the result
//! is validated before use.

use crate::core_crdt::converter::{MapConverter, DEFAULT_MAX_MAP_DEPTH, MAX_SUPPORTED_MAP_DEPTH};
use crate::core_crdt::response::{DtFetchConverter, DtUpdateConverter};
use crate::core_proto::message::DEFAULT_MAX_FRAME_SIZE;
use crate::logging::{LogConfig, LogLevel};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

mod error;

pub use error::ConfigError;

pub const ENV_MAX_FRAME_SIZE: &str = "RIAK_DECODE_MAX_FRAME_SIZE";
pub const ENV_MAX_MAP_DEPTH: &str = "RIAK_DECODE_MAX_MAP_DEPTH";
pub const ENV_LOG_LEVEL: &str = "RIAK_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "RIAK_LOG_JSON";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decode: DecodeConfig,
    pub logging: LogConfig,
}

/// Limits applied while decoding responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Largest frame accepted by `ProtocolMessage::decode_frame`
    pub max_frame_size: usize,

    /// Deepest map nesting accepted by the parser and MapConverter
    pub max_map_depth: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            max_map_depth: DEFAULT_MAX_MAP_DEPTH,
        }
    }
}

impl DecodeConfig {
    pub fn fetch_converter(&self) -> DtFetchConverter {
        DtFetchConverter::with_max_depth(self.max_map_depth)
    }

    pub fn update_converter(&self) -> DtUpdateConverter {
        DtUpdateConverter::new().with_max_depth(self.max_map_depth)
    }

    pub fn map_converter(&self) -> MapConverter {
        MapConverter::with_max_depth(self.max_map_depth)
    }
}

fn env_value<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidEnv { var, reason: e.to_string() }),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Defaults overridden by `RIAK_DECODE_MAX_FRAME_SIZE`,
    /// `RIAK_DECODE_MAX_MAP_DEPTH`, `RIAK_LOG_LEVEL` and `RIAK_LOG_JSON`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(size) = env_value(ENV_MAX_FRAME_SIZE)? {
            config.decode.max_frame_size = size;
        }
        if let Some(depth) = env_value(ENV_MAX_MAP_DEPTH)? {
            config.decode.max_map_depth = depth;
        }
        if let Some(level) = env_value::<LogLevel>(ENV_LOG_LEVEL)? {
            config.logging.level = level;
        }
        if let Some(json) = env_value(ENV_LOG_JSON)? {
            config.logging.json_format = json;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file; missing keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::FileRead { path: path.to_path_buf(), source })?;

        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|source| ConfigError::FileWrite { path: path.to_path_buf(), source })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decode.max_frame_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_frame_size must be greater than 0".to_string(),
            ));
        }

        if self.decode.max_frame_size > u32::MAX as usize {
            return Err(ConfigError::ValidationFailed(format!(
                "max_frame_size must fit the 32-bit length prefix, got {}",
                self.decode.max_frame_size
            )));
        }

        if self.decode.max_map_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_map_depth must be greater than 0".to_string(),
            ));
        }

        if self.decode.max_map_depth > MAX_SUPPORTED_MAP_DEPTH {
            return Err(ConfigError::ValidationFailed(format!(
                "max_map_depth must be at most {}, got {}",
                MAX_SUPPORTED_MAP_DEPTH, self.decode.max_map_depth
            )));
        }

        Ok(())
    }
}
