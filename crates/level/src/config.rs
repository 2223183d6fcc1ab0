use std::path::{Path, PathBuf};

use cavern_collision::{DEFAULT_MAX_BOUNCES, DEFAULT_SKIN_WIDTH};
use cavern_common::CellId;
use cavern_nav::LocateProbe;
use serde::{Deserialize, Serialize};

/// Errors from loading or validating a [`LevelConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for collision and navigation queries on one level.
///
/// Passed in at load time; there is no process-wide setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelConfig {
    /// Slide iterations per movement query.
    pub max_bounces: u32,
    /// Push-out distance beyond the sphere radius after each contact.
    pub skin_width: f32,
    /// Minimum normal Y for a contact to count as floor (and maximum
    /// negated Y for ceiling). Anything between is wall.
    pub floor_normal_y: f32,
    pub locate: LocateProbe,
    /// Cells flagged as obstacles as soon as the level loads.
    pub blocked_cells: Vec<CellId>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            max_bounces: DEFAULT_MAX_BOUNCES,
            skin_width: DEFAULT_SKIN_WIDTH,
            floor_normal_y: 0.7,
            locate: LocateProbe::default(),
            blocked_cells: Vec::new(),
        }
    }
}

impl LevelConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let text = match ext.as_deref() {
            Some("yaml" | "yml" | "json") => std::fs::read_to_string(path)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        let config = if ext.as_deref() == Some("json") {
            Self::from_json_str(&text)?
        } else {
            Self::from_yaml_str(&text)?
        };
        tracing::debug!(path = %path.display(), "loaded level config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.skin_width.is_finite() && self.skin_width >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "skin_width must be a non-negative number, got {}",
                self.skin_width
            )));
        }
        if !(0.0..=1.0).contains(&self.floor_normal_y) {
            return Err(ConfigError::Invalid(format!(
                "floor_normal_y must be within [0, 1], got {}",
                self.floor_normal_y
            )));
        }
        if !(self.locate.height.is_finite() && self.locate.height >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "locate.height must be a non-negative number, got {}",
                self.locate.height
            )));
        }
        if !(self.locate.depth.is_finite() && self.locate.depth > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "locate.depth must be positive, got {}",
                self.locate.depth
            )));
        }
        Ok(())
    }
}
