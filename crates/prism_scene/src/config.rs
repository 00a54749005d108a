//! Scene layer configuration.
//!
//! Capacities must match the fixed-size buffers the renderer allocates, so
//! they are decided once when the [`SceneContext`](crate::SceneContext) is
//! built. Loaded from JSON; every field is optional.
//!
//! ```json
//! {
//!   "sphere_capacity": 1024,
//!   "cursor_step": { "mode": "fixed", "step": 3 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sampling::CursorStep;

/// Default live-object limit per registry.
pub const DEFAULT_CAPACITY: usize = 64;

/// Errors that can occur while loading a config.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub sphere_capacity: usize,
    pub box_capacity: usize,
    pub plane_capacity: usize,

    /// Per-frame sample cursor policy
    pub cursor_step: CursorStep,

    /// Rebuild the bounding tree whenever sphere or box geometry changes
    pub build_tree: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            sphere_capacity: DEFAULT_CAPACITY,
            box_capacity: DEFAULT_CAPACITY,
            plane_capacity: DEFAULT_CAPACITY,
            cursor_step: CursorStep::default(),
            build_tree: true,
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (name, capacity) in [
            ("sphere_capacity", self.sphere_capacity),
            ("box_capacity", self.box_capacity),
            ("plane_capacity", self.plane_capacity),
        ] {
            if capacity == 0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }

        match self.cursor_step {
            CursorStep::Fixed { step: 0 } => {
                Err(ConfigError::Invalid("fixed cursor step must be positive".into()))
            }
            CursorStep::TimeScaled { rate } if !(rate.is_finite() && rate > 0.0) => Err(
                ConfigError::Invalid(format!("cursor rate must be positive, got {}", rate)),
            ),
            _ => Ok(()),
        }
    }
}
