//! Scene Settings
//!
//! Tunables for a [`Scene`](crate::Scene). All fields have defaults, so a
//! settings file only needs to mention what it changes:
//!
//! ```rust,ignore
//! let settings = SceneSettings::from_json_str(r#"{ "trace_dispatch": true }"#)?;
//! let scene = Scene::with_settings(settings)?;
//!
//! let settings = SceneSettings {
//!     name_prefix: "Entity".into(),
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SceneError};

/// Configuration of a scene instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Prefix of default node names, which read `{prefix}_{id}`.
    pub name_prefix: String,

    /// Log every signal dispatch at `trace` level.
    pub trace_dispatch: bool,

    /// A propagation touching more nodes than this logs a warning.
    pub propagation_warn_threshold: usize,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            name_prefix: "Node".to_owned(),
            trace_dispatch: false,
            propagation_warn_threshold: 10_000,
        }
    }
}

impl SceneSettings {
    /// Parses settings from JSON and validates them.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name_prefix.trim().is_empty() {
            return Err(SceneError::InvalidSettings(
                "name_prefix must not be empty".to_owned(),
            ));
        }
        if self.propagation_warn_threshold == 0 {
            return Err(SceneError::InvalidSettings(
                "propagation_warn_threshold must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}
