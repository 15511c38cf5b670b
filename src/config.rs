//! Studio configuration file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BadgeError, Result};

pub const DEFAULT_FONT_FAMILY: &str = "Mulish, Arial, Helvetica, sans-serif";

/// Environment settings for a [`BadgeStudio`](crate::BadgeStudio).
///
/// Every field is optional in the JSON form:
///
/// ```json
/// {
///   "assetsDir": "public",
///   "outputDir": "out",
///   "devicePixelRatio": 2.0,
///   "currentYear": 2025,
///   "fontDirs": ["fonts"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct StudioConfig {
    /// Root the `stamp/...` asset paths are resolved against.
    pub assets_dir: PathBuf,
    /// Directory exported files are written to.
    pub output_dir: PathBuf,
    pub device_pixel_ratio: f64,
    /// Fixed "now" for band classification. `None` reads the clock.
    pub current_year: Option<i32>,
    pub font_family: String,
    /// Extra directories scanned for fonts, on top of system fonts.
    pub font_dirs: Vec<PathBuf>,
    /// Prefer opening a viewer over saving when falling back to SVG.
    pub restricted_context: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("public"),
            output_dir: PathBuf::from("."),
            device_pixel_ratio: 1.0,
            current_year: None,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_dirs: Vec::new(),
            restricted_context: false,
        }
    }
}

impl StudioConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Reads a config file, or returns the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<StudioConfig> {
    let Some(path) = path else {
        return Ok(StudioConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| BadgeError::io(path, e))?;
    let config = StudioConfig::from_json(&text)?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}
