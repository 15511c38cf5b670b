//! Serializable stamp profile.
//!
//! A [`BadgeProfile`] captures what the user typed into the studio so it
//! can be saved, shared between processes or replayed from the CLI.
//!
//! # Example
//!
//! ```
//! use stamp_renderer::BadgeProfile;
//!
//! let profile = BadgeProfile::new("Wellspring", "2009").with_icon(3);
//! let json = profile.to_json().unwrap();
//!
//! let restored = BadgeProfile::from_json(&json).unwrap();
//! assert_eq!(restored.icon, 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::badge::BadgeInput;

fn default_icon() -> u8 {
    1
}

/// Stamp settings in JSON form.
///
/// ```json
/// { "name": "WELLSPRING HÀ NỘI", "year": "2009", "icon": 1, "devicePixelRatio": 2.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct BadgeProfile {
    /// School name, at most 20 characters.
    pub name: String,

    /// Founding year, at most 4 digits.
    pub year: String,

    /// Icon number, 1 to 8.
    #[serde(default = "default_icon")]
    pub icon: u8,

    /// Display density used for the export scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_pixel_ratio: Option<f64>,
}

impl Default for BadgeProfile {
    fn default() -> Self {
        Self::from(&BadgeInput::default())
    }
}

impl From<&BadgeInput> for BadgeProfile {
    fn from(input: &BadgeInput) -> Self {
        Self {
            name: input.name().to_string(),
            year: input.year().to_string(),
            icon: input.icon().get(),
            device_pixel_ratio: None,
        }
    }
}

impl BadgeProfile {
    pub fn new(name: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            year: year.into(),
            icon: default_icon(),
            device_pixel_ratio: None,
        }
    }

    /// Builder method to set the icon.
    pub fn with_icon(mut self, icon: u8) -> Self {
        self.icon = icon;
        self
    }

    /// Builder method to set the display density.
    pub fn with_device_pixel_ratio(mut self, dpr: f64) -> Self {
        self.device_pixel_ratio = Some(dpr);
        self
    }

    /// Serializes to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
