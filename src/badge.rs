//! User-editable badge input.
//!
//! Length limits are enforced at entry: an edit that would exceed a limit
//! is ignored and the previous value is kept, so oversized values never
//! reach rendering or export.

use std::fmt;

use crate::document::is_xml_char;
use crate::error::{BadgeError, Result};

/// Maximum number of characters in the display name.
pub const MAX_NAME_CHARS: usize = 20;

/// Maximum number of digits in the founding year.
pub const MAX_YEAR_DIGITS: usize = 4;

/// Number of selectable icons.
pub const ICON_COUNT: u8 = 8;

// ============================================================================
// IconIndex
// ============================================================================

/// One of the [`ICON_COUNT`] selectable icons, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IconIndex(u8);

impl IconIndex {
    /// The first icon.
    pub const FIRST: Self = Self(1);

    /// Returns `None` unless `index` is in `1..=ICON_COUNT`.
    pub fn new(index: u8) -> Option<Self> {
        (1..=ICON_COUNT).contains(&index).then_some(Self(index))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All icons in display order.
    pub fn all() -> impl Iterator<Item = IconIndex> {
        (1..=ICON_COUNT).map(Self)
    }
}

impl Default for IconIndex {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for IconIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// BadgeInput
// ============================================================================

/// The name, founding year and icon a stamp is rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeInput {
    name: String,
    year: String,
    icon: IconIndex,
}

impl Default for BadgeInput {
    fn default() -> Self {
        Self {
            name: "WELLSPRING HÀ NỘI".to_string(),
            year: "2009".to_string(),
            icon: IconIndex::FIRST,
        }
    }
}

impl BadgeInput {
    /// Creates an input, rejecting values that the entry limits would refuse.
    pub fn new(name: impl Into<String>, year: impl Into<String>, icon: u8) -> Result<Self> {
        let name = name.into();
        let year = year.into();
        if !is_valid_name(&name) {
            return Err(BadgeError::InvalidInput(format!(
                "name must be at most {MAX_NAME_CHARS} printable characters"
            )));
        }
        if !is_valid_year(&year) {
            return Err(BadgeError::InvalidInput(format!(
                "year must be at most {MAX_YEAR_DIGITS} digits"
            )));
        }
        let icon = IconIndex::new(icon).ok_or_else(|| {
            BadgeError::InvalidInput(format!("icon must be between 1 and {ICON_COUNT}"))
        })?;
        Ok(Self { name, year, icon })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn icon(&self) -> IconIndex {
        self.icon
    }

    /// Replaces the name. Returns false (and keeps the old name) if the
    /// new value is longer than [`MAX_NAME_CHARS`] or holds a character
    /// that cannot appear in the drawing.
    pub fn set_name(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if !is_valid_name(&value) {
            return false;
        }
        self.name = value;
        true
    }

    /// Replaces the founding year. Returns false (and keeps the old year)
    /// if the value is not at most [`MAX_YEAR_DIGITS`] ASCII digits.
    pub fn set_year(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if !is_valid_year(&value) {
            return false;
        }
        self.year = value;
        true
    }

    /// Selects an icon by number. Returns false for out-of-range numbers.
    pub fn select_icon(&mut self, index: u8) -> bool {
        match IconIndex::new(index) {
            Some(icon) => {
                self.icon = icon;
                true
            }
            None => false,
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    name.chars().count() <= MAX_NAME_CHARS && name.chars().all(is_xml_char)
}

fn is_valid_year(year: &str) -> bool {
    year.len() <= MAX_YEAR_DIGITS && year.bytes().all(|b| b.is_ascii_digit())
}
