//! Age-band classification.
//!
//! The band picks the badge colour theme from the number of years elapsed
//! since the founding year. Input is never rejected here: an empty or
//! non-numeric year counts as "founded this year" and a future year clamps
//! to zero elapsed years.

use chrono::{Datelike, Local};

/// Years elapsed up to and including this value map to [`AgeBand::Band1`].
pub const BAND1_MAX_YEARS: i32 = 3;

/// Years elapsed up to and including this value map to [`AgeBand::Band2`].
pub const BAND2_MAX_YEARS: i32 = 5;

/// A colour tier selected by elapsed years since the founding year.
///
/// Ordered by age: `Band1 < Band2 < Band3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeBand {
    /// Up to 3 years.
    Band1,
    /// 4 or 5 years.
    Band2,
    /// More than 5 years.
    Band3,
}

impl AgeBand {
    /// All bands in ascending order.
    pub const ALL: [AgeBand; 3] = [AgeBand::Band1, AgeBand::Band2, AgeBand::Band3];

    /// Classifies a founding year against the given current year.
    ///
    /// # Example
    ///
    /// ```
    /// use stamp_renderer::AgeBand;
    ///
    /// assert_eq!(AgeBand::classify("2009", 2025), AgeBand::Band3);
    /// assert_eq!(AgeBand::classify("abc", 2025), AgeBand::Band1);
    /// ```
    pub fn classify(year: &str, current_year: i32) -> Self {
        Self::from_elapsed(elapsed_years(year, current_year))
    }

    /// Classifies a founding year against the wall-clock year.
    pub fn classify_now(year: &str) -> Self {
        Self::classify(year, current_year())
    }

    /// Maps a non-negative number of elapsed years onto a band.
    pub fn from_elapsed(diff: i32) -> Self {
        if diff <= BAND1_MAX_YEARS {
            AgeBand::Band1
        } else if diff <= BAND2_MAX_YEARS {
            AgeBand::Band2
        } else {
            AgeBand::Band3
        }
    }

    /// The numeric band id used in asset names (`1`, `2` or `3`).
    pub fn id(self) -> u8 {
        match self {
            AgeBand::Band1 => 1,
            AgeBand::Band2 => 2,
            AgeBand::Band3 => 3,
        }
    }
}

/// Returns `max(0, current_year - year)`, treating an unparseable year as
/// the current year.
pub fn elapsed_years(year: &str, current_year: i32) -> i32 {
    let parsed = year.trim().parse::<i32>().unwrap_or(current_year);
    current_year.saturating_sub(parsed).max(0)
}

/// The current local calendar year.
pub fn current_year() -> i32 {
    Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_years_fall_back_to_band1() {
        assert_eq!(AgeBand::classify("", 2025), AgeBand::Band1);
        assert_eq!(AgeBand::classify("abc", 2025), AgeBand::Band1);
        assert_eq!(AgeBand::classify("2025", 2025), AgeBand::Band1);
        assert_eq!(elapsed_years("abc", 2025), 0);
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(AgeBand::classify("2022", 2025), AgeBand::Band1);
        assert_eq!(AgeBand::classify("2021", 2025), AgeBand::Band2);
        assert_eq!(AgeBand::classify("2020", 2025), AgeBand::Band2);
        assert_eq!(AgeBand::classify("2019", 2025), AgeBand::Band3);
    }

    #[test]
    fn future_year_clamps_to_zero() {
        assert_eq!(elapsed_years("2030", 2025), 0);
        assert_eq!(AgeBand::classify("2030", 2025), AgeBand::Band1);
    }

    #[test]
    fn wellspring_founding_year_is_band3() {
        assert_eq!(elapsed_years("2009", 2025), 16);
        assert_eq!(AgeBand::classify("2009", 2025), AgeBand::Band3);
    }

    #[test]
    fn more_recent_years_never_rank_higher() {
        let current = 2025;
        let mut previous = AgeBand::Band3;
        for year in 1990..=2030 {
            let band = AgeBand::classify(&year.to_string(), current);
            assert!(band <= previous, "{year} mapped to {band:?} after {previous:?}");
            previous = band;
        }
    }

    #[test]
    fn band_ids() {
        let ids: Vec<u8> = AgeBand::ALL.iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
