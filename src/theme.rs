//! Compiled-in colour themes, one per [`AgeBand`].

use std::str::FromStr;

use palette::{LinSrgb, Mix, Srgb};

use crate::band::AgeBand;

// ============================================================================
// GradientStop
// ============================================================================

/// A single stop of the ring border gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, in percent (0-100).
    pub offset: f32,
    /// Hex colour, e.g. `#AA7D5A`.
    pub color: &'static str,
}

const fn stop(offset: f32, color: &'static str) -> GradientStop {
    GradientStop { offset, color }
}

// ============================================================================
// Theme
// ============================================================================

/// Visual theme of a stamp for one age band.
///
/// Themes are static constants; use [`Theme::for_band`] to look one up.
#[derive(Debug, PartialEq)]
pub struct Theme {
    pub band: AgeBand,
    /// Display label of the band.
    pub label: &'static str,
    /// Asset path of the centre logo.
    pub logo: &'static str,
    /// Fill colour of the curved name and caption text.
    pub text_color: &'static str,
    /// Start colour used when a gradient has no explicit stops.
    pub stroke_start: &'static str,
    /// End colour used when a gradient has no explicit stops.
    pub stroke_end: &'static str,
    /// Ordered ring border gradient, left to right.
    pub gradient_stops: &'static [GradientStop],
}

pub static BAND1_THEME: Theme = Theme {
    band: AgeBand::Band1,
    label: "Mốc 1",
    logo: "stamp/logo-1.png",
    text_color: "#75492E",
    stroke_start: "#F05023",
    stroke_end: "#1F3A93",
    gradient_stops: &[
        stop(0.0, "#220600"),
        stop(37.0, "#AA7D5A"),
        stop(47.0, "#FAC2A7"),
        stop(58.0, "#FAC2A7"),
        stop(70.0, "#B17B60"),
        stop(79.0, "#75492E"),
        stop(100.0, "#3C1401"),
    ],
};

pub static BAND2_THEME: Theme = Theme {
    band: AgeBand::Band2,
    label: "Mốc 2",
    logo: "stamp/logo-2.png",
    text_color: "#979DA1",
    stroke_start: "#24C6DC",
    stroke_end: "#514A9D",
    gradient_stops: &[
        stop(0.0, "#CBD1D6"),
        stop(9.0, "#C7CDD2"),
        stop(17.0, "#BCC2C7"),
        stop(25.0, "#AAB1B5"),
        stop(29.0, "#CAD1D4"),
        stop(33.0, "#E1E8EB"),
        stop(37.0, "#EFF6F9"),
        stop(40.0, "#F4FBFE"),
        stop(55.0, "#B0B7BC"),
        stop(58.0, "#A9B0B4"),
        stop(68.0, "#9BA1A6"),
        stop(100.0, "#9BA1A6"),
    ],
};

pub static BAND3_THEME: Theme = Theme {
    band: AgeBand::Band3,
    label: "Mốc 3",
    logo: "stamp/logo-3.png",
    text_color: "#B57900",
    stroke_start: "#FF5A3C",
    stroke_end: "#FFD166",
    gradient_stops: &[
        stop(0.0, "#F7D864"),
        stop(21.0, "#C69119"),
        stop(46.0, "#D5A731"),
        stop(54.0, "#E5BE49"),
        stop(63.0, "#F0CE59"),
        stop(72.0, "#F6D763"),
        stop(84.0, "#F9DB67"),
        stop(100.0, "#EDCA56"),
    ],
};

impl Theme {
    /// Returns the theme for the given band.
    pub fn for_band(band: AgeBand) -> &'static Theme {
        match band {
            AgeBand::Band1 => &BAND1_THEME,
            AgeBand::Band2 => &BAND2_THEME,
            AgeBand::Band3 => &BAND3_THEME,
        }
    }

    /// The gradient stops to paint, falling back to a two-stop
    /// `stroke_start -> stroke_end` gradient when none are defined.
    pub fn effective_stops(&self) -> Vec<GradientStop> {
        if self.gradient_stops.is_empty() {
            vec![stop(0.0, self.stroke_start), stop(100.0, self.stroke_end)]
        } else {
            self.gradient_stops.to_vec()
        }
    }

    /// Samples the ring gradient at `offset` percent.
    ///
    /// Colours are mixed in linear light between the two surrounding stops.
    /// Returns `None` if a stop colour is not valid hex.
    pub fn sample(&self, offset: f32) -> Option<String> {
        let stops = self.effective_stops();
        let offset = offset.clamp(0.0, 100.0);

        let upper = stops
            .iter()
            .position(|s| s.offset >= offset)
            .unwrap_or(stops.len() - 1);
        let lower = upper.saturating_sub(1);
        let (a, b) = (stops[lower], stops[upper]);

        let from = parse_hex(a.color)?;
        let to = parse_hex(b.color)?;
        let span = b.offset - a.offset;
        let t = if span <= f32::EPSILON {
            1.0
        } else {
            (offset - a.offset) / span
        };

        let from: LinSrgb = from.into_format::<f32>().into_linear();
        let to: LinSrgb = to.into_format::<f32>().into_linear();
        let mixed = Srgb::<f32>::from_linear(from.mix(to, t)).into_format::<u8>();
        Some(to_hex(mixed))
    }
}

/// Parses a `#RRGGBB` colour.
pub fn parse_hex(color: &str) -> Option<Srgb<u8>> {
    Srgb::<u8>::from_str(color).ok()
}

fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", color.red, color.green, color.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_band_has_a_theme() {
        for band in AgeBand::ALL {
            let theme = Theme::for_band(band);
            assert_eq!(theme.band, band);
            assert_eq!(theme.logo, format!("stamp/logo-{}.png", band.id()));
        }
    }

    #[test]
    fn text_colors_are_fixed_per_band() {
        assert_eq!(Theme::for_band(AgeBand::Band1).text_color, "#75492E");
        assert_eq!(Theme::for_band(AgeBand::Band2).text_color, "#979DA1");
        assert_eq!(Theme::for_band(AgeBand::Band3).text_color, "#B57900");
    }

    #[test]
    fn stops_are_ordered_and_parse() {
        for band in AgeBand::ALL {
            let theme = Theme::for_band(band);
            let stops = theme.effective_stops();
            assert_eq!(stops.first().unwrap().offset, 0.0);
            assert_eq!(stops.last().unwrap().offset, 100.0);
            assert!(stops.windows(2).all(|w| w[0].offset <= w[1].offset));
            for s in &stops {
                assert!(parse_hex(s.color).is_some(), "bad colour {}", s.color);
            }
        }
    }

    #[test]
    fn sample_hits_stop_colors_exactly() {
        let theme = Theme::for_band(AgeBand::Band1);
        assert_eq!(theme.sample(0.0).as_deref(), Some("#220600"));
        assert_eq!(theme.sample(50.0).as_deref(), Some("#FAC2A7"));
        assert_eq!(theme.sample(100.0).as_deref(), Some("#3C1401"));
    }

    #[test]
    fn sample_between_stops_stays_between() {
        let theme = Theme::for_band(AgeBand::Band3);
        let mid = parse_hex(&theme.sample(10.0).unwrap()).unwrap();
        // Between #F7D864 and #C69119 every channel lies inside the range.
        assert!(mid.red <= 0xF7 && mid.red >= 0xC6);
        assert!(mid.green <= 0xD8 && mid.green >= 0x91);
        assert!(mid.blue <= 0x64 && mid.blue >= 0x19);
    }
}
