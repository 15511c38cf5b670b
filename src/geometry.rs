//! Ring geometry of the stamp badge.
//!
//! Everything here is a pure function of [`GeometryConstants`]: building the
//! geometry twice with the same constants yields identical path strings and
//! dash parameters.

use std::f64::consts::PI;

// ============================================================================
// GeometryConstants
// ============================================================================

/// Fixed dimensions the ring geometry is derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConstants {
    /// Width and height of the square canvas, in logical units.
    pub size: f64,
    /// Radius of the solid outer ring.
    pub outer_radius: f64,
    /// Radius of the dashed inner ring.
    pub inner_radius: f64,
    /// How far the text baseline is pulled in from the ring midpoint.
    pub text_inset: f64,
    /// Extra radius of the caption arc relative to the text baseline.
    pub caption_extra: f64,
    /// Angular width of each inner ring gap.
    pub gap_degrees: f64,
    /// Angle from the path start at which the first gap is centred.
    pub break_degrees: f64,
}

impl Default for GeometryConstants {
    fn default() -> Self {
        Self {
            size: 584.0,
            outer_radius: 250.0,
            inner_radius: 200.0,
            text_inset: 12.0,
            caption_extra: 20.0,
            gap_degrees: 30.0,
            break_degrees: 290.0,
        }
    }
}

// ============================================================================
// DashPattern
// ============================================================================

/// Two-gap dash pattern for the inner ring.
///
/// One `[segment, gap]` period spans half the circumference, so the ring
/// shows exactly two gaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashPattern {
    pub circumference: f64,
    pub segment: f64,
    pub gap: f64,
    /// Shift of the pattern along the path, normalised into `[0, circumference)`.
    pub offset: f64,
}

impl DashPattern {
    /// Solves the pattern so the first gap is centred at `break_degrees`.
    pub fn two_gaps(radius: f64, gap_degrees: f64, break_degrees: f64) -> Self {
        let circumference = 2.0 * PI * radius;
        let gap = circumference * (gap_degrees / 360.0);
        let segment = circumference / 2.0 - gap;

        let desired_center = circumference * (break_degrees / 360.0);
        let first_gap_center = segment + gap / 2.0;
        let offset = (desired_center - first_gap_center).rem_euclid(circumference);

        Self {
            circumference,
            segment,
            gap,
            offset,
        }
    }

    /// Length of one repeating `[segment, gap]` period.
    pub fn period(&self) -> f64 {
        self.segment + self.gap
    }

    /// Value for the `stroke-dasharray` attribute.
    pub fn dasharray(&self) -> String {
        format!("{} {}", self.segment, self.gap)
    }

    /// Arc length from the path start to the centre of the first gap.
    pub fn first_gap_center(&self) -> f64 {
        (self.segment + self.gap / 2.0 + self.offset).rem_euclid(self.circumference)
    }

    /// [`first_gap_center`](Self::first_gap_center) converted to degrees.
    pub fn first_gap_center_degrees(&self) -> f64 {
        self.first_gap_center() / self.circumference * 360.0
    }
}

// ============================================================================
// RingGeometry
// ============================================================================

/// Derived circle, arc and dash geometry for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RingGeometry {
    pub size: f64,
    pub cx: f64,
    pub cy: f64,
    pub outer_radius: f64,
    pub inner_radius: f64,
    /// Baseline radius of the name text.
    pub text_radius: f64,
    /// Baseline radius of the "Since" caption.
    pub caption_radius: f64,
    /// Clockwise circle at `text_radius`, used for upper-arc text.
    pub circle: String,
    /// Counter-clockwise circle at `text_radius`; keeps lower-arc glyphs upright.
    pub circle_reverse: String,
    /// Counter-clockwise circle at `caption_radius`.
    pub circle_reverse_caption: String,
    pub inner_dash: DashPattern,
}

impl RingGeometry {
    /// Builds the geometry with the default stamp constants.
    pub fn new() -> Self {
        Self::with_constants(GeometryConstants::default())
    }

    pub fn with_constants(c: GeometryConstants) -> Self {
        let cx = c.size / 2.0;
        let cy = c.size / 2.0;
        let text_radius = (c.outer_radius + c.inner_radius) / 2.0 - c.text_inset;
        let caption_radius = text_radius + c.caption_extra;

        Self {
            size: c.size,
            cx,
            cy,
            outer_radius: c.outer_radius,
            inner_radius: c.inner_radius,
            text_radius,
            caption_radius,
            circle: circle_path(cx, cy, text_radius),
            circle_reverse: reverse_circle_path(cx, cy, text_radius),
            circle_reverse_caption: reverse_circle_path(cx, cy, caption_radius),
            inner_dash: DashPattern::two_gaps(c.inner_radius, c.gap_degrees, c.break_degrees),
        }
    }
}

impl Default for RingGeometry {
    fn default() -> Self {
        Self::new()
    }
}

/// Full circle starting at the left-most point, drawn with the positive
/// sweep flag.
fn circle_path(cx: f64, cy: f64, r: f64) -> String {
    format!(
        "M {cx},{cy} m -{r},0 a {r},{r} 0 1,1 {d},0 a {r},{r} 0 1,1 -{d},0",
        d = r * 2.0
    )
}

/// Full circle starting at the right-most point, drawn with the negative
/// sweep flag.
fn reverse_circle_path(cx: f64, cy: f64, r: f64) -> String {
    format!(
        "M {cx},{cy} m {r},0 a {r},{r} 0 1,0 -{d},0 a {r},{r} 0 1,0 {d},0",
        d = r * 2.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn default_radii() {
        let g = RingGeometry::new();
        assert_eq!(g.cx, 292.0);
        assert_eq!(g.cy, 292.0);
        assert_eq!(g.text_radius, 213.0);
        assert_eq!(g.caption_radius, 233.0);
    }

    #[test]
    fn path_strings() {
        let g = RingGeometry::new();
        assert_eq!(
            g.circle,
            "M 292,292 m -213,0 a 213,213 0 1,1 426,0 a 213,213 0 1,1 -426,0"
        );
        assert_eq!(
            g.circle_reverse,
            "M 292,292 m 213,0 a 213,213 0 1,0 -426,0 a 213,213 0 1,0 426,0"
        );
        assert_eq!(
            g.circle_reverse_caption,
            "M 292,292 m 233,0 a 233,233 0 1,0 -466,0 a 233,233 0 1,0 466,0"
        );
    }

    #[test]
    fn first_gap_is_centred_at_break_angle() {
        let dash = RingGeometry::new().inner_dash;

        // Recompute from scratch: arc length -> angle.
        let c = 2.0 * PI * 200.0;
        assert!((dash.circumference - c).abs() < EPS);
        let center = (dash.segment + dash.gap / 2.0 + dash.offset) % c;
        let degrees = center / c * 360.0;
        assert!((degrees - 290.0).abs() < EPS, "gap centred at {degrees}");
        assert!((dash.first_gap_center_degrees() - 290.0).abs() < EPS);
    }

    #[test]
    fn one_period_is_half_the_circumference() {
        let dash = RingGeometry::new().inner_dash;
        assert!((dash.period() * 2.0 - dash.circumference).abs() < EPS);
        assert!((dash.gap - dash.circumference / 12.0).abs() < EPS);
        assert!(dash.offset >= 0.0 && dash.offset < dash.circumference);
    }

    #[test]
    fn offset_tracks_changed_constants() {
        let constants = GeometryConstants {
            inner_radius: 150.0,
            gap_degrees: 20.0,
            break_degrees: 45.0,
            ..GeometryConstants::default()
        };
        let dash = RingGeometry::with_constants(constants).inner_dash;
        assert!((dash.first_gap_center_degrees() - 45.0).abs() < EPS);
        assert!(dash.offset >= 0.0 && dash.offset < dash.circumference);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let a = RingGeometry::new();
        let b = RingGeometry::new();
        assert_eq!(a, b);
        assert_eq!(a.inner_dash.dasharray(), b.inner_dash.dasharray());
        assert_eq!(a.inner_dash.offset.to_bits(), b.inner_dash.offset.to_bits());
    }
}
