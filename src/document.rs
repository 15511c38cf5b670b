//! The stamp's vector drawing.
//!
//! A [`StampDocument`] is the in-memory form of the badge: gradient and path
//! definitions followed by an ordered list of drawable elements. The export
//! pipeline clones it, rewrites image references in the clone and
//! serializes the result with [`StampDocument::to_svg`].

use std::fmt::Write;

use crate::asset::icon_asset;
use crate::badge::BadgeInput;
use crate::band::AgeBand;
use crate::geometry::RingGeometry;
use crate::theme::{GradientStop, Theme};

pub const GRADIENT_ID: &str = "borderGrad";
pub const NAME_PATH_ID: &str = "circlePath";
pub const REVERSE_PATH_ID: &str = "circlePathReverse";
pub const CAPTION_PATH_ID: &str = "circlePathReverseSince";

const TEXT_FONT_SIZE: f64 = 28.0;
const TEXT_FONT_WEIGHT: u16 = 700;
const LOGO_SIZE: f64 = 350.0;
const ICON_SIZE: f64 = 64.0;

// ============================================================================
// Elements
// ============================================================================

/// A circle stroked with the ring gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleElement {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: Option<String>,
    pub stroke_width: f64,
    /// `(dasharray, dashoffset)` for dashed rings.
    pub dash: Option<(String, f64)>,
}

/// A raster or vector image placed in the drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    /// Asset path or `data:` URI.
    pub href: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ImageElement {
    /// Returns true if the image is already self-contained.
    pub fn is_embedded(&self) -> bool {
        self.href.starts_with("data:")
    }
}

/// Text laid out along one of the defined circle paths.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPathElement {
    pub text: String,
    pub path_id: &'static str,
    /// Start offset along the path, in percent.
    pub start_offset: f64,
    pub fill: String,
}

/// A drawable element of the stamp.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Circle(CircleElement),
    Image(ImageElement),
    TextOnPath(TextPathElement),
}

// ============================================================================
// StampDocument
// ============================================================================

/// Vector drawing of one stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct StampDocument {
    pub size: f64,
    pub font_family: String,
    pub gradient: Vec<GradientStop>,
    /// `(id, d)` pairs of the text baseline paths.
    pub paths: Vec<(&'static str, String)>,
    pub elements: Vec<Element>,
}

impl StampDocument {
    /// Lays out the stamp for `input` in the given band.
    ///
    /// Name and caption are upper-cased here; the drawing carries no
    /// text-transform styling.
    pub fn build(
        input: &BadgeInput,
        band: AgeBand,
        geometry: &RingGeometry,
        font_family: &str,
    ) -> Self {
        let theme = Theme::for_band(band);
        let g = geometry;

        let outer = Element::Circle(CircleElement {
            cx: g.cx,
            cy: g.cy,
            r: g.outer_radius,
            fill: Some("#ffffff".to_string()),
            stroke_width: 4.0,
            dash: None,
        });
        let inner = Element::Circle(CircleElement {
            cx: g.cx,
            cy: g.cy,
            r: g.inner_radius,
            fill: None,
            stroke_width: 2.0,
            dash: Some((g.inner_dash.dasharray(), g.inner_dash.offset)),
        });
        let logo = Element::Image(ImageElement {
            href: theme.logo.to_string(),
            x: g.cx - 180.0,
            y: g.cy - 170.0,
            width: LOGO_SIZE,
            height: LOGO_SIZE,
        });
        let icon = Element::Image(ImageElement {
            href: icon_asset(input.icon(), band),
            x: g.size * 0.27 - 35.0,
            y: g.size * 0.61 - 30.0,
            width: ICON_SIZE,
            height: ICON_SIZE,
        });
        let name = Element::TextOnPath(TextPathElement {
            text: input.name().to_uppercase(),
            path_id: NAME_PATH_ID,
            start_offset: 33.33,
            fill: theme.text_color.to_string(),
        });
        let caption = Element::TextOnPath(TextPathElement {
            text: format!("Since {}", input.year()).to_uppercase(),
            path_id: CAPTION_PATH_ID,
            start_offset: 66.67,
            fill: theme.text_color.to_string(),
        });

        Self {
            size: g.size,
            font_family: font_family.to_string(),
            gradient: theme.effective_stops(),
            paths: vec![
                (NAME_PATH_ID, g.circle.clone()),
                (REVERSE_PATH_ID, g.circle_reverse.clone()),
                (CAPTION_PATH_ID, g.circle_reverse_caption.clone()),
            ],
            elements: vec![outer, inner, logo, icon, name, caption],
        }
    }

    /// Iterates over the image elements.
    pub fn images(&self) -> impl Iterator<Item = &ImageElement> {
        self.elements.iter().filter_map(|e| match e {
            Element::Image(img) => Some(img),
            Element::Circle(_) | Element::TextOnPath(_) => None,
        })
    }

    /// Iterates mutably over the image elements.
    pub fn images_mut(&mut self) -> impl Iterator<Item = &mut ImageElement> {
        self.elements.iter_mut().filter_map(|e| match e {
            Element::Image(img) => Some(img),
            Element::Circle(_) | Element::TextOnPath(_) => None,
        })
    }

    /// Serializes the drawing into a standalone SVG document.
    ///
    /// All text content and attribute values are XML-escaped.
    pub fn to_svg(&self) -> String {
        let size = self.size;
        let mut svg = String::new();

        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">",
        );

        svg.push_str("<defs>");
        let _ = write!(
            svg,
            "<linearGradient id=\"{GRADIENT_ID}\" x1=\"0%\" y1=\"0%\" x2=\"100%\" y2=\"0%\">"
        );
        for stop in &self.gradient {
            let _ = write!(
                svg,
                "<stop offset=\"{}%\" stop-color=\"{}\"/>",
                stop.offset,
                escape_xml(stop.color)
            );
        }
        svg.push_str("</linearGradient>");
        for (id, d) in &self.paths {
            let _ = write!(svg, "<path id=\"{id}\" d=\"{}\"/>", escape_xml(d));
        }
        svg.push_str("</defs>");

        for element in &self.elements {
            match element {
                Element::Circle(c) => write_circle(&mut svg, c),
                Element::Image(img) => write_image(&mut svg, img),
                Element::TextOnPath(t) => write_text(&mut svg, t, &self.font_family),
            }
        }

        svg.push_str("</svg>");
        svg
    }
}

fn write_circle(svg: &mut String, c: &CircleElement) {
    let fill = c.fill.as_deref().unwrap_or("none");
    let _ = write!(
        svg,
        "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\" stroke=\"url(#{GRADIENT_ID})\" stroke-width=\"{}\"",
        c.cx,
        c.cy,
        c.r,
        escape_xml(fill),
        c.stroke_width
    );
    if let Some((array, offset)) = &c.dash {
        let _ = write!(
            svg,
            " stroke-linecap=\"round\" stroke-dasharray=\"{}\" stroke-dashoffset=\"{offset}\"",
            escape_xml(array)
        );
    }
    svg.push_str("/>");
}

fn write_image(svg: &mut String, img: &ImageElement) {
    let _ = write!(
        svg,
        "<image href=\"{href}\" xlink:href=\"{href}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid meet\"/>",
        img.x,
        img.y,
        img.width,
        img.height,
        href = escape_xml(&img.href),
    );
}

fn write_text(svg: &mut String, t: &TextPathElement, font_family: &str) {
    let letter_spacing = TEXT_FONT_SIZE * 0.2;
    let _ = write!(
        svg,
        "<text fill=\"{}\" font-family=\"{}\" font-size=\"{TEXT_FONT_SIZE}\" font-weight=\"{TEXT_FONT_WEIGHT}\" letter-spacing=\"{letter_spacing}\" text-anchor=\"middle\"><textPath href=\"#{id}\" xlink:href=\"#{id}\" startOffset=\"{}%\">{}</textPath></text>",
        escape_xml(&t.fill),
        escape_xml(font_family),
        t.start_offset,
        escape_xml(&t.text),
        id = t.path_id,
    );
}

/// Escapes the five XML special characters and drops characters XML 1.0
/// cannot represent at all.
pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

/// Returns true if `c` is allowed in an XML 1.0 document.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}
