//! Rasterization of serialized stamp documents using resvg/usvg.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{fontdb, ImageRendering, Options, ShapeRendering, TextRendering, Tree};
use tracing::debug;

use crate::error::{BadgeError, Result};

/// Largest bitmap edge, in pixels, the rasterizer will allocate.
pub const MAX_BITMAP_EDGE: u32 = 16_384;

// ============================================================================
// Rasterizer
// ============================================================================

/// Loads serialized documents and draws them onto off-screen bitmaps.
///
/// The font database is loaded once and shared by every render.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<fontdb::Database>,
    resources_dir: Option<PathBuf>,
}

impl Rasterizer {
    /// Creates a rasterizer with system fonts plus any fonts in `font_dirs`.
    ///
    /// Relative image references that were not inlined are resolved
    /// against `resources_dir`.
    pub fn new(font_dirs: &[PathBuf], resources_dir: Option<PathBuf>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            db.load_fonts_dir(dir);
        }
        debug!(faces = db.len(), "font database loaded");

        Self {
            fontdb: Arc::new(db),
            resources_dir,
        }
    }

    fn options(&self) -> Options<'static> {
        let mut opts = Options::default();
        opts.resources_dir = self.resources_dir.clone();
        opts.shape_rendering = ShapeRendering::GeometricPrecision;
        opts.text_rendering = TextRendering::OptimizeLegibility;
        opts.image_rendering = ImageRendering::OptimizeQuality;
        opts.fontdb = Arc::clone(&self.fontdb);
        opts
    }

    /// Loads an SVG document as a drawable tree.
    pub fn load(&self, svg: &str) -> Result<Tree> {
        Ok(Tree::from_str(svg, &self.options())?)
    }

    /// Draws `tree` onto a square bitmap of `size × scale` pixels.
    pub fn render(&self, tree: &Tree, size: f64, scale: u32) -> Result<RgbaImage> {
        let edge = (size * scale as f64).round();
        if edge < 1.0 || edge > MAX_BITMAP_EDGE as f64 {
            return Err(BadgeError::Raster(format!(
                "bitmap edge {edge} outside 1..={MAX_BITMAP_EDGE}"
            )));
        }
        let edge = edge as u32;

        let mut pixmap = Pixmap::new(edge, edge).ok_or_else(|| {
            BadgeError::Raster(format!("failed to allocate {edge}x{edge} bitmap"))
        })?;

        let tree_size = tree.size();
        let sx = edge as f32 / tree_size.width();
        let sy = edge as f32 / tree_size.height();
        resvg::render(tree, Transform::from_scale(sx, sy), &mut pixmap.as_mut());

        debug!(edge, scale, "document rasterized");
        Ok(pixmap_to_rgba_image(&pixmap))
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Encodes an RGBA bitmap as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        // tiny_skia stores premultiplied alpha
        let (r, g, b, a) = unpremultiply(src.red(), src.green(), src.blue(), src.alpha());
        *dst = Rgba([r, g, b, a]);
    }
    img
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}
