//! Stamp editing session with a cached preview and export.

use tracing::debug;

use crate::asset::DirResolver;
use crate::badge::BadgeInput;
use crate::band::{self, AgeBand};
use crate::config::StudioConfig;
use crate::document::StampDocument;
use crate::error::Result;
use crate::export::{
    ArtifactSink, ExportOutcome, ExportPipeline, ExportReport, InlineReport, Rasterizer,
};
use crate::geometry::RingGeometry;
use crate::profile::BadgeProfile;
use crate::theme::Theme;

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from a [`BadgeProfile`].
pub trait Configurable {
    /// Applies a profile's settings to this instance.
    ///
    /// Fails without changing anything if the profile holds values the
    /// entry limits would refuse.
    fn apply_profile(&mut self, profile: &BadgeProfile) -> Result<()>;

    /// Exports the current settings as a profile.
    fn export_profile(&self) -> BadgeProfile;
}

// ============================================================================
// BadgeStudio
// ============================================================================

/// Holds the user's stamp input and everything needed to draw and export it.
///
/// The preview is rebuilt lazily: every accepted change bumps a version
/// counter, and [`preview`](Self::preview) only lays the document out again
/// when the version has moved since the last build.
///
/// # Example
///
/// ```no_run
/// use stamp_renderer::{BadgeStudio, FileSink, StudioConfig};
///
/// let mut studio = BadgeStudio::new(&StudioConfig::default());
/// studio.set_name("Trường Xanh");
/// studio.set_year("2021");
/// studio.select_icon(4);
///
/// let mut sink = FileSink::new("out");
/// let report = studio.export(&mut sink);
/// println!("{:?}", report.outcome);
/// ```
pub struct BadgeStudio {
    input: BadgeInput,
    font_family: String,
    current_year: Option<i32>,
    device_pixel_ratio: f64,
    pipeline: ExportPipeline,

    version: u64,
    preview: Option<(u64, AgeBand, StampDocument)>,
    last_outcome: Option<ExportOutcome>,
}

impl BadgeStudio {
    /// Creates a studio reading assets from `config.assets_dir`.
    pub fn new(config: &StudioConfig) -> Self {
        let rasterizer = Rasterizer::new(&config.font_dirs, Some(config.assets_dir.clone()));
        let resolver = DirResolver::new(&config.assets_dir);
        Self::with_pipeline(config, ExportPipeline::new(rasterizer, Box::new(resolver)))
    }

    /// Creates a studio with a custom export pipeline.
    pub fn with_pipeline(config: &StudioConfig, pipeline: ExportPipeline) -> Self {
        Self {
            input: BadgeInput::default(),
            font_family: config.font_family.clone(),
            current_year: config.current_year,
            device_pixel_ratio: config.device_pixel_ratio,
            pipeline,
            version: 0,
            preview: None,
            last_outcome: None,
        }
    }

    pub fn input(&self) -> &BadgeInput {
        &self.input
    }

    pub fn pipeline(&self) -> &ExportPipeline {
        &self.pipeline
    }

    /// Incremented on every accepted change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Outcome of the most recent export, if any.
    pub fn last_outcome(&self) -> Option<&ExportOutcome> {
        self.last_outcome.as_ref()
    }

    fn touch(&mut self, changed: bool) -> bool {
        if changed {
            self.version += 1;
            debug!(version = self.version, "stamp input changed");
        }
        changed
    }

    /// Returns true if the name was accepted and differs from before.
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name == self.input.name() {
            return false;
        }
        let changed = self.input.set_name(name);
        self.touch(changed)
    }

    /// Returns true if the year was accepted and differs from before.
    pub fn set_year(&mut self, year: impl Into<String>) -> bool {
        let year = year.into();
        if year == self.input.year() {
            return false;
        }
        let changed = self.input.set_year(year);
        self.touch(changed)
    }

    /// Returns true if the icon was accepted and differs from before.
    pub fn select_icon(&mut self, index: u8) -> bool {
        if self.input.icon().get() == index {
            return false;
        }
        let changed = self.input.select_icon(index);
        self.touch(changed)
    }

    /// Sets the display density. Non-finite or non-positive values are
    /// refused.
    pub fn set_device_pixel_ratio(&mut self, dpr: f64) -> bool {
        if !dpr.is_finite() || dpr <= 0.0 || dpr == self.device_pixel_ratio {
            return false;
        }
        self.device_pixel_ratio = dpr;
        true
    }

    /// Overrides the year bands are classified against.
    pub fn set_current_year(&mut self, year: Option<i32>) -> bool {
        if year == self.current_year {
            return false;
        }
        self.current_year = year;
        self.touch(true)
    }

    /// Age band of the current founding year.
    pub fn band(&self) -> AgeBand {
        let now = self.current_year.unwrap_or_else(band::current_year);
        AgeBand::classify(self.input.year(), now)
    }

    pub fn theme(&self) -> &'static Theme {
        Theme::for_band(self.band())
    }

    /// The live preview document, rebuilt only after a change.
    pub fn preview(&mut self) -> &StampDocument {
        let band = self.band();
        cached_preview(
            &mut self.preview,
            self.version,
            &self.input,
            band,
            &self.font_family,
        )
    }

    /// Exports the current stamp to `sink`.
    ///
    /// Takes `&mut self`, so one studio never runs two exports at once.
    pub fn export(&mut self, sink: &mut dyn ArtifactSink) -> ExportReport {
        let band = self.band();
        let doc = cached_preview(
            &mut self.preview,
            self.version,
            &self.input,
            band,
            &self.font_family,
        );
        let report = self
            .pipeline
            .run(doc, self.input.year(), self.device_pixel_ratio, sink);
        self.last_outcome = Some(report.outcome.clone());
        report
    }

    /// The self-contained SVG of the current stamp, without rasterizing.
    pub fn export_vector(&mut self) -> (String, InlineReport) {
        let band = self.band();
        let doc = cached_preview(
            &mut self.preview,
            self.version,
            &self.input,
            band,
            &self.font_family,
        );
        self.pipeline.vector(doc)
    }
}

/// Returns the cached preview, laying it out again if the input changed or
/// the clock moved the stamp into another band. Geometry is recomputed on
/// every build.
fn cached_preview<'a>(
    slot: &'a mut Option<(u64, AgeBand, StampDocument)>,
    version: u64,
    input: &BadgeInput,
    band: AgeBand,
    font_family: &str,
) -> &'a StampDocument {
    if matches!(slot, Some((v, b, _)) if *v != version || *b != band) {
        *slot = None;
    }
    let (_, _, doc) = slot.get_or_insert_with(|| {
        debug!(version, band = band.id(), "preview rebuilt");
        let geometry = RingGeometry::new();
        (version, band, StampDocument::build(input, band, &geometry, font_family))
    });
    doc
}

impl Configurable for BadgeStudio {
    fn apply_profile(&mut self, profile: &BadgeProfile) -> Result<()> {
        let input = BadgeInput::new(profile.name.as_str(), profile.year.as_str(), profile.icon)?;
        if input != self.input {
            self.input = input;
            self.touch(true);
        }
        if let Some(dpr) = profile.device_pixel_ratio {
            self.set_device_pixel_ratio(dpr);
        }
        Ok(())
    }

    fn export_profile(&self) -> BadgeProfile {
        BadgeProfile::from(&self.input).with_device_pixel_ratio(self.device_pixel_ratio)
    }
}

// ============================================================================
// Tests
// ============================================================================
