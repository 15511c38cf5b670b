//! Export pipeline: turn the live stamp preview into a downloadable file.
//!
//! The pipeline never touches the preview itself. It works on a clone and
//! walks through a fixed sequence of stages:
//!
//! ```text
//! Idle ─► Cloning ─► InliningImages ─► Serializing ─► Rasterizing ─► Encoding ─► Downloading ─► Idle
//!                                                         │              │            │
//!                                                         └──────────────┴────────────┴─► Failed ─► fallback chain
//! ```
//!
//! # Fallback chain
//!
//! When rasterizing, encoding or saving the PNG fails, the serialized SVG is
//! offered instead:
//!
//! 1. Restricted sinks first try to open the SVG in a viewer.
//! 2. Otherwise the SVG is saved as `stamp-{year}@{scale}x.svg`.
//! 3. If that save fails: open in a viewer (unless already tried), copy the
//!    data URI to the clipboard, and finally alert the user.
//!
//! Nothing is retried beyond this chain.

pub mod inline;
pub mod raster;
pub mod sink;

pub use inline::{inline_images, InlineReport};
pub use raster::Rasterizer;
pub use sink::{ArtifactSink, FileSink, MemorySink, SinkCapabilities};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info, warn};

use crate::asset::AssetResolver;
use crate::document::StampDocument;
use crate::error::BadgeError;

/// Scale used when the bitmap could not be produced at all.
pub const FALLBACK_SCALE: u32 = 2;

/// Base multiplier applied to the device pixel ratio.
pub const BASE_SCALE: f64 = 3.0;

/// Alert shown after the data URI was copied to the clipboard.
pub const CLIPBOARD_MESSAGE: &str = "Automatic download failed. The stamp data URL has been copied to the clipboard; paste it into a browser to save it.";

/// Alert shown when every fallback is exhausted.
pub const FAILURE_MESSAGE: &str =
    "Could not save the stamp. Please try another browser or contact support.";

/// Export resolution multiplier: `max(2, round(dpr × 3))`.
///
/// A missing or non-positive device pixel ratio counts as 1.
pub fn scale_factor(device_pixel_ratio: f64) -> u32 {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    ((dpr * BASE_SCALE).round() as u32).max(FALLBACK_SCALE)
}

// ============================================================================
// Artifacts
// ============================================================================

/// File type of an exported artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Png,
    Svg,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Png => "png",
            ArtifactKind::Svg => "svg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ArtifactKind::Png => "image/png",
            ArtifactKind::Svg => "image/svg+xml",
        }
    }
}

/// `stamp-{year}@{scale}x.{ext}`
pub fn artifact_name(year: &str, scale: u32, kind: ArtifactKind) -> String {
    format!("stamp-{year}@{scale}x.{}", kind.extension())
}

/// A finished export, ready to hand to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn new(year: &str, scale: u32, kind: ArtifactKind, bytes: Vec<u8>) -> Self {
        Self {
            name: artifact_name(year, scale, kind),
            kind,
            bytes,
        }
    }

    /// A `data:` URI carrying the artifact.
    ///
    /// SVG is percent-encoded as UTF-8 text; PNG is base64-encoded.
    pub fn data_uri(&self) -> String {
        match self.kind {
            ArtifactKind::Svg => format!(
                "data:{};charset=utf-8,{}",
                self.kind.mime(),
                urlencoding::encode_binary(&self.bytes)
            ),
            ArtifactKind::Png => {
                format!("data:{};base64,{}", self.kind.mime(), STANDARD.encode(&self.bytes))
            }
        }
    }
}

// ============================================================================
// Stages, steps and outcome
// ============================================================================

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Idle,
    Cloning,
    InliningImages,
    Serializing,
    Rasterizing,
    Encoding,
    Downloading,
    Failed,
}

/// A delivery attempt made against the sink, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStep {
    SavePng,
    SaveVector,
    Open,
    Clipboard,
    Alert,
}

/// How an export ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The PNG was saved.
    Saved(ExportArtifact),
    /// The SVG fallback was saved.
    SavedVector(ExportArtifact),
    /// The SVG fallback was opened in a viewer.
    Opened(ExportArtifact),
    /// The SVG data URI was copied to the clipboard.
    CopiedToClipboard,
    /// Every fallback failed; the user was alerted with this message.
    Failed(String),
}

impl ExportOutcome {
    /// Returns the delivered artifact, if any.
    pub fn artifact(&self) -> Option<&ExportArtifact> {
        match self {
            ExportOutcome::Saved(a) | ExportOutcome::SavedVector(a) | ExportOutcome::Opened(a) => {
                Some(a)
            }
            ExportOutcome::CopiedToClipboard | ExportOutcome::Failed(_) => None,
        }
    }
}

/// Record of one export run.
#[derive(Debug)]
pub struct ExportReport {
    /// Stages entered, in order, ending with [`ExportStage::Idle`].
    pub stages: Vec<ExportStage>,
    /// Delivery attempts, in order.
    pub steps: Vec<DeliveryStep>,
    pub inline: InlineReport,
    /// Multiplier used for the delivered artifact name.
    pub scale: u32,
    pub outcome: ExportOutcome,
}

struct Run {
    stages: Vec<ExportStage>,
    steps: Vec<DeliveryStep>,
    inline: InlineReport,
}

impl Run {
    fn enter(&mut self, stage: ExportStage) {
        debug!(?stage, "export stage");
        self.stages.push(stage);
    }

    fn step(&mut self, step: DeliveryStep) {
        debug!(?step, "delivery attempt");
        self.steps.push(step);
    }

    fn fail(&mut self, err: &BadgeError) {
        warn!(error = %err, "export stage failed");
        self.enter(ExportStage::Failed);
    }

    fn finish(mut self, scale: u32, outcome: ExportOutcome) -> ExportReport {
        self.enter(ExportStage::Idle);
        info!(outcome = outcome_kind(&outcome), scale, "export finished");
        ExportReport {
            stages: self.stages,
            steps: self.steps,
            inline: self.inline,
            scale,
            outcome,
        }
    }
}

fn outcome_kind(outcome: &ExportOutcome) -> &'static str {
    match outcome {
        ExportOutcome::Saved(_) => "saved",
        ExportOutcome::SavedVector(_) => "saved-vector",
        ExportOutcome::Opened(_) => "opened",
        ExportOutcome::CopiedToClipboard => "copied-to-clipboard",
        ExportOutcome::Failed(_) => "failed",
    }
}

// ============================================================================
// ExportPipeline
// ============================================================================

/// Clones, inlines, serializes, rasterizes and delivers stamp documents.
pub struct ExportPipeline {
    rasterizer: Rasterizer,
    resolver: Box<dyn AssetResolver>,
}

impl ExportPipeline {
    pub fn new(rasterizer: Rasterizer, resolver: Box<dyn AssetResolver>) -> Self {
        Self {
            rasterizer,
            resolver,
        }
    }

    pub fn resolver(&self) -> &dyn AssetResolver {
        self.resolver.as_ref()
    }

    /// Produces the self-contained SVG for `preview` without rasterizing.
    pub fn vector(&self, preview: &StampDocument) -> (String, InlineReport) {
        let mut doc = preview.clone();
        let report = inline_images(&mut doc, self.resolver.as_ref());
        (doc.to_svg(), report)
    }

    /// Runs the full export of `preview` and delivers the result to `sink`.
    pub fn run(
        &self,
        preview: &StampDocument,
        year: &str,
        device_pixel_ratio: f64,
        sink: &mut dyn ArtifactSink,
    ) -> ExportReport {
        let mut run = Run {
            stages: vec![ExportStage::Idle],
            steps: Vec::new(),
            inline: InlineReport::default(),
        };

        run.enter(ExportStage::Cloning);
        let mut doc = preview.clone();

        run.enter(ExportStage::InliningImages);
        run.inline = inline_images(&mut doc, self.resolver.as_ref());

        run.enter(ExportStage::Serializing);
        let svg = doc.to_svg();

        let scale = scale_factor(device_pixel_ratio);
        run.enter(ExportStage::Rasterizing);
        let bitmap = match self
            .rasterizer
            .load(&svg)
            .and_then(|tree| self.rasterizer.render(&tree, doc.size, scale))
        {
            Ok(bitmap) => bitmap,
            Err(err) => {
                run.fail(&err);
                return deliver_vector(run, svg, year, FALLBACK_SCALE, sink);
            }
        };

        run.enter(ExportStage::Encoding);
        if !sink.capabilities().binary_images {
            run.fail(&BadgeError::Unsupported("binary images"));
            return deliver_vector(run, svg, year, scale, sink);
        }
        let bytes = match raster::encode_png(&bitmap) {
            Ok(bytes) => bytes,
            Err(err) => {
                run.fail(&err);
                return deliver_vector(run, svg, year, scale, sink);
            }
        };

        run.enter(ExportStage::Downloading);
        let artifact = ExportArtifact::new(year, scale, ArtifactKind::Png, bytes);
        run.step(DeliveryStep::SavePng);
        match sink.save(&artifact) {
            Ok(()) => run.finish(scale, ExportOutcome::Saved(artifact)),
            Err(err) => {
                run.fail(&err);
                deliver_vector(run, svg, year, scale, sink)
            }
        }
    }
}

/// Walks the fallback chain with the serialized SVG.
fn deliver_vector(
    mut run: Run,
    svg: String,
    year: &str,
    scale: u32,
    sink: &mut dyn ArtifactSink,
) -> ExportReport {
    run.enter(ExportStage::Downloading);
    let artifact = ExportArtifact::new(year, scale, ArtifactKind::Svg, svg.into_bytes());
    let caps = sink.capabilities();

    let mut tried_open = false;
    if caps.restricted_context {
        tried_open = true;
        run.step(DeliveryStep::Open);
        if sink.open(&artifact).is_ok() {
            return run.finish(scale, ExportOutcome::Opened(artifact));
        }
    }

    run.step(DeliveryStep::SaveVector);
    match sink.save(&artifact) {
        Ok(()) => return run.finish(scale, ExportOutcome::SavedVector(artifact)),
        Err(err) => warn!(error = %err, "vector fallback save failed"),
    }

    if !tried_open {
        run.step(DeliveryStep::Open);
        if sink.open(&artifact).is_ok() {
            return run.finish(scale, ExportOutcome::Opened(artifact));
        }
    }

    if caps.clipboard {
        run.step(DeliveryStep::Clipboard);
        match sink.copy_to_clipboard(&artifact.data_uri()) {
            Ok(()) => {
                sink.alert(CLIPBOARD_MESSAGE);
                return run.finish(scale, ExportOutcome::CopiedToClipboard);
            }
            Err(err) => warn!(error = %err, "clipboard fallback failed"),
        }
    }

    run.step(DeliveryStep::Alert);
    sink.alert(FAILURE_MESSAGE);
    run.finish(scale, ExportOutcome::Failed(FAILURE_MESSAGE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::FetchedAsset;
    use crate::badge::BadgeInput;
    use crate::band::AgeBand;
    use crate::document::Element;
    use crate::error::Result;
    use crate::geometry::RingGeometry;
    use image::{Rgba, RgbaImage};

    const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#00ff00"/></svg>"##;

    /// Serves a tiny PNG logo and an SVG icon; fails for anything else.
    struct TestAssets {
        logo: Vec<u8>,
    }

    impl TestAssets {
        fn new() -> Self {
            let img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]));
            Self {
                logo: raster::encode_png(&img).unwrap(),
            }
        }
    }

    impl AssetResolver for TestAssets {
        fn fetch(&self, href: &str) -> Result<FetchedAsset> {
            if href.ends_with(".png") {
                Ok(FetchedAsset {
                    mime: "image/png",
                    bytes: self.logo.clone(),
                })
            } else if href == "stamp/icon-1-1.svg" {
                Ok(FetchedAsset {
                    mime: "image/svg+xml",
                    bytes: ICON_SVG.as_bytes().to_vec(),
                })
            } else {
                Err(BadgeError::AssetNotFound(href.to_string()))
            }
        }
    }

    fn pipeline() -> ExportPipeline {
        ExportPipeline::new(Rasterizer::new(&[], None), Box::new(TestAssets::new()))
    }

    fn preview(icon: u8) -> StampDocument {
        let input = BadgeInput::new("Test School", "2020", icon).unwrap();
        StampDocument::build(&input, AgeBand::Band1, &RingGeometry::new(), "sans-serif")
    }

    #[test]
    fn scale_factor_floor_and_density() {
        assert_eq!(scale_factor(0.5), 2);
        assert_eq!(scale_factor(1.0), 3);
        assert_eq!(scale_factor(2.0), 6);
        assert_eq!(scale_factor(1.5), 5);
        assert_eq!(scale_factor(0.0), 3);
        assert_eq!(scale_factor(f64::NAN), 3);
    }

    #[test]
    fn artifact_naming() {
        assert_eq!(
            artifact_name("2020", scale_factor(2.0), ArtifactKind::Png),
            "stamp-2020@6x.png"
        );
        assert_eq!(artifact_name("2020", 2, ArtifactKind::Svg), "stamp-2020@2x.svg");
    }

    #[test]
    fn svg_data_uri_is_percent_encoded() {
        let bytes = b"<svg a=\"b c\"/>".to_vec();
        let artifact = ExportArtifact::new("1", 2, ArtifactKind::Svg, bytes);
        assert_eq!(
            artifact.data_uri(),
            "data:image/svg+xml;charset=utf-8,%3Csvg%20a%3D%22b%20c%22%2F%3E"
        );
    }

    #[test]
    fn successful_export_saves_png() {
        let mut sink = MemorySink::default();
        let report = pipeline().run(&preview(1), "2020", 0.5, &mut sink);

        assert_eq!(
            report.stages,
            vec![
                ExportStage::Idle,
                ExportStage::Cloning,
                ExportStage::InliningImages,
                ExportStage::Serializing,
                ExportStage::Rasterizing,
                ExportStage::Encoding,
                ExportStage::Downloading,
                ExportStage::Idle,
            ]
        );
        assert_eq!(report.steps, vec![DeliveryStep::SavePng]);
        assert!(report.inline.is_complete());

        let ExportOutcome::Saved(artifact) = &report.outcome else {
            panic!("expected a saved PNG, got {:?}", report.outcome);
        };
        assert_eq!(artifact.name, "stamp-2020@2x.png");
        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (584 * 2, 584 * 2));
        assert_eq!(sink.saved.len(), 1);
    }

    #[test]
    fn preview_is_not_mutated_by_export() {
        let doc = preview(1);
        let before = doc.clone();
        let mut sink = MemorySink::default();
        pipeline().run(&doc, "2020", 0.5, &mut sink);
        assert_eq!(doc, before);
    }

    #[test]
    fn control_characters_in_text_still_rasterize() {
        let mut doc = preview(1);
        for element in &mut doc.elements {
            if let Element::TextOnPath(t) = element {
                t.text = "AB\u{1}C".to_string();
            }
        }
        let mut sink = MemorySink::default();
        let report = pipeline().run(&doc, "2020", 0.5, &mut sink);

        assert!(!report.stages.contains(&ExportStage::Failed));
        assert_eq!(report.steps, vec![DeliveryStep::SavePng]);
        assert!(matches!(report.outcome, ExportOutcome::Saved(_)));
    }

    #[test]
    fn missing_image_does_not_abort_export() {
        let mut sink = MemorySink::default();
        // Icon 2 is not served by the test resolver.
        let report = pipeline().run(&preview(2), "2020", 0.5, &mut sink);

        assert_eq!(report.inline.failed.len(), 1);
        assert_eq!(report.inline.failed[0].0, "stamp/icon-2-1.svg");
        assert!(matches!(report.outcome, ExportOutcome::Saved(_)));
    }

    #[test]
    fn blob_failure_tries_vector_save_before_clipboard() {
        let mut sink = MemorySink {
            capabilities: SinkCapabilities {
                binary_images: false,
                restricted_context: false,
                clipboard: true,
            },
            reject_saves: true,
            reject_open: true,
            ..MemorySink::default()
        };
        let report = pipeline().run(&preview(1), "2020", 0.5, &mut sink);

        assert_eq!(
            report.steps,
            vec![DeliveryStep::SaveVector, DeliveryStep::Open, DeliveryStep::Clipboard]
        );
        assert_eq!(report.outcome, ExportOutcome::CopiedToClipboard);
        assert!(report.stages.contains(&ExportStage::Failed));

        let copied = sink.clipboard.as_deref().unwrap();
        assert!(copied.starts_with("data:image/svg+xml;charset=utf-8,"));
        assert_eq!(sink.alerts, vec![CLIPBOARD_MESSAGE.to_string()]);
    }

    #[test]
    fn blob_failure_saves_vector_at_computed_scale() {
        let mut sink = MemorySink {
            capabilities: SinkCapabilities {
                binary_images: false,
                ..SinkCapabilities::default()
            },
            ..MemorySink::default()
        };
        let report = pipeline().run(&preview(1), "2020", 0.5, &mut sink);

        let ExportOutcome::SavedVector(artifact) = &report.outcome else {
            panic!("expected vector fallback, got {:?}", report.outcome);
        };
        assert_eq!(artifact.name, "stamp-2020@2x.svg");
        let svg = std::str::from_utf8(&artifact.bytes).unwrap();
        assert!(svg.contains("data:image/png;base64,"), "fallback keeps inlined images");
    }

    #[test]
    fn raster_failure_falls_back_at_scale_two() {
        let mut sink = MemorySink::default();
        // 584 × 300 exceeds the bitmap limit.
        let report = pipeline().run(&preview(1), "2020", 100.0, &mut sink);

        assert_eq!(report.scale, FALLBACK_SCALE);
        assert_eq!(report.steps, vec![DeliveryStep::SaveVector]);
        assert_eq!(
            report.outcome.artifact().map(|a| a.name.as_str()),
            Some("stamp-2020@2x.svg")
        );
    }

    #[test]
    fn restricted_context_opens_viewer_first() {
        let mut sink = MemorySink {
            capabilities: SinkCapabilities {
                binary_images: false,
                restricted_context: true,
                clipboard: false,
            },
            ..MemorySink::default()
        };
        let report = pipeline().run(&preview(1), "2020", 0.5, &mut sink);

        assert_eq!(report.steps, vec![DeliveryStep::Open]);
        assert!(matches!(report.outcome, ExportOutcome::Opened(_)));
        assert!(sink.saved.is_empty());
    }

    #[test]
    fn exhausted_chain_alerts_the_user() {
        let mut sink = MemorySink {
            capabilities: SinkCapabilities {
                binary_images: true,
                restricted_context: false,
                clipboard: false,
            },
            reject_saves: true,
            reject_open: true,
            ..MemorySink::default()
        };
        let report = pipeline().run(&preview(1), "2020", 0.5, &mut sink);

        assert_eq!(
            report.steps,
            vec![
                DeliveryStep::SavePng,
                DeliveryStep::SaveVector,
                DeliveryStep::Open,
                DeliveryStep::Alert
            ]
        );
        assert_eq!(report.outcome, ExportOutcome::Failed(FAILURE_MESSAGE.to_string()));
        assert_eq!(sink.alerts, vec![FAILURE_MESSAGE.to_string()]);
        assert_eq!(report.stages.last(), Some(&ExportStage::Idle));
    }
}
