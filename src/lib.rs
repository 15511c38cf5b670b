//! stamp-renderer: anniversary stamp badges for schools
//!
//! A stamp is a circular badge showing a school's name and founding year on
//! curved text, a centre logo and a small icon. The colour scheme follows
//! the school's age band. Stamps are drawn as vector documents and exported
//! as high-density PNGs, with an SVG fallback when the bitmap cannot be
//! produced or saved.
//!
//! # Example
//!
//! ```
//! use stamp_renderer::{AgeBand, BadgeInput, RingGeometry, StampDocument};
//!
//! let input = BadgeInput::new("Wellspring", "2009", 1).unwrap();
//! let band = AgeBand::classify(input.year(), 2025);
//! assert_eq!(band, AgeBand::Band3);
//!
//! let doc = StampDocument::build(&input, band, &RingGeometry::new(), "sans-serif");
//! let svg = doc.to_svg();
//! assert!(svg.contains("stamp/logo-3.png"));
//! ```
//!
//! # Studio and Export
//!
//! [`BadgeStudio`] holds the editable input, keeps a cached preview and
//! runs the [`ExportPipeline`] against an [`ArtifactSink`]:
//!
//! ```no_run
//! use stamp_renderer::{BadgeStudio, Configurable, BadgeProfile, FileSink, StudioConfig};
//!
//! let config = StudioConfig::default();
//! let mut studio = BadgeStudio::new(&config);
//! studio.apply_profile(&BadgeProfile::new("Trường Xanh", "2021").with_icon(2)).unwrap();
//!
//! let mut sink = FileSink::new(&config.output_dir);
//! let report = studio.export(&mut sink);
//! ```

mod asset;
mod badge;
mod band;
mod config;
mod document;
mod error;
pub mod export;
mod geometry;
mod profile;
mod studio;
mod theme;

#[cfg(feature = "clap")]
mod cli;

pub use asset::{
    check_contract, icon_asset, logo_asset, mime_for, required_assets, AssetResolver,
    DirResolver, FetchedAsset,
};
pub use badge::{BadgeInput, IconIndex, ICON_COUNT, MAX_NAME_CHARS, MAX_YEAR_DIGITS};
pub use band::{current_year, elapsed_years, AgeBand};
pub use config::{load_config, StudioConfig, DEFAULT_FONT_FAMILY};
pub use document::{
    escape_xml, is_xml_char, CircleElement, Element, ImageElement, StampDocument,
    TextPathElement,
};
pub use error::{BadgeError, Result};
pub use export::{
    artifact_name, scale_factor, ArtifactKind, ArtifactSink, DeliveryStep, ExportArtifact,
    ExportOutcome, ExportPipeline, ExportReport, ExportStage, FileSink, InlineReport,
    MemorySink, Rasterizer, SinkCapabilities,
};
pub use geometry::{DashPattern, GeometryConstants, RingGeometry};
pub use profile::BadgeProfile;
pub use studio::{BadgeStudio, Configurable};
pub use theme::{GradientStop, Theme};

#[cfg(feature = "clap")]
pub use cli::{run, Args, OutputFormat};
