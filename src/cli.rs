//! Command-line front end for the `stamp` binary.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::asset::check_contract;
use crate::band::AgeBand;
use crate::config::load_config;
use crate::export::{
    scale_factor, ArtifactKind, ArtifactSink, ExportArtifact, ExportOutcome, FileSink,
};
use crate::profile::BadgeProfile;
use crate::studio::{BadgeStudio, Configurable};
use crate::theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "stamp", version, about = "Render anniversary stamp badges")]
pub struct Args {
    /// School name (at most 20 characters)
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Founding year (at most 4 digits)
    #[arg(short = 'y', long = "year")]
    pub year: Option<String>,

    /// Icon number, 1 to 8
    #[arg(short = 'i', long = "icon")]
    pub icon: Option<u8>,

    /// Asset root containing the stamp/ directory
    #[arg(short = 'a', long = "assets")]
    pub assets: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long = "out")]
    pub out: Option<PathBuf>,

    /// Device pixel ratio used to pick the export scale
    #[arg(long = "dpr")]
    pub dpr: Option<f64>,

    /// Studio config JSON file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Badge profile JSON file; flags override its fields
    #[arg(short = 'p', long = "profile")]
    pub profile: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "png")]
    pub format: OutputFormat,

    /// List assets missing from the asset root and exit
    #[arg(long = "check-assets")]
    pub check_assets: bool,

    /// Print the band themes and exit
    #[arg(long = "themes")]
    pub themes: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    if args.themes {
        print_themes();
        return Ok(());
    }

    let mut config = load_config(args.config.as_deref())?;
    if let Some(assets) = args.assets.clone() {
        config.assets_dir = assets;
    }
    if let Some(out) = args.out.clone() {
        config.output_dir = out;
    }
    if let Some(dpr) = args.dpr {
        config.device_pixel_ratio = dpr;
    }

    let mut studio = BadgeStudio::new(&config);

    if args.check_assets {
        let missing = check_contract(studio.pipeline().resolver());
        if missing.is_empty() {
            println!("all assets present in {}", config.assets_dir.display());
            return Ok(());
        }
        for href in &missing {
            println!("missing: {href}");
        }
        bail!("{} asset(s) missing from {}", missing.len(), config.assets_dir.display());
    }

    let profile = resolve_profile(&args, studio.export_profile())?;
    studio.apply_profile(&profile)?;

    let mut sink = FileSink::new(&config.output_dir).restricted(config.restricted_context);
    match args.format {
        OutputFormat::Svg => {
            let (svg, report) = studio.export_vector();
            for (href, err) in &report.failed {
                eprintln!("warning: {href} not embedded: {err}");
            }
            let scale = scale_factor(studio.device_pixel_ratio());
            let year = studio.input().year();
            let artifact = ExportArtifact::new(year, scale, ArtifactKind::Svg, svg.into_bytes());
            sink.save(&artifact)?;
            println!("{}", config.output_dir.join(&artifact.name).display());
        }
        OutputFormat::Png => {
            let report = studio.export(&mut sink);
            match report.outcome {
                ExportOutcome::Saved(artifact) | ExportOutcome::SavedVector(artifact) => {
                    println!("{}", config.output_dir.join(&artifact.name).display());
                }
                ExportOutcome::Opened(artifact) => println!("opened {}", artifact.name),
                ExportOutcome::CopiedToClipboard => println!("copied to clipboard"),
                ExportOutcome::Failed(message) => bail!(message),
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Starts from the profile file (or `current`), then applies flag overrides.
fn resolve_profile(args: &Args, current: BadgeProfile) -> Result<BadgeProfile> {
    let mut profile = match &args.profile {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading profile {}", path.display()))?;
            BadgeProfile::from_json(&json)
                .with_context(|| format!("parsing profile {}", path.display()))?
        }
        None => current,
    };
    if let Some(name) = &args.name {
        profile.name = name.clone();
    }
    if let Some(year) = &args.year {
        profile.year = year.clone();
    }
    if let Some(icon) = args.icon {
        profile.icon = icon;
    }
    if args.dpr.is_some() {
        profile.device_pixel_ratio = args.dpr;
    }
    Ok(profile)
}

fn print_themes() {
    for band in AgeBand::ALL {
        let theme = Theme::for_band(band);
        let swatches: Vec<String> = [0.0, 25.0, 50.0, 75.0, 100.0]
            .iter()
            .filter_map(|offset| theme.sample(*offset))
            .collect();
        println!(
            "band {} ({}): text {} logo {} ring {}",
            band.id(),
            theme.label,
            theme.text_color,
            theme.logo,
            swatches.join(" ")
        );
    }
}
