//! Destinations for exported artifacts.
//!
//! A sink stands in for the environment that receives the export: it saves
//! files, may open an artifact in a viewer, may copy text to a clipboard and
//! shows user-facing alerts. [`SinkCapabilities`] lets the pipeline choose a
//! fallback before attempting something the sink cannot do.

use std::path::{Component, Path, PathBuf};

use tracing::{error, info};

use super::ExportArtifact;
use crate::error::{BadgeError, Result};

/// What a sink supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkCapabilities {
    /// Binary image artifacts (PNG) can be produced and saved.
    pub binary_images: bool,
    /// Saving is unreliable here, so opening a viewer is tried first.
    pub restricted_context: bool,
    /// Text can be copied to a clipboard.
    pub clipboard: bool,
}

impl Default for SinkCapabilities {
    fn default() -> Self {
        Self {
            binary_images: true,
            restricted_context: false,
            clipboard: false,
        }
    }
}

/// Receives the artifacts produced by the export pipeline.
pub trait ArtifactSink {
    fn capabilities(&self) -> SinkCapabilities;

    /// Saves the artifact under its own name.
    fn save(&mut self, artifact: &ExportArtifact) -> Result<()>;

    /// Opens the artifact in a new viewing context.
    fn open(&mut self, artifact: &ExportArtifact) -> Result<()>;

    /// Copies text to the clipboard.
    fn copy_to_clipboard(&mut self, text: &str) -> Result<()>;

    /// Shows a message to the user.
    fn alert(&mut self, message: &str);
}

// ============================================================================
// FileSink
// ============================================================================

/// Writes artifacts into a directory.
///
/// Cannot open viewers or use a clipboard. Alerts are logged and kept for
/// the caller to display.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    restricted: bool,
    saved: Vec<PathBuf>,
    alerts: Vec<String>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            restricted: false,
            saved: Vec::new(),
            alerts: Vec::new(),
        }
    }

    /// Marks the sink as a restricted context.
    pub fn restricted(mut self, restricted: bool) -> Self {
        self.restricted = restricted;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Alerts raised so far.
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }
}

impl ArtifactSink for FileSink {
    fn capabilities(&self) -> SinkCapabilities {
        SinkCapabilities {
            binary_images: true,
            restricted_context: self.restricted,
            clipboard: false,
        }
    }

    fn save(&mut self, artifact: &ExportArtifact) -> Result<()> {
        if !is_plain_file_name(&artifact.name) {
            return Err(BadgeError::UnsafeArtifactName(artifact.name.clone()));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| BadgeError::io(&self.dir, e))?;
        let path = self.dir.join(&artifact.name);
        std::fs::write(&path, &artifact.bytes).map_err(|e| BadgeError::io(&path, e))?;
        info!(path = %path.display(), bytes = artifact.bytes.len(), "artifact saved");
        self.saved.push(path);
        Ok(())
    }

    fn open(&mut self, _artifact: &ExportArtifact) -> Result<()> {
        Err(BadgeError::Unsupported("open in viewer"))
    }

    fn copy_to_clipboard(&mut self, _text: &str) -> Result<()> {
        Err(BadgeError::Unsupported("clipboard"))
    }

    fn alert(&mut self, message: &str) {
        error!("{message}");
        self.alerts.push(message.to_string());
    }
}

/// True for a single normal path component with no separators of either
/// platform.
fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

// ============================================================================
// MemorySink
// ============================================================================

/// Keeps artifacts in memory.
///
/// Each capability can be switched off to exercise the fallback chain.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub capabilities: SinkCapabilities,
    /// Refuse every save.
    pub reject_saves: bool,
    /// Refuse to open viewers.
    pub reject_open: bool,
    pub saved: Vec<ExportArtifact>,
    pub opened: Vec<ExportArtifact>,
    pub clipboard: Option<String>,
    pub alerts: Vec<String>,
}

impl ArtifactSink for MemorySink {
    fn capabilities(&self) -> SinkCapabilities {
        self.capabilities
    }

    fn save(&mut self, artifact: &ExportArtifact) -> Result<()> {
        if self.reject_saves {
            return Err(BadgeError::Unsupported("save"));
        }
        self.saved.push(artifact.clone());
        Ok(())
    }

    fn open(&mut self, artifact: &ExportArtifact) -> Result<()> {
        if self.reject_open {
            return Err(BadgeError::Unsupported("open in viewer"));
        }
        self.opened.push(artifact.clone());
        Ok(())
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        if !self.capabilities.clipboard {
            return Err(BadgeError::Unsupported("clipboard"));
        }
        self.clipboard = Some(text.to_string());
        Ok(())
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
