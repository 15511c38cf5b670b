//! Static asset naming contract and asset resolution.
//!
//! A stamp references two images: the band logo and the selected icon in
//! the band's colourway. The surrounding asset pipeline must provide, under
//! one root:
//!
//! ```text
//! stamp/logo-{band}.png            band in 1..=3
//! stamp/icon-{icon}-{band}.svg     icon in 1..=8, band in 1..=3
//! ```

use std::path::{Component, Path, PathBuf};

use crate::badge::IconIndex;
use crate::band::AgeBand;
use crate::error::{BadgeError, Result};
use crate::theme::Theme;

/// Asset path of the icon glyph for `icon` in the colourway of `band`.
pub fn icon_asset(icon: IconIndex, band: AgeBand) -> String {
    format!("stamp/icon-{}-{}.svg", icon.get(), band.id())
}

/// Asset path of the centre logo for `band`.
pub fn logo_asset(band: AgeBand) -> &'static str {
    Theme::for_band(band).logo
}

/// Every asset the contract requires, logos first.
pub fn required_assets() -> Vec<String> {
    let logos = AgeBand::ALL.iter().map(|b| logo_asset(*b).to_string());
    let icons = IconIndex::all()
        .flat_map(|icon| AgeBand::ALL.iter().map(move |band| icon_asset(icon, *band)));
    logos.chain(icons).collect()
}

/// Returns the required assets the resolver cannot provide.
pub fn check_contract(resolver: &dyn AssetResolver) -> Vec<String> {
    required_assets()
        .into_iter()
        .filter(|href| !resolver.contains(href))
        .collect()
}

// ============================================================================
// AssetResolver
// ============================================================================

/// The bytes and MIME type of a fetched asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Source of image bytes for the export pipeline's inlining step.
pub trait AssetResolver: Send + Sync {
    /// Fetches the asset behind `href`.
    fn fetch(&self, href: &str) -> Result<FetchedAsset>;

    /// Returns true if `href` can be fetched.
    fn contains(&self, href: &str) -> bool {
        self.fetch(href).is_ok()
    }
}

/// Resolves asset references against a directory on disk.
#[derive(Debug, Clone)]
pub struct DirResolver {
    root: PathBuf,
}

impl DirResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps `href` to a path under the root, refusing anything that could
    /// escape it.
    fn locate(&self, href: &str) -> Result<PathBuf> {
        let relative = Path::new(href.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe || href.contains("://") {
            return Err(BadgeError::UnsafeAssetPath(href.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetResolver for DirResolver {
    fn fetch(&self, href: &str) -> Result<FetchedAsset> {
        let path = self.locate(href)?;
        let mime = mime_for(&path).ok_or_else(|| BadgeError::UnsupportedAsset(href.to_string()))?;
        let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BadgeError::AssetNotFound(href.to_string()),
            _ => BadgeError::io(&path, e),
        })?;
        Ok(FetchedAsset { mime, bytes })
    }

    fn contains(&self, href: &str) -> bool {
        self.locate(href).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// MIME type for an image path, by extension.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_contract() {
        let icon = IconIndex::new(4).unwrap();
        assert_eq!(icon_asset(icon, AgeBand::Band2), "stamp/icon-4-2.svg");
        assert_eq!(logo_asset(AgeBand::Band3), "stamp/logo-3.png");

        let all = required_assets();
        assert_eq!(all.len(), 3 + 8 * 3);
        assert!(all.contains(&"stamp/icon-8-3.svg".to_string()));
        assert!(all.contains(&"stamp/icon-1-1.svg".to_string()));
    }

    #[test]
    fn dir_resolver_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("stamp")).unwrap();
        std::fs::write(dir.path().join("stamp/logo-1.png"), b"png-bytes").unwrap();

        let resolver = DirResolver::new(dir.path());
        let asset = resolver.fetch("stamp/logo-1.png").unwrap();
        assert_eq!(asset.mime, "image/png");
        assert_eq!(asset.bytes, b"png-bytes");

        // Leading slash is treated as relative to the root.
        assert!(resolver.contains("/stamp/logo-1.png"));
    }

    #[test]
    fn dir_resolver_reports_missing_and_unsafe() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = DirResolver::new(dir.path());

        assert!(matches!(
            resolver.fetch("stamp/logo-2.png"),
            Err(BadgeError::AssetNotFound(_))
        ));
        assert!(matches!(
            resolver.fetch("../secret.png"),
            Err(BadgeError::UnsafeAssetPath(_))
        ));
        assert!(matches!(
            resolver.fetch("https://example.com/a.png"),
            Err(BadgeError::UnsafeAssetPath(_))
        ));
        assert!(matches!(
            resolver.fetch("stamp/notes.txt"),
            Err(BadgeError::UnsupportedAsset(_))
        ));
    }

    #[test]
    fn contract_check_lists_missing_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("stamp")).unwrap();
        for href in required_assets().iter().skip(1) {
            std::fs::write(dir.path().join(href), b"x").unwrap();
        }

        let missing = check_contract(&DirResolver::new(dir.path()));
        assert_eq!(missing, vec!["stamp/logo-1.png".to_string()]);
    }
}
