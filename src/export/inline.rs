//! Image inlining for self-contained exports.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

use crate::asset::{AssetResolver, FetchedAsset};
use crate::document::StampDocument;
use crate::error::{BadgeError, Result};

/// What happened to each external image reference during inlining.
#[derive(Debug, Default)]
pub struct InlineReport {
    /// Original references that were replaced by embedded data.
    pub embedded: Vec<String>,
    /// References left as-is, with the reason.
    pub failed: Vec<(String, BadgeError)>,
}

impl InlineReport {
    /// Returns true if every external reference was embedded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Replaces every external image reference in `doc` with a `data:` URI.
///
/// Each reference is fetched independently; a failed fetch is logged and
/// leaves that one reference unchanged without affecting the others.
pub fn inline_images(doc: &mut StampDocument, resolver: &dyn AssetResolver) -> InlineReport {
    let results: Vec<(usize, String, Result<String>)> = doc
        .images()
        .enumerate()
        .filter(|(_, img)| !img.is_embedded())
        .map(|(idx, img)| {
            let href = img.href.clone();
            let embedded = resolver.fetch(&href).map(|asset| data_uri(&asset));
            (idx, href, embedded)
        })
        .collect();

    let mut images: Vec<_> = doc.images_mut().collect();
    let mut report = InlineReport::default();
    for (idx, href, result) in results {
        match result {
            Ok(uri) => {
                debug!(%href, "image inlined");
                images[idx].href = uri;
                report.embedded.push(href);
            }
            Err(err) => {
                warn!(%href, error = %err, "image left un-inlined");
                report.failed.push((href, err));
            }
        }
    }
    report
}

/// Encodes an asset as a base64 `data:` URI.
pub fn data_uri(asset: &FetchedAsset) -> String {
    format!("data:{};base64,{}", asset.mime, STANDARD.encode(&asset.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::BadgeInput;
    use crate::band::AgeBand;
    use crate::geometry::RingGeometry;

    struct LogoOnly;

    impl AssetResolver for LogoOnly {
        fn fetch(&self, href: &str) -> Result<FetchedAsset> {
            if href.contains("logo") {
                Ok(FetchedAsset {
                    mime: "image/png",
                    bytes: b"logo".to_vec(),
                })
            } else {
                Err(BadgeError::AssetNotFound(href.to_string()))
            }
        }
    }

    fn document() -> StampDocument {
        StampDocument::build(
            &BadgeInput::default(),
            AgeBand::Band3,
            &RingGeometry::new(),
            "sans-serif",
        )
    }

    #[test]
    fn data_uri_format() {
        let asset = FetchedAsset {
            mime: "image/svg+xml",
            bytes: b"<svg/>".to_vec(),
        };
        assert_eq!(data_uri(&asset), "data:image/svg+xml;base64,PHN2Zy8+");
    }

    #[test]
    fn one_failure_does_not_stop_the_others() {
        let mut doc = document();
        let report = inline_images(&mut doc, &LogoOnly);

        assert_eq!(report.embedded, vec!["stamp/logo-3.png".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "stamp/icon-1-3.svg");
        assert!(!report.is_complete());

        let hrefs: Vec<&str> = doc.images().map(|i| i.href.as_str()).collect();
        assert_eq!(hrefs[0], "data:image/png;base64,bG9nbw==");
        assert_eq!(hrefs[1], "stamp/icon-1-3.svg");
    }

    #[test]
    fn embedded_images_are_skipped() {
        let mut doc = document();
        for img in doc.images_mut() {
            img.href = "data:image/png;base64,AAAA".to_string();
        }
        let report = inline_images(&mut doc, &LogoOnly);
        assert!(report.embedded.is_empty());
        assert!(report.is_complete());
    }
}
