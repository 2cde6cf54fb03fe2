//! Image URL resolution.
//!
//! Image references from the API come in three shapes: absolute URLs,
//! site-relative paths, and bare filenames. Every place that displays a
//! product image (listing, detail, cart, favorites, brand logo) resolves it
//! through [`ImageResolver`] so the rules cannot drift apart.

use serde::{Deserialize, Serialize};

/// Asset shown when an image reference is missing or unusable.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Resolves raw image references against the configured image host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageResolver {
    base: String,
}

impl ImageResolver {
    /// Create a resolver for the given image base URL.
    ///
    /// A trailing slash on the base is dropped so joining never doubles it.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// The configured base, without trailing slash.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Resolve a raw reference.
    ///
    /// - `http://` or `https://` (any case): returned unchanged
    /// - starts with `/`: prefixed with the image base
    /// - anything else, including empty input: the placeholder
    ///
    /// ```
    /// use shopfront_core::{ImageResolver, PLACEHOLDER_IMAGE};
    ///
    /// let images = ImageResolver::new("https://cdn.acme.test/");
    /// assert_eq!(images.resolve("https://x.test/a.png"), "https://x.test/a.png");
    /// assert_eq!(images.resolve("/uploads/a.png"), "https://cdn.acme.test/uploads/a.png");
    /// assert_eq!(images.resolve("a.png"), PLACEHOLDER_IMAGE);
    /// ```
    #[must_use]
    pub fn resolve(&self, raw: &str) -> String {
        let raw = raw.trim();
        if is_absolute(raw) {
            raw.to_owned()
        } else if raw.starts_with('/') {
            format!("{}{raw}", self.base)
        } else {
            PLACEHOLDER_IMAGE.to_owned()
        }
    }

    /// Resolve an optional reference, falling back to the placeholder.
    #[must_use]
    pub fn resolve_opt(&self, raw: Option<&str>) -> String {
        raw.map_or_else(|| PLACEHOLDER_IMAGE.to_owned(), |r| self.resolve(r))
    }

    /// Returns `true` if `url` is the placeholder asset.
    #[must_use]
    pub fn is_placeholder(url: &str) -> bool {
        url == PLACEHOLDER_IMAGE
    }
}

fn is_absolute(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
