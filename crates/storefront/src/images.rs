//! Image URL normalization.
//!
//! The catalog API returns image paths in several shapes: absolute URLs,
//! paths under `/public/images/`, paths under `/images/`, other rooted paths
//! and bare filenames. [`ImageNormalizer`] maps all of them onto a URL the
//! browser can fetch. Reachability is not checked; a dead link shows up as
//! a broken image in the browser and nowhere else.

use crate::config::DisplayConfig;

/// Resolves raw API image paths against the asset host.
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    asset_base: String,
    fallback: String,
}

impl ImageNormalizer {
    /// Create a normalizer. A trailing slash on `asset_base` is ignored.
    #[must_use]
    pub fn new(asset_base: impl Into<String>, fallback: impl Into<String>) -> Self {
        let asset_base = asset_base.into().trim_end_matches('/').to_string();
        Self {
            asset_base,
            fallback: fallback.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(&config.asset_base_url, &config.image_fallback)
    }

    /// The placeholder used for missing images.
    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Map a raw path to a displayable URL.
    ///
    /// Rules, first match wins:
    /// 1. missing or blank: the fallback path
    /// 2. `http://` / `https://` (any case): unchanged
    /// 3. `//host/...`: `https:` prefixed
    /// 4. `/public/images/...`: asset base + path
    /// 5. `/images/...`: asset base + `/public` + path
    /// 6. any other `/...`: asset base + path
    /// 7. bare filename: asset base + `/public/images/` + name
    #[must_use]
    pub fn normalize(&self, path: Option<&str>) -> String {
        let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
            return self.fallback.clone();
        };

        if has_http_scheme(path) {
            return path.to_string();
        }
        if path.starts_with("//") {
            return format!("https:{path}");
        }
        if path.starts_with("/public/images/") {
            return format!("{}{path}", self.asset_base);
        }
        if path.starts_with("/images/") {
            return format!("{}/public{path}", self.asset_base);
        }
        if path.starts_with('/') {
            return format!("{}{path}", self.asset_base);
        }
        format!("{}/public/images/{path}", self.asset_base)
    }

    /// Normalize a list of gallery paths, dropping blank entries.
    #[must_use]
    pub fn normalize_all<'a, I>(&self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        paths
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| self.normalize(Some(p)))
            .collect()
    }
}

fn has_http_scheme(path: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        path.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
