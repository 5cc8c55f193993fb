//! URL construction for the running site.
//!
//! Builders only produce identifier strings; turning them into absolute URLs
//! (and resolving the static logo path) is the job of [`SiteUrls`].

/// Path prefix the IIIF route is mounted under.
pub const IIIF_PREFIX: &str = "iiif";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    base: String,
    logo: String,
}

impl SiteUrls {
    /// `base` is the absolute site root (`http://localhost:5000`); `logo` is a
    /// static path relative to it or an absolute URL.
    pub fn new(base: &str, logo: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            logo: logo.to_string(),
        }
    }

    /// Absolute URL of the IIIF route serving `identifier`.
    pub fn resource_url(&self, identifier: &str) -> String {
        format!("{}/{IIIF_PREFIX}/{identifier}", self.base)
    }

    /// Absolute URL of the site logo.
    pub fn logo_url(&self) -> String {
        self.static_or_external(&self.logo)
    }

    /// Absolute URLs pass through; anything else is a site-relative path.
    pub fn static_or_external(&self, path: &str) -> String {
        if is_external(path) {
            path.to_string()
        } else {
            format!("{}/{}", self.base, path.trim_start_matches('/'))
        }
    }
}

fn is_external(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//")
}
