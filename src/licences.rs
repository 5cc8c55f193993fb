//! Licence register: licence id → licence URL.
//!
//! Seeded with the platform's default licences that carry a URL. Licences
//! without one (`notspecified`, `other-open`, ...) are left out: a manifest's
//! `rights` must be a URL, so they can't be used for images anyway.

use std::collections::BTreeMap;

const OPEN_DEFINITION: &str = "http://www.opendefinition.org/licenses";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenceRegister {
    urls: BTreeMap<String, String>,
}

impl Default for LicenceRegister {
    fn default() -> Self {
        let mut urls: BTreeMap<String, String> = [
            "odc-pddl", "odc-odbl", "odc-by", "cc-zero", "cc-by", "cc-by-sa", "gfdl",
        ]
        .into_iter()
        .map(|id| (id.to_string(), format!("{OPEN_DEFINITION}/{id}")))
        .collect();
        urls.insert(
            "uk-ogl".into(),
            "http://reference.data.gov.uk/id/open-government-licence".into(),
        );
        urls.insert(
            "cc-nc".into(),
            "http://creativecommons.org/licenses/by-nc/2.0/".into(),
        );
        Self { urls }
    }
}

impl LicenceRegister {
    /// The default register with `extra` entries added on top. Extra entries
    /// replace defaults with the same id.
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        let mut register = Self::default();
        register
            .urls
            .extend(extra.iter().map(|(id, url)| (id.clone(), url.clone())));
        register
    }

    pub fn url(&self, licence_id: &str) -> Option<&str> {
        self.urls.get(licence_id).map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.urls.keys().map(String::as_str)
    }
}
