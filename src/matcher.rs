//! Identifier grammars.
//!
//! Each builder recognises a class of identifiers through an
//! [`IdentifierPattern`]: a regex anchored at both ends whose named capture
//! groups become the builder's parameters. A non-matching identifier is a
//! normal outcome (`None`), never an error.

use regex::Regex;
use std::collections::BTreeMap;

/// Parameters extracted from an identifier, keyed by capture group name.
pub type NamedParams = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct IdentifierPattern {
    regex: Regex,
}

impl IdentifierPattern {
    /// Compile a grammar. The pattern is wrapped in `^(?:...)$` so partial
    /// matches never count.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self { regex })
    }

    /// Names of the parameters this grammar extracts, in pattern order.
    pub fn param_names(&self) -> Vec<&str> {
        self.regex.capture_names().flatten().collect()
    }

    /// Match an identifier, returning every named group that participated.
    pub fn match_identifier(&self, identifier: &str) -> Option<NamedParams> {
        let caps = self.regex.captures(identifier)?;
        Some(
            self.regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect(),
        )
    }
}
