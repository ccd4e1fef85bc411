use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Opaque identifier of a release in the compliance-tracking service.
///
/// Only emptiness is rejected. Clients that put it into a URL are
/// responsible for encoding it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReleaseId(String);

impl ReleaseId {
    /// Parse a release identifier.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TypeError::Empty);
        }
        Ok(Self(s.to_string()))
    }

    /// Extract the release identifier from a resource link
    /// (`.../resource/api/releases/<id>`).
    pub fn from_href(href: &str) -> Result<Self, TypeError> {
        let path = href.split(['?', '#']).next().unwrap_or_default();
        let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
        Self::parse(last)
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReleaseId({})", self.0)
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ReleaseId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ReleaseId> for String {
    fn from(id: ReleaseId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ReleaseId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let id = ReleaseId::parse("  a1b2c3 \n").unwrap();
        assert_eq!(id.as_str(), "a1b2c3");
    }

    #[test]
    fn reject_empty() {
        assert_eq!(ReleaseId::parse(""), Err(TypeError::Empty));
        assert_eq!(ReleaseId::parse("   "), Err(TypeError::Empty));
    }

    #[test]
    fn any_non_empty_token_is_accepted() {
        assert_eq!(ReleaseId::parse("a/b").unwrap().as_str(), "a/b");
        assert_eq!(ReleaseId::parse("a?x=1#f").unwrap().as_str(), "a?x=1#f");
        assert_eq!(ReleaseId::parse(" a b ").unwrap().as_str(), "a b");
    }

    #[test]
    fn from_href_takes_last_segment() {
        let id = ReleaseId::from_href("https://sw360.example/resource/api/releases/9f8e7d").unwrap();
        assert_eq!(id.as_str(), "9f8e7d");
    }

    #[test]
    fn from_href_ignores_trailing_slash_and_query() {
        let id = ReleaseId::from_href("http://h/resource/api/releases/abc/?page=1").unwrap();
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let ok: ReleaseId = serde_json::from_str("\"r1\"").unwrap();
        assert_eq!(ok.as_str(), "r1");
        assert!(serde_json::from_str::<ReleaseId>("\"\"").is_err());
    }

    #[test]
    fn from_str_parses() {
        let id: ReleaseId = "xyz".parse().unwrap();
        assert_eq!(format!("{id}"), "xyz");
    }
}
