use serde::{Deserialize, Serialize};

/// URL scheme the map engine routes to the archive protocol handler.
pub const PMTILES_SCHEME: &str = "pmtiles";

/// A tile archive addressed through the archive protocol handler.
///
/// `location` is whatever the handler resolves byte ranges against: a
/// relative path, an absolute path or an `https://` URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveUrl {
    location: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotAnArchiveUrl(pub String);

impl std::fmt::Display for NotAnArchiveUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not a {PMTILES_SCHEME}:// url: {:?}", self.0)
    }
}

impl std::error::Error for NotAnArchiveUrl {}

impl ArchiveUrl {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn parse(url: &str) -> Result<Self, NotAnArchiveUrl> {
        url.strip_prefix(PMTILES_SCHEME)
            .and_then(|rest| rest.strip_prefix("://"))
            .filter(|loc| !loc.is_empty())
            .map(Self::new)
            .ok_or_else(|| NotAnArchiveUrl(url.to_string()))
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }
}

impl std::fmt::Display for ArchiveUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{PMTILES_SCHEME}://{}", self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::ArchiveUrl;

    #[test]
    fn prefixes_relative_location() {
        let url = ArchiveUrl::new("./tiles/solar_buildings_roofonly_shinagawa.pmtiles");
        assert_eq!(
            url.to_string(),
            "pmtiles://./tiles/solar_buildings_roofonly_shinagawa.pmtiles"
        );
        assert!(!url.is_remote());
    }

    #[test]
    fn parse_strips_scheme() {
        let url = ArchiveUrl::parse("pmtiles://https://data.example/a.pmtiles").unwrap();
        assert_eq!(url.location(), "https://data.example/a.pmtiles");
        assert!(url.is_remote());
        assert!(ArchiveUrl::parse("https://data.example/a.pmtiles").is_err());
        assert!(ArchiveUrl::parse("pmtiles://").is_err());
    }
}
