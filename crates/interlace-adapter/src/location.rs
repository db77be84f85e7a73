//! Locations of adapter configuration documents.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

use crate::AdapterError;

/// Where an adapter configuration document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// A local filesystem path.
    Path(PathBuf),
    /// A URL; only `file:` URLs are readable by the bundled store.
    Url(Url),
}

impl ConfigLocation {
    /// Builds a path location.
    #[must_use]
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Local filesystem path for path locations and `file:` URLs.
    #[must_use]
    pub fn local_path(&self) -> Option<PathBuf> {
        match self {
            Self::Path(path) => Some(path.clone()),
            Self::Url(url) if url.scheme() == "file" => url.to_file_path().ok(),
            Self::Url(_) => None,
        }
    }

    /// File extension of the referenced document, lower-cased.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let path = match self {
            Self::Path(path) => path.clone(),
            Self::Url(url) => PathBuf::from(url.path()),
        };
        path.extension()
            .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
    }
}

impl FromStr for ConfigLocation {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with("file:") || trimmed.contains("://") {
            return Url::parse(trimmed)
                .map(Self::Url)
                .map_err(|error| AdapterError::InvalidLocation {
                    location: trimmed.to_owned(),
                    message: error.to_string(),
                });
        }
        Ok(Self::Path(PathBuf::from(trimmed)))
    }
}

impl fmt::Display for ConfigLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::relative("config/adapter.json", true)]
    #[case::file_url("file:///srv/interlace/adapter.json", true)]
    #[case::http("https://config.example.com/adapter.json", false)]
    fn classifies_locations(#[case] raw: &str, #[case] local: bool) {
        let location: ConfigLocation = raw.parse().expect("valid location");
        assert_eq!(location.local_path().is_some(), local);
        assert_eq!(location.to_string(), raw);
    }

    #[test]
    fn equal_values_compare_equal() {
        let first: ConfigLocation = "file:///srv/a.json".parse().expect("location");
        let second: ConfigLocation = " file:///srv/a.json ".parse().expect("location");
        assert_eq!(first, second);
    }

    #[test]
    fn reports_lower_case_extension() {
        let location = ConfigLocation::path("config/Adapter.YAML");
        assert_eq!(location.extension().as_deref(), Some("yaml"));
    }
}
