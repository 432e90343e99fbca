use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Marker found on the titles of nightly development builds
pub const DEVELOPMENT_MARKER: &str = "dev-release";
/// Marker found on the titles of alpha releases
pub const ALPHA_MARKER: &str = "alpha";
/// Marker found on the titles of beta releases
pub const BETA_MARKER: &str = "beta";

/// A raw entry, as found on a release feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: String,
    pub updated: String,
    pub title: String,
    pub content: String,
}

/// A known release of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Opaque identifier from the source feed
    pub id: String,
    /// Day the release was published
    pub updated: NaiveDate,
    /// Version string, unique within an application
    pub title: String,
    /// Sanitized release notes
    pub content: String,
    /// Whether this release has already been announced, once set it's never reset
    #[serde(rename = "announced_mastodon", default)]
    pub announced: bool,
}

/// The channel a release belongs to, based on its title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReleaseChannel {
    Stable,
    Beta,
    Alpha,
    Development,
}

impl ReleaseChannel {
    /// Classifies a release title.
    ///
    /// Development builds are detected first, then alpha, then beta; a title having both alpha and beta markers is
    /// considered an alpha.
    pub fn of(title: &str) -> Self {
        let title = title.to_ascii_lowercase();
        if title.contains(DEVELOPMENT_MARKER) {
            ReleaseChannel::Development
        } else if title.contains(ALPHA_MARKER) {
            ReleaseChannel::Alpha
        } else if title.contains(BETA_MARKER) {
            ReleaseChannel::Beta
        } else {
            ReleaseChannel::Stable
        }
    }

    /// Whether the title carries an alpha or beta marker
    pub fn is_prerelease(title: &str) -> bool {
        matches!(Self::of(title), ReleaseChannel::Alpha | ReleaseChannel::Beta)
    }
}

/// Known releases of a single application, keyed by title
pub type ReleaseSet = BTreeMap<String, Release>;

/// Known releases of every application, keyed by application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseState(BTreeMap<String, ReleaseSet>);

impl ReleaseState {
    /// Retrieves the known releases of an application, if any
    pub fn releases(&self, application: &str) -> Option<&ReleaseSet> {
        self.0.get(application)
    }

    /// Retrieves the known releases of an application, creating an empty set if missing
    pub fn releases_mut(&mut self, application: &str) -> &mut ReleaseSet {
        self.0.entry(application.to_owned()).or_default()
    }

    /// Retrieves a single release
    pub fn release_mut(&mut self, application: &str, title: &str) -> Option<&mut Release> {
        self.0.get_mut(application).and_then(|releases| releases.get_mut(title))
    }

    /// Iterates over every application and its releases
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ReleaseSet)> {
        self.0.iter()
    }

    /// Total number of known releases
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// Whether there are no known releases at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_release_channel() {
        assert_eq!(ReleaseChannel::of("v6.1.2"), ReleaseChannel::Stable);
        assert_eq!(ReleaseChannel::of("v6.2.0-beta.1"), ReleaseChannel::Beta);
        assert_eq!(ReleaseChannel::of("v6.2.0-alpha.2"), ReleaseChannel::Alpha);
        assert_eq!(ReleaseChannel::of("v6.2.0-Alpha.2"), ReleaseChannel::Alpha);
        assert_eq!(ReleaseChannel::of("v6.2.0-alpha-beta.1"), ReleaseChannel::Alpha);
        assert_eq!(ReleaseChannel::of("v6.2.0-dev-release.3"), ReleaseChannel::Development);
        assert_eq!(ReleaseChannel::Development.to_string(), "development");
        assert!(ReleaseChannel::is_prerelease("v1.0.0-beta.1"));
        assert!(!ReleaseChannel::is_prerelease("v1.0.0"));
    }

    #[test]
    fn test_release_serde_format() {
        let json = r#"{
            "id": "tag:github.com,2008:Repository/1/v1.0.0",
            "updated": "2024-01-01",
            "title": "v1.0.0",
            "content": "<h2>Added</h2>"
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.updated, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(!release.announced);

        let value = serde_json::to_value(&release).unwrap();
        assert_eq!(value["announced_mastodon"], serde_json::Value::Bool(false));
        assert_eq!(value["updated"], "2024-01-01");
    }
}
