use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::{Release, ReleaseChannel};

/// Date given to synthetic tracks, no later than any real release
pub const SYNTHETIC_DATE: NaiveDate = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date");

/// The release tracks a consumer may follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum TrackKind {
    Stable,
    Beta,
    Alpha,
}

impl TrackKind {
    /// Baseline version used when no real release satisfies the track
    pub fn baseline_version(self) -> &'static str {
        match self {
            TrackKind::Stable => "v0.1",
            TrackKind::Beta => "v0.1-beta.0",
            TrackKind::Alpha => "v0.1-alpha.0",
        }
    }
}

/// The resolved version of a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub version: String,
    pub date: NaiveDate,
    /// Whether a real release satisfied this track, instead of a synthetic baseline
    #[serde(rename = "from_github")]
    pub from_source: bool,
    pub link: Option<String>,
    pub is_stable: bool,
    pub is_beta: bool,
    pub is_alpha: bool,
}

impl Track {
    /// Builds the synthetic baseline track
    pub fn baseline(kind: TrackKind) -> Self {
        Self {
            version: kind.baseline_version().to_owned(),
            date: SYNTHETIC_DATE,
            from_source: false,
            link: None,
            is_stable: false,
            is_beta: false,
            is_alpha: false,
        }
    }

    /// Builds a track from a real release, resolving its link from the given template
    pub fn from_release(release: &Release, channel: ReleaseChannel, link_template: &str) -> Self {
        Self {
            version: release.title.clone(),
            date: release.updated,
            from_source: true,
            link: Some(link_template.replace(LINK_PLACEHOLDER, &release.title)),
            is_stable: channel == ReleaseChannel::Stable,
            is_beta: channel == ReleaseChannel::Beta,
            is_alpha: channel == ReleaseChannel::Alpha,
        }
    }
}

/// Placeholder on release link templates replaced by the track version
pub const LINK_PLACEHOLDER: &str = "{version}";

/// The three resolved tracks of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSet {
    pub stable: Track,
    pub beta: Track,
    pub alpha: Track,
}

impl TrackSet {
    /// Retrieves a track by kind
    pub fn get(&self, kind: TrackKind) -> &Track {
        match kind {
            TrackKind::Stable => &self.stable,
            TrackKind::Beta => &self.beta,
            TrackKind::Alpha => &self.alpha,
        }
    }
}

/// The summary published for the website, keyed by each application output key
pub type SiteSummary = BTreeMap<String, TrackSet>;
