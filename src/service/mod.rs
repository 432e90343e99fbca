use std::path::Path;

use tracing::instrument;

use crate::{
    config::{ApplicationConfig, Config},
    errors::Result,
    gateway::{AtomFeedClient, FeedSource},
    model::{ReleaseSet, ReleaseState, SiteSummary},
    storage::JsonStorage,
};

mod announce;
mod classify;
mod ingest;

pub use announce::{AnnouncementOutcome, ApplicationStatus, evaluate, newest_title};
pub use classify::classify;
pub use ingest::ingest;

/// Service tracking the releases of the configured applications
#[derive(Clone)]
pub struct HeraldService<F = AtomFeedClient> {
    applications: Vec<ApplicationConfig>,
    storage: JsonStorage,
    feed: F,
}

/// Result of synchronizing the release feeds
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Number of releases not known before
    pub learned: usize,
    /// Applications whose feed couldn't be retrieved, their known releases are kept as they were
    pub failed: Vec<String>,
}

impl HeraldService {
    /// Builds the service for the given config, fetching feeds over http
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.applications.clone(),
            JsonStorage::new(&config.state_file, &config.site_file),
            AtomFeedClient::new()?,
        ))
    }
}

impl<F> HeraldService<F> {
    /// Creates a new instance of `HeraldService`
    pub fn new(applications: Vec<ApplicationConfig>, storage: JsonStorage, feed: F) -> Self {
        Self {
            applications,
            storage,
            feed,
        }
    }

    /// Tracked applications
    pub fn applications(&self) -> &[ApplicationConfig] {
        &self.applications
    }

    /// File where the website summary is published
    pub fn site_path(&self) -> &Path {
        self.storage.site_path()
    }

    /// Loads the known releases, see [JsonStorage::load_state]
    pub fn load_state(&self) -> Result<ReleaseState> {
        self.storage.load_state()
    }

    /// Persists the known releases
    pub fn save_state(&self, state: &ReleaseState) -> Result<()> {
        self.storage.save_state(state)
    }

    /// Resolves the release tracks of every application, keyed by their output key
    #[instrument(skip_all)]
    pub fn summarize(&self, state: &ReleaseState) -> SiteSummary {
        for (key, _) in state.iter() {
            if !self.applications.iter().any(|app| &app.key == key) {
                tracing::debug!("Ignoring releases of {key}, it's not a tracked application");
            }
        }

        let empty = ReleaseSet::new();
        self.applications
            .iter()
            .map(|app| {
                let _span = tracing::debug_span!("classify", application = %app.key).entered();
                let releases = state.releases(&app.key).unwrap_or(&empty);
                (app.output_key.clone(), classify(releases, &app.release_link))
            })
            .collect()
    }

    /// Resolves the release tracks of every application and publishes them for the website
    #[instrument(skip_all)]
    pub fn publish(&self, state: &ReleaseState) -> Result<SiteSummary> {
        tracing::debug!("Updating website");
        let summary = self.summarize(state);
        self.storage.publish_summary(&summary)?;
        tracing::info!("Published {} applications to {}", summary.len(), self.storage.site_path().display());
        Ok(summary)
    }
}

impl<F: FeedSource> HeraldService<F> {
    /// Fetches the feed of every application, one at a time, merging new releases into the state.
    ///
    /// A feed that can't be retrieved or parsed leaves the known releases of its application untouched.
    #[instrument(skip_all)]
    pub async fn sync_feeds(&self, state: &mut ReleaseState) -> SyncReport {
        let mut report = SyncReport::default();
        for app in &self.applications {
            tracing::debug!("Now looking for new releases of \"{}\" at \"{}\"", app.key, app.feed_url);
            match self.feed.fetch_entries(&app.feed_url).await {
                Ok(entries) => {
                    report.learned += ingest(state, &app.key, entries);
                }
                Err(err) => {
                    tracing::warn!("Keeping known releases of {}, the feed failed: {err}", app.key);
                    // Tracked applications are always present on the state, even without releases
                    state.releases_mut(&app.key);
                    report.failed.push(app.key.clone());
                }
            }
        }
        report
    }
}
