use tracing::instrument;

use super::{JsonStorage, write_json};
use crate::{errors::Result, model::SiteSummary};

impl JsonStorage {
    /// Publishes the summary of every application release tracks, overwriting any previous one
    #[instrument(skip_all)]
    pub fn publish_summary(&self, summary: &SiteSummary) -> Result<()> {
        tracing::debug!("Publishing {} applications to {}", summary.len(), self.site_path.display());
        write_json(&self.site_path, summary)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Track, TrackKind, TrackSet};

    #[test]
    fn test_publish_summary_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path().join("releases.json"), dir.path().join("site/index.json"));
        fs::create_dir_all(dir.path().join("site")).unwrap();
        fs::write(storage.site_path(), r#"{"stale": true}"#).unwrap();

        let mut summary = SiteSummary::new();
        summary.insert(
            String::from("app"),
            TrackSet {
                stable: Track::baseline(TrackKind::Stable),
                beta: Track::baseline(TrackKind::Beta),
                alpha: Track::baseline(TrackKind::Alpha),
            },
        );
        storage.publish_summary(&summary).unwrap();

        let published: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(storage.site_path()).unwrap()).unwrap();
        assert!(published.get("stale").is_none());
        assert_eq!(published["app"]["stable"]["version"], "v0.1");
        assert_eq!(published["app"]["beta"]["version"], "v0.1-beta.0");
        assert_eq!(published["app"]["alpha"]["from_github"], false);
        assert_eq!(published["app"]["alpha"]["date"], "1970-01-01");
        assert!(published["app"]["alpha"]["link"].is_null());
    }
}
