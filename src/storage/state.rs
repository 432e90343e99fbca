use std::{fs, io::ErrorKind};

use color_eyre::eyre::Context;
use serde_json::{Map, Value};
use tracing::instrument;

use super::{JsonStorage, write_json};
use crate::{
    errors::Result,
    model::{Release, ReleaseState},
};

impl JsonStorage {
    /// Loads every known release.
    ///
    /// A missing state file, or one that isn't a JSON object, is not an error: it's (re)initialized to an empty state,
    /// which is returned. Within a valid object, applications and releases that can't be read are skipped one by one,
    /// so the rest of the announcement history is kept.
    #[instrument(skip_all)]
    pub fn load_state(&self) -> Result<ReleaseState> {
        let path = &self.state_path;
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::warn!("File \"{}\" does not exist, creating an empty one", path.display());
                let state = ReleaseState::default();
                self.save_state(&state)?;
                return Ok(state);
            }
            Err(err) => {
                return Err(err)
                    .wrap_err_with(|| format!("Couldn't read state file {}", path.display()))
                    .map_err(Into::into);
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(value) if is_empty_document(&value) => {
                tracing::debug!("Found an empty state");
                Ok(ReleaseState::default())
            }
            Ok(Value::Object(applications)) => {
                let state = recover_state(applications);
                tracing::debug!("Found valid state with {} known releases", state.len());
                Ok(state)
            }
            Ok(_) => {
                tracing::warn!(
                    "File \"{}\" doesn't contain a state object, recreating an empty one",
                    path.display()
                );
                let state = ReleaseState::default();
                self.save_state(&state)?;
                Ok(state)
            }
            Err(err) => {
                tracing::warn!(
                    "File \"{}\" contains invalid JSON ({err}), recreating an empty one",
                    path.display()
                );
                let state = ReleaseState::default();
                self.save_state(&state)?;
                Ok(state)
            }
        }
    }

    /// Persists every known release, replacing the previous state
    #[instrument(skip_all)]
    pub fn save_state(&self, state: &ReleaseState) -> Result<()> {
        tracing::debug!("Saving {} known releases to {}", state.len(), self.state_path.display());
        write_json(&self.state_path, state)
    }
}

/// Whether the document is an empty object or an empty array, both meaning no releases at all
fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(list) => list.is_empty(),
        _ => false,
    }
}

/// Reads the releases of every application, skipping the ones that can't be read
fn recover_state(applications: Map<String, Value>) -> ReleaseState {
    let mut state = ReleaseState::default();
    for (application, releases) in applications {
        let records = match releases {
            Value::Object(records) => records.into_iter().collect::<Vec<_>>(),
            // Applications whose feed failed may have been stored as an empty list
            Value::Array(records) => records
                .into_iter()
                .enumerate()
                .map(|(idx, record)| (idx.to_string(), record))
                .collect(),
            other => {
                tracing::warn!("Skipping releases of {application}, expected an object but found: {other}");
                continue;
            }
        };
        let set = state.releases_mut(&application);
        for (key, record) in records {
            match serde_json::from_value::<Release>(record) {
                Ok(release) => {
                    set.insert(release.title.clone(), release);
                }
                Err(err) => tracing::warn!("Skipping unreadable {application} release {key}: {err}"),
            }
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::Release;

    fn storage(dir: &tempfile::TempDir) -> JsonStorage {
        JsonStorage::new(dir.path().join("cache/releases.json"), dir.path().join("site/index.json"))
    }

    #[test]
    fn test_load_missing_state_initializes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        let state = storage.load_state().unwrap();

        assert!(state.is_empty());
        assert_eq!(fs::read_to_string(storage.state_path()).unwrap(), "{}");
    }

    #[test]
    fn test_load_invalid_state_resets_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        fs::create_dir_all(storage.state_path().parent().unwrap()).unwrap();
        fs::write(storage.state_path(), "{ not json").unwrap();

        let state = storage.load_state().unwrap();

        assert!(state.is_empty());
        assert_eq!(fs::read_to_string(storage.state_path()).unwrap(), "{}");
    }

    #[test]
    fn test_load_non_object_state_resets_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        fs::create_dir_all(storage.state_path().parent().unwrap()).unwrap();
        fs::write(storage.state_path(), r#"["v1.0.0"]"#).unwrap();

        let state = storage.load_state().unwrap();

        assert!(state.is_empty());
        assert_eq!(fs::read_to_string(storage.state_path()).unwrap(), "{}");
    }

    #[test]
    fn test_load_empty_list_state() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        fs::create_dir_all(storage.state_path().parent().unwrap()).unwrap();
        fs::write(storage.state_path(), "[]").unwrap();

        let state = storage.load_state().unwrap();

        assert!(state.is_empty());
    }

    #[test]
    fn test_load_state_with_empty_application_list_keeps_history() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        fs::create_dir_all(storage.state_path().parent().unwrap()).unwrap();
        let content = r#"{
            "firefly-iii": {
                "v6.1.2": {
                    "id": "tag:github.com,2008:Repository/1/v6.1.2",
                    "updated": "2024-02-01",
                    "title": "v6.1.2",
                    "content": "<h2>Fixed</h2>",
                    "announced_mastodon": true
                }
            },
            "data-importer": []
        }"#;
        fs::write(storage.state_path(), content).unwrap();

        let state = storage.load_state().unwrap();

        assert_eq!(state.len(), 1);
        let release = &state.releases("firefly-iii").unwrap()["v6.1.2"];
        assert!(release.announced);
        assert!(state.releases("data-importer").unwrap().is_empty());
        // The file is left as it was
        assert_eq!(fs::read_to_string(storage.state_path()).unwrap(), content);
    }

    #[test]
    fn test_load_state_skips_unreadable_releases() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        fs::create_dir_all(storage.state_path().parent().unwrap()).unwrap();
        fs::write(
            storage.state_path(),
            r#"{
                "app": {
                    "v1.0.0": {"title": "v1.0.0"},
                    "v1.1.0": {"id": "1", "updated": "2024-03-01", "title": "v1.1.0", "content": "", "announced_mastodon": true}
                },
                "broken": "nope"
            }"#,
        )
        .unwrap();

        let state = storage.load_state().unwrap();

        assert_eq!(state.len(), 1);
        assert!(state.releases("app").unwrap()["v1.1.0"].announced);
        assert!(state.releases("broken").is_none());
    }

    #[test]
    fn test_save_and_load_state() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        let mut state = ReleaseState::default();
        state.releases_mut("app").insert(
            String::from("v1.0.0"),
            Release {
                id: String::from("tag:github.com,2008:Repository/1/v1.0.0"),
                updated: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                title: String::from("v1.0.0"),
                content: String::from("<h2>Added</h2>"),
                announced: true,
            },
        );
        storage.save_state(&state).unwrap();

        let loaded = storage.load_state().unwrap();
        assert_eq!(loaded, state);
        assert!(!storage.state_path().with_file_name("releases.json.tmp").exists());
    }
}
