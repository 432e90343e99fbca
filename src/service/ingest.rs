use chrono::NaiveDate;

use crate::{
    model::{FeedEntry, Release, ReleaseState},
    utils::sanitize_release_notes,
};

/// Merges feed entries into the known releases of an application, returning how many new releases were learned.
///
/// Titles already known are never updated, so announcement history survives any number of ingestions. Entries
/// without a title or a valid publication day are skipped.
pub fn ingest(state: &mut ReleaseState, application: &str, entries: impl IntoIterator<Item = FeedEntry>) -> usize {
    let releases = state.releases_mut(application);
    let mut learned = 0;

    for entry in entries {
        if entry.title.is_empty() {
            tracing::warn!("Skipping {application} entry {} without a title", entry.id);
            continue;
        }
        if releases.contains_key(&entry.title) {
            tracing::trace!("Already known {application} version {}", entry.title);
            continue;
        }
        let Some(updated) = calendar_date(&entry.updated) else {
            tracing::warn!(
                "Skipping {application} version {} with invalid date \"{}\"",
                entry.title,
                entry.updated
            );
            continue;
        };

        tracing::info!("Learned of new {application} version {}", entry.title);
        let release = Release {
            id: entry.id,
            updated,
            title: entry.title.clone(),
            content: sanitize_release_notes(&entry.content),
            announced: false,
        };
        releases.insert(entry.title, release);
        learned += 1;
    }

    learned
}

/// Truncates a feed timestamp (like `2024-03-01T05:12:44Z`) to its calendar day
fn calendar_date(updated: &str) -> Option<NaiveDate> {
    let day = updated.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
