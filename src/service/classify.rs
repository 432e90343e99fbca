use std::cmp::Ordering;

use crate::model::{
    ReleaseChannel, ReleaseSet, Track, TrackKind, TrackSet,
    version::{compare, is_newer},
};

/// Resolves the stable, beta and alpha tracks from the known releases of an application.
///
/// Each track starts at a synthetic baseline and takes the newest release of its channel, development builds are
/// ignored. Afterwards, the fallback cascade makes sure no track points to something older than the more stable
/// one:
/// 1. Without a real beta, beta takes the real stable (if any)
/// 2. Without a real alpha, alpha takes the real beta (if any, after the previous step)
/// 3. A real stable at least as new as the beta, and released on or after it, replaces the beta
/// 4. A beta at least as new as the alpha, and released on or after it, replaces the alpha
///
/// Links are resolved from `link_template`, replacing its `{version}` placeholder.
pub fn classify(releases: &ReleaseSet, link_template: &str) -> TrackSet {
    let mut stable = Track::baseline(TrackKind::Stable);
    let mut beta = Track::baseline(TrackKind::Beta);
    let mut alpha = Track::baseline(TrackKind::Alpha);

    for release in releases.values() {
        let channel = ReleaseChannel::of(&release.title);
        let track = match channel {
            ReleaseChannel::Development => {
                tracing::debug!("Skipping development version {}", release.title);
                continue;
            }
            ReleaseChannel::Stable => &mut stable,
            ReleaseChannel::Beta => &mut beta,
            ReleaseChannel::Alpha => &mut alpha,
        };
        if is_newer(&release.title, &track.version) {
            tracing::debug!("Found a {channel} version: {} ({})", release.title, release.updated);
            *track = Track::from_release(release, channel, link_template);
        }
    }

    // Overrule beta with stable if there's no beta
    if !beta.from_source && stable.from_source {
        tracing::info!("There was no beta, so {} is now the beta version", stable.version);
        beta = stable.clone();
    }
    // Overrule alpha with beta if there's no alpha
    if !alpha.from_source && beta.from_source {
        tracing::info!("There was no alpha, so {} is now the alpha version", beta.version);
        alpha = beta.clone();
    }
    // Overrule beta with stable if stable is newer and was released after beta
    if stable.from_source && supersedes(&stable, &beta) {
        tracing::info!(
            "Stable version {} ({}) is not older than beta version {} ({}), so it's now also the beta version",
            stable.version,
            stable.date,
            beta.version,
            beta.date
        );
        beta = stable.clone();
    }
    // Overrule alpha with beta if beta is newer and was released after alpha
    if supersedes(&beta, &alpha) {
        tracing::info!(
            "Beta version {} ({}) is not older than alpha version {} ({}), so it's now also the alpha version",
            beta.version,
            beta.date,
            alpha.version,
            alpha.date
        );
        alpha = beta.clone();
    }

    TrackSet { stable, beta, alpha }
}

/// Whether the `newer` track version is newer or equal than the `older` one, and has been released on or after it
fn supersedes(newer: &Track, older: &Track) -> bool {
    compare(&newer.version, &older.version) != Ordering::Less && newer.date >= older.date
}
