use std::cmp::Ordering;

use tracing::instrument;

use super::HeraldService;
use crate::{
    errors::{Result, UserFacingError},
    gateway::SocialPoster,
    model::{ReleaseChannel, ReleaseSet, ReleaseState, version::compare},
};

/// Version every newest-release lookup starts from
const NEWEST_SENTINEL: &str = "0.1";

/// Announcement status of a single application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationStatus {
    /// There are no known releases
    NoReleases,
    /// The newest release is an alpha or beta, which are never announced
    PreRelease(String),
    /// The newest release has already been announced
    AlreadyAnnounced(String),
    /// The newest release is stable and hasn't been announced yet
    Pending(String),
}

/// Final state of an announcement pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnouncementOutcome {
    /// A release was announced, no other application was evaluated afterwards
    Announced {
        application: String,
        version: String,
        url: String,
    },
    /// No application had a release pending to be announced
    NothingToAnnounce,
}

/// Finds the newest title across every known release, stable or not.
///
/// Titles older than the `0.1` sentinel never win, in which case the sentinel itself is returned.
pub fn newest_title(releases: &ReleaseSet) -> &str {
    releases.keys().fold(NEWEST_SENTINEL, |newest, title| {
        if compare(newest, title) == Ordering::Less {
            title.as_str()
        } else {
            newest
        }
    })
}

/// Evaluates whether the newest release of an application must be announced.
///
/// Fails with [UserFacingError::InconsistentState] if the newest title can't be found on the releases themselves.
pub fn evaluate(application: &str, releases: Option<&ReleaseSet>) -> Result<ApplicationStatus> {
    let Some(releases) = releases.filter(|r| !r.is_empty()) else {
        return Ok(ApplicationStatus::NoReleases);
    };
    tracing::debug!("Know of {} {application} versions", releases.len());

    let newest = newest_title(releases);
    tracing::debug!("Newest version is {newest}");

    let Some(release) = releases.get(newest) else {
        tracing::error!("Unexpected: can't find version {newest}");
        return Err(UserFacingError::InconsistentState {
            application: application.to_owned(),
            version: newest.to_owned(),
        }
        .into());
    };

    Ok(if ReleaseChannel::is_prerelease(&release.title) {
        ApplicationStatus::PreRelease(release.title.clone())
    } else if release.announced {
        ApplicationStatus::AlreadyAnnounced(release.title.clone())
    } else {
        ApplicationStatus::Pending(release.title.clone())
    })
}

impl<F> HeraldService<F> {
    /// Announces the newest unannounced stable release, at most one per pass.
    ///
    /// Applications are evaluated in their configured order; once a release is announced its flag is persisted right
    /// away and the pass stops, leaving the remaining applications for the next run.
    ///
    /// The poster is only built when there's a release to announce.
    #[instrument(skip_all)]
    pub async fn announce<P, B>(&self, state: &mut ReleaseState, build_poster: B) -> Result<AnnouncementOutcome>
    where
        P: SocialPoster,
        B: FnOnce() -> Result<P>,
    {
        for app in &self.applications {
            let version = match evaluate(&app.key, state.releases(&app.key))? {
                ApplicationStatus::NoReleases => {
                    tracing::debug!("There are no known {} versions", app.key);
                    continue;
                }
                ApplicationStatus::PreRelease(version) => {
                    tracing::debug!("Skip {} version {version}", app.key);
                    continue;
                }
                ApplicationStatus::AlreadyAnnounced(version) => {
                    tracing::debug!("Already announced {} {version}", app.key);
                    continue;
                }
                ApplicationStatus::Pending(version) => version,
            };

            tracing::debug!("Going to announce {} {version}", app.key);
            let poster = build_poster()?;
            let message = app.announcement(&version);
            let url = poster
                .post_status(&message, &format!("{}:{version}", app.key))
                .await?;
            tracing::info!("Posted announcement of {} {version}: {url}", app.key);

            if let Some(release) = state.release_mut(&app.key, &version) {
                release.announced = true;
            }
            self.storage.save_state(state)?;

            return Ok(AnnouncementOutcome::Announced {
                application: app.key.clone(),
                version,
                url,
            });
        }

        tracing::debug!("Nothing to announce");
        Ok(AnnouncementOutcome::NothingToAnnounce)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{errors::AppError, model::Release, service::tests::*};

    fn release(title: &str, announced: bool) -> Release {
        Release {
            id: format!("id-{title}"),
            updated: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            title: title.to_owned(),
            content: String::new(),
            announced,
        }
    }

    fn state(items: &[(&str, &str, bool)]) -> ReleaseState {
        let mut state = ReleaseState::default();
        for (app, title, announced) in items {
            state
                .releases_mut(app)
                .insert(title.to_string(), release(title, *announced));
        }
        state
    }

    fn announced_flags(state: &ReleaseState) -> Vec<(String, String)> {
        state
            .iter()
            .flat_map(|(app, releases)| {
                releases
                    .values()
                    .filter(|r| r.announced)
                    .map(|r| (app.clone(), r.title.clone()))
            })
            .collect()
    }

    #[test]
    fn test_newest_title() {
        let releases = state(&[("app", "v1.2.0", false), ("app", "v1.10.0", false), ("app", "v1.11.0-beta.1", false)]);
        assert_eq!(newest_title(releases.releases("app").unwrap()), "v1.11.0-beta.1");
        assert_eq!(newest_title(&ReleaseSet::new()), NEWEST_SENTINEL);
    }

    #[test]
    fn test_evaluate() {
        let releases = state(&[
            ("stable", "v1.0.0", false),
            ("announced", "v1.0.0", true),
            ("beta", "v1.0.0", true),
            ("beta", "v1.1.0-beta.1", false),
        ]);
        assert_eq!(
            evaluate("stable", releases.releases("stable")).unwrap(),
            ApplicationStatus::Pending(String::from("v1.0.0"))
        );
        assert_eq!(
            evaluate("announced", releases.releases("announced")).unwrap(),
            ApplicationStatus::AlreadyAnnounced(String::from("v1.0.0"))
        );
        assert_eq!(
            evaluate("beta", releases.releases("beta")).unwrap(),
            ApplicationStatus::PreRelease(String::from("v1.1.0-beta.1"))
        );
        assert_eq!(evaluate("missing", None).unwrap(), ApplicationStatus::NoReleases);
    }

    #[test]
    fn test_evaluate_inconsistent_state() {
        // Every title is older than the sentinel, so the newest can't be found
        let releases = state(&[("app", "v0.0.1", false)]);
        let err = evaluate("app", releases.releases("app")).unwrap_err();
        assert!(
            matches!(
                err,
                AppError::UserFacing(UserFacingError::InconsistentState { ref version, .. }) if version == "0.1"
            ),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn test_announces_at_most_once_per_run() {
        let (service, _dir) = service_with_feeds(Vec::new());
        let poster = FakePoster::default();
        let mut state = state(&[("app-a", "v1.0.0", false), ("app-b", "v2.0.0", false)]);

        let outcome = service.announce(&mut state, || Ok(poster.clone())).await.unwrap();

        assert_eq!(
            outcome,
            AnnouncementOutcome::Announced {
                application: String::from("app-a"),
                version: String::from("v1.0.0"),
                url: String::from("https://mastodon.example/@herald/1"),
            }
        );
        let posts = poster.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0], (String::from("App A v1.0.0 is out"), String::from("app-a:v1.0.0")));
        assert_eq!(announced_flags(&state), vec![(String::from("app-a"), String::from("v1.0.0"))]);

        // The flag is persisted as soon as the post is done
        let persisted = service.load_state().unwrap();
        assert_eq!(announced_flags(&persisted), announced_flags(&state));
    }

    #[tokio::test]
    async fn test_next_run_announces_next_application() {
        let (service, _dir) = service_with_feeds(Vec::new());
        let poster = FakePoster::default();
        let mut state = state(&[("app-a", "v1.0.0", true), ("app-b", "v2.0.0", false)]);

        let outcome = service.announce(&mut state, || Ok(poster.clone())).await.unwrap();

        assert!(matches!(outcome, AnnouncementOutcome::Announced { ref application, .. } if application == "app-b"));
        assert_eq!(poster.posts().len(), 1);
    }

    #[tokio::test]
    async fn test_prereleases_are_never_announced() {
        let (service, _dir) = service_with_feeds(Vec::new());
        let poster = FakePoster::default();
        let mut state = state(&[
            ("app-a", "v1.0.0", true),
            ("app-a", "v1.1.0-beta.1", false),
            ("app-b", "v3.0.0-alpha.1", false),
        ]);

        let outcome = service.announce(&mut state, || Ok(poster.clone())).await.unwrap();

        assert_eq!(outcome, AnnouncementOutcome::NothingToAnnounce);
        assert!(poster.posts().is_empty());
    }

    #[tokio::test]
    async fn test_failed_post_keeps_flag_unset() {
        let (service, _dir) = service_with_feeds(Vec::new());
        let poster = FakePoster::failing();
        let mut state = state(&[("app-a", "v1.0.0", false)]);

        let err = service.announce(&mut state, || Ok(poster.clone())).await.unwrap_err();

        assert!(matches!(err.user_facing(), Some(UserFacingError::SocialRequestFailed(_))));
        assert!(announced_flags(&state).is_empty());
    }

    #[tokio::test]
    async fn test_inconsistent_state_aborts_without_posting() {
        let (service, _dir) = service_with_feeds(Vec::new());
        let poster = FakePoster::default();
        let mut state = state(&[("app-a", "v0.0.1", false), ("app-b", "v2.0.0", false)]);

        let err = service.announce(&mut state, || Ok(poster.clone())).await.unwrap_err();

        assert!(matches!(err.user_facing(), Some(UserFacingError::InconsistentState { .. })));
        assert!(poster.posts().is_empty());
    }

    #[tokio::test]
    async fn test_poster_is_only_built_when_pending() {
        let (service, _dir) = service_with_feeds(Vec::new());
        let missing = || Err::<FakePoster, _>(UserFacingError::MissingSocialConfig(String::from("MASTODON_URL")).into());

        let mut nothing_pending = state(&[("app-a", "v1.0.0", true), ("app-b", "v2.0.0-beta.1", false)]);
        let outcome = service.announce(&mut nothing_pending, missing).await.unwrap();
        assert_eq!(outcome, AnnouncementOutcome::NothingToAnnounce);

        let mut pending = state(&[("app-a", "v1.0.0", false)]);
        let err = service.announce(&mut pending, missing).await.unwrap_err();
        assert!(matches!(err.user_facing(), Some(UserFacingError::MissingSocialConfig(_))));
        assert!(announced_flags(&pending).is_empty());
    }
}
