use color_eyre::Result;

use super::{Process, ProcessOutput, announce::describe_outcome, sync::describe_report};
use crate::{
    cli::RunProcess,
    config::Config,
    errors::{self, AppError, UserFacingError},
    format_error, format_msg,
    gateway::{FeedSource, MastodonClient, SocialPoster},
    service::HeraldService,
};

impl Process for RunProcess {
    async fn execute(self, config: Config, service: HeraldService) -> Result<ProcessOutput> {
        run_pass(&service, self.skip_announce, || MastodonClient::from_env(&config.social)).await
    }
}

/// Runs a full pass: loads the state, syncs every feed, announces at most one release and publishes the tracks.
///
/// A failed announcement doesn't prevent the website from being published, but the output is a failure. An
/// inconsistent state aborts the pass before publishing anything.
async fn run_pass<F, P, B>(service: &HeraldService<F>, skip_announce: bool, build_poster: B) -> Result<ProcessOutput>
where
    F: FeedSource,
    P: SocialPoster,
    B: FnOnce() -> errors::Result<P>,
{
    let mut state = service.load_state().map_err(AppError::into_report)?;

    let report = service.sync_feeds(&mut state).await;
    service.save_state(&state).map_err(AppError::into_report)?;
    let mut messages = vec![describe_report(&report)];

    let mut success = true;
    if skip_announce {
        tracing::info!("Skipping announcements");
    } else {
        match service.announce(&mut state, build_poster).await {
            Ok(outcome) => messages.push(describe_outcome(&outcome)),
            Err(AppError::UserFacing(err @ UserFacingError::InconsistentState { .. })) => {
                messages.push(format_error!("{err}"));
                return Ok(ProcessOutput::fail().stderr(messages.join("\n")));
            }
            Err(AppError::UserFacing(err)) => {
                tracing::error!("Announcement aborted: {err}");
                success = false;
                messages.push(format_error!("{err}"));
            }
            Err(AppError::Unexpected(report)) => return Err(report),
        }
    }

    let summary = service.publish(&state).map_err(AppError::into_report)?;
    messages.push(format_msg!(
        "Published {} applications to {}",
        summary.len(),
        service.site_path().display()
    ));

    let output = if success {
        ProcessOutput::success()
    } else {
        ProcessOutput::fail()
    };
    Ok(output.stderr(messages.join("\n")))
}
