use color_eyre::Result;

use super::{Process, ProcessOutput};
use crate::{
    cli::AnnounceProcess,
    config::Config,
    errors::AppError,
    format_error, format_msg,
    gateway::MastodonClient,
    service::{AnnouncementOutcome, HeraldService},
};

impl Process for AnnounceProcess {
    async fn execute(self, config: Config, service: HeraldService) -> Result<ProcessOutput> {
        let mut state = service.load_state().map_err(AppError::into_report)?;
        match service
            .announce(&mut state, || MastodonClient::from_env(&config.social))
            .await
        {
            Ok(outcome) => Ok(ProcessOutput::success().stderr(describe_outcome(&outcome))),
            Err(AppError::UserFacing(err)) => Ok(ProcessOutput::fail().stderr(format_error!("{err}"))),
            Err(AppError::Unexpected(report)) => Err(report),
        }
    }
}

/// Describes an announcement outcome for the operator
pub(super) fn describe_outcome(outcome: &AnnouncementOutcome) -> String {
    match outcome {
        AnnouncementOutcome::Announced {
            application,
            version,
            url,
        } => format_msg!("Announced {application} {version}: {url}"),
        AnnouncementOutcome::NothingToAnnounce => format_msg!("Nothing to announce"),
    }
}
