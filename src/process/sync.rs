use color_eyre::Result;
use itertools::Itertools;

use super::{Process, ProcessOutput};
use crate::{
    cli::SyncProcess,
    config::Config,
    errors::AppError,
    format_msg,
    service::{HeraldService, SyncReport},
};

impl Process for SyncProcess {
    async fn execute(self, _config: Config, service: HeraldService) -> Result<ProcessOutput> {
        let mut state = service.load_state().map_err(AppError::into_report)?;
        let report = service.sync_feeds(&mut state).await;
        service.save_state(&state).map_err(AppError::into_report)?;
        Ok(ProcessOutput::success().stderr(describe_report(&report)))
    }
}

/// Describes a sync report for the operator
pub(super) fn describe_report(report: &SyncReport) -> String {
    let learned = match report.learned {
        0 => format_msg!("No new releases found"),
        1 => format_msg!("Learned of 1 new release"),
        n => format_msg!("Learned of {n} new releases"),
    };
    if report.failed.is_empty() {
        learned
    } else {
        format!(
            "{learned}\n{}",
            format_msg!("Couldn't fetch the feed of: {}", report.failed.iter().join(", "))
        )
    }
}
