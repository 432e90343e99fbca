use color_eyre::{Result, eyre::Context};
use itertools::Itertools;
use strum::IntoEnumIterator;

use super::{Process, ProcessOutput};
use crate::{
    cli::StatusProcess,
    config::Config,
    errors::AppError,
    model::{SiteSummary, TrackKind},
    service::HeraldService,
};

impl Process for StatusProcess {
    async fn execute(self, _config: Config, service: HeraldService) -> Result<ProcessOutput> {
        let state = service.load_state().map_err(AppError::into_report)?;
        let summary = service.summarize(&state);
        let output = if self.json {
            serde_json::to_string_pretty(&summary).wrap_err("Couldn't serialize the summary")?
        } else {
            format_summary(&summary)
        };
        Ok(ProcessOutput::success().stdout(output))
    }
}

/// Formats the release tracks of every application, one line per track
fn format_summary(summary: &SiteSummary) -> String {
    summary
        .iter()
        .map(|(application, tracks)| {
            let lines = TrackKind::iter().map(|kind| {
                let track = tracks.get(kind);
                let origin = if track.from_source { "" } else { " (placeholder)" };
                format!("  {:<6} {} {}{origin}", kind.to_string(), track.version, track.date)
            });
            format!("{application}\n{}", lines.format("\n"))
        })
        .join("\n")
}
