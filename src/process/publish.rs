use color_eyre::Result;

use super::{Process, ProcessOutput};
use crate::{cli::PublishProcess, config::Config, errors::AppError, format_msg, service::HeraldService};

impl Process for PublishProcess {
    async fn execute(self, config: Config, service: HeraldService) -> Result<ProcessOutput> {
        let state = service.load_state().map_err(AppError::into_report)?;
        let summary = service.publish(&state).map_err(AppError::into_report)?;
        Ok(ProcessOutput::success().stderr(format_msg!(
            "Published {} applications to {}",
            summary.len(),
            config.site_file.display()
        )))
    }
}
