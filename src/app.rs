use color_eyre::Result;
use tracing::instrument;

use crate::{
    cli::CliProcess,
    config::Config,
    process::{Process, ProcessOutput},
    service::HeraldService,
};

/// The main application struct, managing the application flow
#[derive(Default)]
pub struct App;

impl App {
    /// Runs the main application logic based on the parsed CLI process, returning the final [ProcessOutput]
    #[instrument(skip_all)]
    pub async fn run(self, config: Config, service: HeraldService, process: CliProcess) -> Result<ProcessOutput> {
        match process {
            CliProcess::Run(run_process) => {
                tracing::info!("Running 'run' process");
                tracing::debug!("Options: {:?}", run_process);
                run_process.execute(config, service).await
            }
            CliProcess::Sync(sync_process) => {
                tracing::info!("Running 'sync' process");
                sync_process.execute(config, service).await
            }
            CliProcess::Announce(announce_process) => {
                tracing::info!("Running 'announce' process");
                announce_process.execute(config, service).await
            }
            CliProcess::Publish(publish_process) => {
                tracing::info!("Running 'publish' process");
                publish_process.execute(config, service).await
            }
            CliProcess::Status(status_process) => {
                tracing::info!("Running 'status' process");
                tracing::debug!("Options: {:?}", status_process);
                status_process.execute(config, service).await
            }
        }
    }
}
