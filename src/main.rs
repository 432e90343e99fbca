use std::process;

use clap::Parser;
use color_eyre::Result;
use release_herald::{
    app::App,
    cli::Cli,
    config::Config,
    errors::{self, AppError},
    logging,
    service::HeraldService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse cli arguments
    let args = Cli::parse();

    errors::init(async move {
        // Read config and initialize logs
        let config = Config::init(args.config)?;
        let (log_file, filter) = logging::resolve_file_and_filter(&config);
        logging::init(log_file, filter)?;
        tracing::debug!("Loaded {} tracked applications", config.applications.len());

        // Run the process
        let service = HeraldService::from_config(&config).map_err(AppError::into_report)?;
        let output = App::default().run(config, service, args.process).await?;

        // Print the outcome
        if let Some(stderr) = output.stderr {
            eprintln!("{stderr}");
        }
        if let Some(stdout) = output.stdout {
            println!("{stdout}");
        }
        if !output.success {
            process::exit(1);
        }
        Ok(())
    })
    .await
}
