use color_eyre::{Report, Section, config::HookBuilder};

/// Result type used across the crate
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Top-level error of the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An expected failure, with a message meaningful to the operator
    #[error(transparent)]
    UserFacing(#[from] UserFacingError),
    /// An unexpected error occurred
    #[error(transparent)]
    Unexpected(Report),
}

/// Failures the operator can act upon
#[derive(Debug, thiserror::Error)]
pub enum UserFacingError {
    /// The feed couldn't be retrieved
    #[error("Couldn't fetch the feed: {0}")]
    FeedRequestFailed(String),
    /// The feed endpoint answered with a non-successful status
    #[error("The feed responded with status {0}")]
    FeedStatus(u16),
    /// The feed document couldn't be parsed
    #[error("The feed is malformed: {0}")]
    FeedMalformed(String),
    /// A required social configuration value is missing from the environment
    #[error("Missing {0} in the environment, can't announce releases")]
    MissingSocialConfig(String),
    /// The request to the social endpoint failed
    #[error("Couldn't post the announcement: {0}")]
    SocialRequestFailed(String),
    /// The newest version of an application couldn't be found on its own releases
    #[error("Unexpected: can't find version {version} of {application}")]
    InconsistentState { application: String, version: String },
}

impl AppError {
    /// Converts this error into a [Report]
    pub fn into_report(self) -> Report {
        match self {
            AppError::UserFacing(err) => Report::new(err),
            AppError::Unexpected(report) => report,
        }
    }

    /// Retrieves the user-facing error, if this is one
    pub fn user_facing(&self) -> Option<&UserFacingError> {
        match self {
            AppError::UserFacing(err) => Some(err),
            AppError::Unexpected(_) => None,
        }
    }
}

impl From<Report> for AppError {
    fn from(report: Report) -> Self {
        Self::Unexpected(report)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Unexpected(err.into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected(err.into())
    }
}

/// Initializes error handling and runs the given future, logging its error if any
pub async fn init<F>(fut: F) -> color_eyre::Result<()>
where
    F: Future<Output = color_eyre::Result<()>>,
{
    tracing::trace!("Initializing error handlers");
    HookBuilder::default()
        .display_env_section(false)
        .display_location_section(true)
        .capture_span_trace_by_default(true)
        .install()?;

    fut.await
        .with_section(|| format!("Run with HERALD_LOG=debug to get more details from {}", env!("CARGO_PKG_NAME")))
        .inspect_err(|err| tracing::error!("Error: {}", strip_ansi_escapes::strip_str(format!("{err:?}"))))
}
