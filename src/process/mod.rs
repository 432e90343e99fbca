use color_eyre::Result;

use crate::{config::Config, service::HeraldService};

mod announce;
mod publish;
mod run;
mod status;
mod sync;

/// Represents the final outcome of a [Process] execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Whether the process was successful
    pub success: bool,
    /// Text to print to standard output
    pub stdout: Option<String>,
    /// Text to print to standard error, for the operator
    pub stderr: Option<String>,
}

impl ProcessOutput {
    /// Creates a successful output with no content
    pub fn success() -> Self {
        Self {
            success: true,
            stdout: None,
            stderr: None,
        }
    }

    /// Creates a failed output with no content
    pub fn fail() -> Self {
        Self {
            success: false,
            stdout: None,
            stderr: None,
        }
    }

    /// Sets the standard output text
    pub fn stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = Some(stdout.into());
        self
    }

    /// Sets the standard error text
    pub fn stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = Some(stderr.into());
        self
    }
}

/// Trait for non-interactive processes
#[allow(async_fn_in_trait)]
pub trait Process {
    /// Executes the process
    async fn execute(self, config: Config, service: HeraldService) -> Result<ProcessOutput>;
}
