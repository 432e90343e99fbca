use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::eyre::Context;
use serde::Serialize;

use crate::errors::Result;

mod site;
mod state;

/// `JsonStorage` provides access to the JSON documents handled by the application: the durable state of known
/// releases and the summary published for the website
#[derive(Clone, Debug)]
pub struct JsonStorage {
    /// File holding every known release
    state_path: PathBuf,
    /// File where the website summary is published
    site_path: PathBuf,
}

impl JsonStorage {
    /// Creates a new instance of [`JsonStorage`] on the given files.
    ///
    /// Files are not touched until they're read or written.
    pub fn new(state_path: impl Into<PathBuf>, site_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            site_path: site_path.into(),
        }
    }

    /// Path of the state file
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Path of the website summary file
    pub fn site_path(&self) -> &Path {
        &self.site_path
    }
}

/// Writes the value as pretty-printed JSON, replacing the file only once fully written
fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).wrap_err_with(|| format!("Couldn't create directory {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(value).wrap_err("Couldn't serialize to JSON")?;
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content).wrap_err_with(|| format!("Couldn't write file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).wrap_err_with(|| format!("Couldn't replace file {}", path.display()))?;
    Ok(())
}
