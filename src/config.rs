use std::{fs, path::PathBuf};

use color_eyre::{
    Result,
    eyre::{Context, ContextCompat, eyre},
};
use directories::ProjectDirs;
use itertools::Itertools;
use serde::Deserialize;

use crate::model::LINK_PLACEHOLDER;

/// Placeholder on announcement templates replaced by the announced version
pub const MESSAGE_PLACEHOLDER: &str = "#version";

/// Main configuration struct for the application
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct Config {
    /// File where the known releases are persisted
    pub state_file: PathBuf,
    /// File where the summary of each release track is published for the website
    pub site_file: PathBuf,
    /// Configuration settings for application logging
    pub logs: LogsConfig,
    /// Configuration for the social endpoint where new releases are announced
    pub social: SocialConfig,
    /// Applications to track, in the order they're evaluated for announcement
    pub applications: Vec<ApplicationConfig>,
}

/// Configuration settings for application logging
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct LogsConfig {
    /// Whether application logging is enabled
    pub enabled: bool,
    /// The log filter to apply, controlling which logs are recorded.
    ///
    /// This string supports the `tracing-subscriber`'s environment filter syntax.
    pub filter: String,
    /// File to write the logs to, instead of the standard error
    pub file: Option<PathBuf>,
}

/// Configuration for the social endpoint.
///
/// Credentials are never stored on the config file, only the name of the environment variables holding them.
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[cfg_attr(not(test), serde(default))]
pub struct SocialConfig {
    /// The name of the environment variable containing the base url of the social instance
    pub url_env: String,
    /// The name of the environment variable containing the bearer token
    pub token_env: String,
}

/// A tracked application
#[derive(Clone, Deserialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct ApplicationConfig {
    /// Key of the application on the persisted state
    pub key: String,
    /// Url of the release feed
    pub feed_url: String,
    /// Key of the application on the published website summary
    pub output_key: String,
    /// Template of the link to a release, where `{version}` is replaced by the release title
    pub release_link: String,
    /// Template of the announcement, where `#version` is replaced by the release title
    pub message: String,
}

impl Config {
    /// Initializes the application configuration.
    ///
    /// Attempts to load the configuration from the given file or the user's config directory (`config.toml`). If the
    /// file does not exist or has missing fields, it falls back to default values.
    pub fn init(config_file: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_file {
            Some(path) => path,
            None => {
                let proj_dirs = ProjectDirs::from("org", "ReleaseHerald", "release-herald")
                    .wrap_err("Couldn't initialize project directory")?;
                proj_dirs.config_dir().join("config.toml")
            }
        };

        let config = if config_path.exists() {
            // Read from the config file, if found
            let config_str = fs::read_to_string(&config_path)
                .wrap_err_with(|| format!("Couldn't read config file {}", config_path.display()))?;
            toml::from_str::<Config>(&config_str)
                .wrap_err_with(|| format!("Couldn't parse config file {}", config_path.display()))?
        } else {
            // Use default values if not found
            Config::default()
        };

        config
            .validate()
            .wrap_err_with(|| format!("Invalid config file {}", config_path.display()))?;

        Ok(config)
    }

    /// Validates the tracked applications
    pub fn validate(&self) -> Result<()> {
        if self.applications.is_empty() {
            return Err(eyre!("There are no applications to track"));
        }

        let duplicated_keys = self.applications.iter().map(|a| &a.key).duplicates().join(", ");
        if !duplicated_keys.is_empty() {
            return Err(eyre!("Duplicated application keys: {duplicated_keys}"));
        }

        let duplicated_outputs = self.applications.iter().map(|a| &a.output_key).duplicates().join(", ");
        if !duplicated_outputs.is_empty() {
            return Err(eyre!("Duplicated application output keys: {duplicated_outputs}"));
        }

        let missing_placeholder = self
            .applications
            .iter()
            .filter(|a| !a.release_link.contains(LINK_PLACEHOLDER))
            .map(|a| format!("- {}", a.key))
            .join("\n");
        if !missing_placeholder.is_empty() {
            return Err(eyre!(
                "The release link of these applications lacks the {LINK_PLACEHOLDER} placeholder:\n{missing_placeholder}"
            ));
        }

        Ok(())
    }
}

impl ApplicationConfig {
    /// Builds the announcement message of the given version
    pub fn announcement(&self, version: &str) -> String {
        self.message.replace(MESSAGE_PLACEHOLDER, version)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("cache/releases.json"),
            site_file: PathBuf::from("site/index.json"),
            logs: LogsConfig::default(),
            social: SocialConfig::default(),
            applications: vec![
                ApplicationConfig {
                    key: String::from("firefly-iii"),
                    feed_url: String::from("https://github.com/firefly-iii/firefly-iii/releases.atom"),
                    output_key: String::from("firefly_iii"),
                    release_link: String::from("https://github.com/firefly-iii/firefly-iii/releases/tag/{version}"),
                    message: String::from(
                        "📢 Woohoo! Version #version of Firefly III has just been released 🎉. Check it out over at \
                         GitHub, Docker, or download it using your favorite package manager.\n\n#opensource #oss \
                         #newrelease #php #software #personalfinance #selfhosted\n\n\
                         https://github.com/firefly-iii/firefly-iii/releases/tag/#version",
                    ),
                },
                ApplicationConfig {
                    key: String::from("data-importer"),
                    feed_url: String::from("https://github.com/firefly-iii/data-importer/releases.atom"),
                    output_key: String::from("data"),
                    release_link: String::from("https://github.com/firefly-iii/data-importer/releases/tag/{version}"),
                    message: String::from(
                        "📢 Yay! A new version Firefly III Data Importer has been released. Version #version is out. \
                         Check out the release notes and download it today! #opensource #oss #newrelease #php \
                         #software #personalfinance #selfhosted\n\n\
                         https://github.com/firefly-iii/data-importer/releases/tag/#version",
                    ),
                },
            ],
        }
    }
}
impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: String::from("info"),
            file: None,
        }
    }
}
impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            url_env: String::from("MASTODON_URL"),
            token_env: String::from("MASTODON_TOKEN"),
        }
    }
}
