use std::{env, time::Duration};

use color_eyre::eyre::Context;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use tracing::instrument;

use super::SocialPoster;
use crate::{
    config::SocialConfig,
    errors::{Result, UserFacingError},
};

/// Client posting statuses to a Mastodon instance
#[derive(Clone)]
pub struct MastodonClient {
    inner: Client,
    base_url: String,
    token: String,
}

/// The relevant fields of a created status
#[derive(Deserialize, Debug)]
struct StatusResponse {
    url: Option<String>,
    uri: String,
}

impl MastodonClient {
    /// Builds a new client reading the instance url and token from the environment variables named on the config.
    ///
    /// Both values are required, a missing one results in a [UserFacingError::MissingSocialConfig].
    pub fn from_env(config: &SocialConfig) -> Result<Self> {
        let base_url = read_env(&config.url_env)?;
        let token = read_env(&config.token_env)?;
        Self::new(base_url, token)
    }

    /// Builds a new client for the given instance
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let inner = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .wrap_err("Couldn't build the social http client")?;
        Ok(Self {
            inner,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    fn statuses_url(&self) -> String {
        format!("{}/api/v1/statuses", self.base_url)
    }
}

impl SocialPoster for MastodonClient {
    #[instrument(skip_all)]
    async fn post_status(&self, status: &str, idempotency_key: &str) -> Result<String> {
        let url = self.statuses_url();
        tracing::debug!("Posting status to {url}");

        let res = self
            .inner
            .post(&url)
            .bearer_auth(&self.token)
            .header("Idempotency-Key", idempotency_key)
            .form(&[("status", status)])
            .send()
            .await
            .map_err(|err| {
                tracing::error!("{err:?}");
                UserFacingError::SocialRequestFailed(err.to_string())
            })?;

        let status_code = res.status();
        if !status_code.is_success() {
            let status_str = status_code.as_str();
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|m| m.as_str()).map(|s| s.to_string()))
                .unwrap_or_else(|| format!("received {status_str} response"));
            tracing::error!("Got response [{status_str}]:\n{body}");
            return Err(UserFacingError::SocialRequestFailed(message).into());
        }

        let created: StatusResponse = res.json().await.wrap_err("Couldn't parse the created status response")?;
        Ok(created.url.unwrap_or(created.uri))
    }
}

/// Reads a required, non-empty, environment variable
fn read_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
        _ => {
            tracing::error!("No {name} found in environment");
            Err(UserFacingError::MissingSocialConfig(name.to_owned()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_missing_env_is_user_facing() {
        let config = SocialConfig {
            url_env: String::from("HERALD_TEST_UNSET_SOCIAL_URL"),
            token_env: String::from("HERALD_TEST_UNSET_SOCIAL_TOKEN"),
        };
        let err = MastodonClient::from_env(&config).err().unwrap();
        match err.user_facing() {
            Some(UserFacingError::MissingSocialConfig(name)) => assert_eq!(name, "HERALD_TEST_UNSET_SOCIAL_URL"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_statuses_url() {
        let client = MastodonClient::new("https://mastodon.example/", "token").unwrap();
        assert_eq!(client.statuses_url(), "https://mastodon.example/api/v1/statuses");
    }
}
