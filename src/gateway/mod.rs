//! Boundaries with external services: the release feeds and the social endpoint

use crate::{errors::Result, model::FeedEntry};

mod feed;
mod mastodon;

pub use feed::*;
pub use mastodon::*;

/// A source of release feed entries
#[trait_variant::make(Send)]
pub trait FeedSource {
    /// Fetches and parses the feed at the given url
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>>;
}

/// A social endpoint where statuses can be posted
#[trait_variant::make(Send)]
pub trait SocialPoster {
    /// Posts a new status, returning the url of the created post.
    ///
    /// The idempotency key identifies the status, so that retries don't create duplicates when the endpoint supports
    /// it.
    async fn post_status(&self, status: &str, idempotency_key: &str) -> Result<String>;
}
