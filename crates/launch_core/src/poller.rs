//! HTTP polling of the launch status and stats endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::Stats,
    protocol::{LaunchEventRecord, StatsDocument, StatusDocument},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(4000);

#[derive(Debug, Error)]
pub enum PollError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: Url, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },
}

/// Where status and stats come from on each poll tick.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<LaunchEventRecord>, PollError>;
    /// `Ok(None)` when no stats feed is configured.
    async fn fetch_stats(&self) -> Result<Option<Stats>, PollError>;
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub status_url: Url,
    pub stats_url: Option<Url>,
    pub request_timeout: Duration,
}

impl PollerConfig {
    pub fn new(status_url: Url) -> Self {
        Self {
            status_url,
            stats_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

pub struct HttpStatusPoller {
    http: Client,
    status_url: Url,
    stats_url: Option<Url>,
}

impl HttpStatusPoller {
    pub fn new(config: PollerConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            status_url: config.status_url,
            stats_url: config.stats_url,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, PollError> {
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| PollError::Transport {
                url: url.clone(),
                source,
            })?;
        let status = res.status();
        if !status.is_success() {
            return Err(PollError::Status {
                url: url.clone(),
                status,
            });
        }
        let body = res.bytes().await.map_err(|source| PollError::Transport {
            url: url.clone(),
            source,
        })?;
        debug!(%url, bytes = body.len(), "poll response received");
        serde_json::from_slice(&body).map_err(|source| PollError::Decode {
            url: url.clone(),
            source,
        })
    }
}

#[async_trait]
impl StatusSource for HttpStatusPoller {
    async fn fetch_events(&self) -> Result<Vec<LaunchEventRecord>, PollError> {
        let doc: StatusDocument = self.get_json(&self.status_url).await?;
        Ok(doc.events)
    }

    async fn fetch_stats(&self) -> Result<Option<Stats>, PollError> {
        let Some(url) = &self.stats_url else {
            return Ok(None);
        };
        let stats: StatsDocument = self.get_json(url).await?;
        Ok(Some(stats))
    }
}

#[cfg(test)]
#[path = "tests/poller_tests.rs"]
mod tests;
