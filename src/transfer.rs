use crate::factory::PathWriterFactory;
use crate::geturl::{get_url, RetriableResult};
use crate::retry::{Backoff, Retry};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// A Transfer fetches the content at a URL into a local file.  It does not promise that the file
/// is non-empty; callers verify that themselves.
#[async_trait]
pub trait Transfer: Sync + Send {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<()>;
}

/// A [Transfer] over HTTP(S), retrying transient failures according to its [Retry]
/// configuration.
pub struct HttpTransfer {
    client: reqwest::Client,
    retry: Retry,
}

impl HttpTransfer {
    /// Build a transfer with the given retry configuration and optional per-request timeout.
    pub fn new(retry: Retry, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("building HTTP client")?;
        Ok(Self { client, retry })
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<()> {
        let mut factory = PathWriterFactory::new(destination);
        let mut backoff = Backoff::new(&self.retry);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match get_url(&self.client, url, &mut factory).await {
                RetriableResult::Ok(size) => {
                    log::debug!("fetched {} bytes from {}", size, url);
                    return Ok(());
                }
                RetriableResult::Retriable(err) => match backoff.next_backoff() {
                    Some(duration) => {
                        log::debug!("retrying {} in {:?}: {:#}", url, duration, err);
                        tokio::time::sleep(duration).await;
                        continue;
                    }
                    None => {
                        return Err(err)
                            .context(format!("Download failed after {} attempts", attempts))
                    }
                },
                RetriableResult::Permanent(err) => {
                    return Err(err);
                }
            }
        }
    }
}
