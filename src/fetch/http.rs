//! HTTP implementation of [`Fetcher`] over `reqwest`.

use super::{FetchError, FetchFuture, Fetcher, Headers, Sink};
use anyhow::{Context, Result};
use reqwest::{Client, ClientBuilder, Method, Response};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Fetcher backed by a shared `reqwest` client.
///
/// Any non-2xx status (after redirects) or transport error is reported as a single
/// [`FetchError`]; there are no internal retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = client_builder(timeout).build().context("Failed to build HTTP client")?;
        Ok(Self::with_client(client))
    }

    /// Wrap an already configured client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
        }
    }

    async fn send(&self, method: Method, url: &str, headers: &Headers) -> Result<Response, FetchError> {
        debug!("{} {}", method, url);
        let mut request = self.client.request(method, url);
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| FetchError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

fn client_builder(timeout: Duration) -> ClientBuilder {
    Client::builder().timeout(timeout).user_agent(concat!("pants-launcher/", env!("CARGO_PKG_VERSION")))
}

impl Fetcher for HttpFetcher {
    fn fetch_json<'a>(
        &'a self,
        url: &'a str,
        headers: &'a Headers,
    ) -> FetchFuture<'a, serde_json::Value> {
        Box::pin(async move {
            let response = self.send(Method::GET, url, headers).await?;
            response.json().await.map_err(|e| FetchError::InvalidBody {
                url: url.to_string(),
                reason: e.to_string(),
            })
        })
    }

    fn fetch_text<'a>(&'a self, url: &'a str, headers: &'a Headers) -> FetchFuture<'a, String> {
        Box::pin(async move {
            let response = self.send(Method::GET, url, headers).await?;
            response.text().await.map_err(|e| FetchError::InvalidBody {
                url: url.to_string(),
                reason: e.to_string(),
            })
        })
    }

    fn fetch_to_writer<'a>(
        &'a self,
        url: &'a str,
        headers: &'a Headers,
        sink: Sink<'a>,
    ) -> FetchFuture<'a, u64> {
        Box::pin(async move {
            let mut response = self.send(Method::GET, url, headers).await?;
            let write_error = |e: std::io::Error| FetchError::Write {
                url: url.to_string(),
                reason: e.to_string(),
            };

            let mut written = 0u64;
            while let Some(chunk) = response.chunk().await.map_err(|e| FetchError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })? {
                sink.write_all(&chunk).await.map_err(write_error)?;
                written += chunk.len() as u64;
            }
            sink.flush().await.map_err(write_error)?;
            debug!("Downloaded {} bytes from {}", written, url);
            Ok(written)
        })
    }

    fn probe<'a>(&'a self, url: &'a str, headers: &'a Headers) -> FetchFuture<'a, ()> {
        Box::pin(async move {
            self.send(Method::HEAD, url, headers).await?;
            Ok(())
        })
    }
}
