use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use std::time::Duration;

/// Status, body and declared content type of a completed GET.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedResource {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

impl FetchedResource {
    pub fn new(body: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
            content_type: content_type.map(str::to_string),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

/// Issues GET requests for the page and its resources.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Resource fetch. Transport failures, timeouts and non-success statuses
    /// are all `Err`.
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<FetchedResource>;

    /// Page fetch without a timeout. Only transport failures are `Err`; any
    /// status comes back with its body.
    async fn fetch_page(&self, url: &str) -> Result<FetchedResource>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        // No client-wide timeout: the page fetch is unbounded, resources set their own.
        let client = ClientBuilder::new()
            .use_rustls_tls()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    async fn send(&self, url: &str, timeout: Option<Duration>) -> Result<Response> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        request
            .send()
            .await
            .with_context(|| format!("Request failed for {}", url))
    }

    async fn read(url: &str, response: Response) -> Result<FetchedResource> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        Ok(FetchedResource {
            status,
            body: body.to_vec(),
            content_type,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Option<Duration>) -> Result<FetchedResource> {
        let response = self.send(url, timeout).await?.error_for_status()?;
        Self::read(url, response).await
    }

    async fn fetch_page(&self, url: &str) -> Result<FetchedResource> {
        let response = self.send(url, None).await?;
        Self::read(url, response).await
    }
}
