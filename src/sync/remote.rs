//! Client-side view of the document store

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::core::error::StoreError;
use crate::core::site::SiteConfiguration;

/// Acknowledgement of a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub message: String,
    pub data: SiteConfiguration,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

/// The document store as the sync service sees it
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// The current document, or `None` when the store holds nothing
    async fn fetch(&self) -> Result<Option<SiteConfiguration>, StoreError>;
    /// Create-or-replace the stored document
    async fn save(&self, config: &SiteConfiguration) -> Result<SaveReceipt, StoreError>;
    /// Delete every stored document; returns the store's message
    async fn reset(&self) -> Result<String, StoreError>;
    async fn health(&self) -> Result<HealthReport, StoreError>;
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

/// [`RemoteStore`] over the REST API
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: String,
    client: Client,
}

impl HttpRemote {
    /// `base_url` includes the `/api` prefix, e.g. `http://localhost:5000/api`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a non-success response into [`StoreError::Rejected`], using the
    /// server's `message` when it sent one
    async fn check(resp: Response) -> Result<Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp
            .json::<MessageBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| format!("HTTP error! status: {}", status.as_u16()));
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

fn transport(e: reqwest::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn decode(e: reqwest::Error) -> StoreError {
    StoreError::Decode(e.to_string())
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn fetch(&self) -> Result<Option<SiteConfiguration>, StoreError> {
        let resp = self
            .client
            .get(self.url("components"))
            .send()
            .await
            .map_err(transport)?;
        let config = Self::check(resp).await?.json().await.map_err(decode)?;
        // The server answers with the synthesized default when nothing is stored
        Ok(Some(config))
    }

    async fn save(&self, config: &SiteConfiguration) -> Result<SaveReceipt, StoreError> {
        let resp = self
            .client
            .post(self.url("components"))
            .json(config)
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp).await?.json().await.map_err(decode)
    }

    async fn reset(&self) -> Result<String, StoreError> {
        let resp = self
            .client
            .delete(self.url("components"))
            .send()
            .await
            .map_err(transport)?;
        let body: MessageBody = Self::check(resp).await?.json().await.map_err(decode)?;
        Ok(body.message)
    }

    async fn health(&self) -> Result<HealthReport, StoreError> {
        let resp = self
            .client
            .get(self.url("health"))
            .send()
            .await
            .map_err(transport)?;
        Self::check(resp).await?.json().await.map_err(decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let remote = HttpRemote::new("http://localhost:5000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(remote.base_url(), "http://localhost:5000/api");
        assert_eq!(remote.url("components"), "http://localhost:5000/api/components");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let remote = HttpRemote::new(format!("http://{addr}/api"), Duration::from_secs(2)).unwrap();
        let err = remote.fetch().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)), "{err}");
    }

    #[tokio::test]
    async fn test_slow_server_hits_timeout() {
        let app = axum::Router::new().route(
            "/api/components",
            axum::routing::get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{}"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let remote = HttpRemote::new(format!("http://{addr}/api"), Duration::from_millis(200)).unwrap();
        let started = std::time::Instant::now();
        let err = remote.fetch().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)), "{err}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
