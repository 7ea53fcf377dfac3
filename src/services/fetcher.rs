// src/services/fetcher.rs

//! Listing page fetcher.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;
use crate::utils::http::create_async_client;

/// Source of listing page markup.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page at `url` and return its body.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP. One GET per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the configured user agent, timeout and redirect policy.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::info!("Requesting talks page {}", url);
        let start = Instant::now();

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        log::info!(
            "Page retrieved in {:.2}s ({} bytes)",
            start.elapsed().as_secs_f64(),
            body.len()
        );
        Ok(body)
    }
}
