//! HTTP implementation of the report repository.

use async_trait::async_trait;
use fieldwatch_core::{DeleteSummary, NewRecord, Record, ReportRepository, decode_records};
use reqwest::Response;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::{Error, Result};

/// Longest error body kept in [`Error::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Repository backed by the `/api/locations` REST resource.
#[derive(Debug, Clone)]
pub struct HttpReportRepository {
    http: reqwest::Client,
    url: String,
    config: ClientConfig,
}

impl HttpReportRepository {
    /// Creates a client for the configured base URL.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "base URL must start with http:// or https://, got '{}'",
                config.base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            url: config.locations_url(),
            config,
        })
    }

    /// The settings this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL of the report resource.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_all(&self) -> Result<Vec<Record>> {
        let response = self.http.get(&self.url).send().await?;
        let response = self.check("GET", response).await?;
        let documents: Vec<Value> = response.json().await?;
        let (records, undecodable) = decode_records(documents);
        if undecodable > 0 {
            log::debug!("{undecodable} document(s) from {} did not decode", self.url);
        }
        Ok(records)
    }

    async fn post(&self, record: &NewRecord) -> Result<Record> {
        let response = self.http.post(&self.url).json(record).send().await?;
        let response = self.check("POST", response).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self) -> Result<DeleteSummary> {
        let response = self.http.delete(&self.url).send().await?;
        let response = self.check("DELETE", response).await?;
        Ok(response.json().await?)
    }

    async fn check(&self, method: &'static str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(Error::Status {
            method,
            url: self.url.clone(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ReportRepository for HttpReportRepository {
    async fn list(&self) -> fieldwatch_core::Result<Vec<Record>> {
        self.fetch_all().await.map_err(Error::into_persistence)
    }

    async fn create(&self, record: NewRecord) -> fieldwatch_core::Result<Record> {
        self.post(&record).await.map_err(Error::into_insert_rejected)
    }

    async fn delete_all(&self) -> fieldwatch_core::Result<DeleteSummary> {
        self.delete().await.map_err(Error::into_persistence)
    }

    fn name(&self) -> &str {
        "http"
    }
}
