// Remote file store client for raw measurement exports
use crate::application::measurement_source::MeasurementSource;
use crate::domain::error::{DashboardError, DashboardResult};
use async_trait::async_trait;

const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// `base_url` is a prefix the URL-encoded file name is appended to,
    /// e.g. `https://host/files/download?name=`.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn build_download_url(&self, file_name: &str) -> String {
        format!("{}{}", self.base_url, urlencoding::encode(file_name))
    }
}

#[async_trait]
impl MeasurementSource for HttpSource {
    async fn fetch(&self, file_name: &str) -> DashboardResult<String> {
        let url = self.build_download_url(file_name);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| DashboardError::source_unavailable(file_name, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let body = body.trim();
            let message = if body.is_empty() {
                format!("status {}", status)
            } else {
                format!("status {}: {}", status, body.chars().take(200).collect::<String>())
            };
            return Err(DashboardError::source_unavailable(file_name, message));
        }

        response
            .text()
            .await
            .map_err(|e| DashboardError::source_unavailable(file_name, format!("failed to read body: {}", e)))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
