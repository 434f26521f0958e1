//! Client for the public demo API exercised by `/proxy/test`.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when calling the demo API.
#[derive(Debug, Error)]
pub enum DemoError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// A single todo item from the demo API.
#[derive(Debug, Deserialize)]
pub struct Todo {
    pub title: String,
}

/// Demo API client.
#[derive(Clone)]
pub struct DemoClient {
    client: reqwest::Client,
    base_url: String,
}

impl DemoClient {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the first todo item.
    ///
    /// # Errors
    ///
    /// Returns `DemoError::Http` on transport failure and `DemoError::Api`
    /// when the API responds with a non-2xx status.
    pub async fn fetch_todo(&self) -> Result<Todo, DemoError> {
        let url = format!("{}/todos/1", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DemoError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
