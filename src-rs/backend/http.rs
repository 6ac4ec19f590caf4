use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{StatusReport, SubmitRequest, SubmitResponse, TaskBackend};
use crate::config::BackendConfig;
use crate::error::BackendError;

/// `TaskBackend` over the JSON HTTP endpoints.
pub struct HttpTaskBackend {
    config: BackendConfig,
    client: Client,
    authorization: Option<HeaderValue>,
}

impl HttpTaskBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let authorization = match &config.token {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| BackendError::InvalidToken)?;
                value.set_sensitive(true);
                Some(value)
            }
            None => None,
        };
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            config,
            client,
            authorization,
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(value) = &self.authorization {
            headers.insert(AUTHORIZATION, value.clone());
        }
        headers
    }
}

#[async_trait]
impl TaskBackend for HttpTaskBackend {
    async fn submit(&self, command: &str) -> Result<String, BackendError> {
        let url = self.config.submit_url();
        debug!("POST {}", url);
        let resp = self
            .client
            .post(url)
            .headers(self.headers())
            .json(&SubmitRequest {
                command: command.to_string(),
            })
            .send()
            .await?;
        let body: SubmitResponse = decode(resp).await?;
        body.into_task_id()
    }

    async fn status(&self, task_id: &str) -> Result<StatusReport, BackendError> {
        let url = self.config.status_url(task_id)?;
        debug!("GET {}", url);
        let resp = self.client.get(url).headers(self.headers()).send().await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, BackendError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(BackendError::Http {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|err| BackendError::Malformed(err.to_string()))
}
