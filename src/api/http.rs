//! reqwest-backed implementation of the interview backend contract.

use super::{
    guilt_from_response, records_from_response, transcript_from_response, InterviewRecord,
    InterviewService,
};
use crate::audio::AudioArtifact;
use crate::{InquestError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the transcription/analysis backend.
pub struct HttpInterviewService {
    client: Client,
    base_url: String,
}

impl HttpInterviewService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn json_body(response: reqwest::Response) -> (bool, Value) {
        let ok = response.status().is_success();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (ok, body)
    }
}

#[async_trait]
impl InterviewService for HttpInterviewService {
    async fn upload(&self, name: &str, artifact: &AudioArtifact) -> Result<String> {
        let part = Part::bytes(artifact.bytes.clone())
            .file_name(artifact.file_name())
            .mime_str(&artifact.mime_hint)
            .map_err(|e| InquestError::Transport(format!("Invalid audio payload: {e}")))?;
        let form = Form::new().text("name", name.to_string()).part("file", part);

        debug!(
            "Uploading {} ({} bytes)",
            artifact.file_name(),
            artifact.bytes.len()
        );
        let response = self
            .client
            .post(self.endpoint("/interview"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| InquestError::Transport(format!("Failed to save interview: {e}")))?;

        let (ok, body) = Self::json_body(response).await;
        transcript_from_response(ok, &body)
    }

    async fn analyze(&self, name: &str) -> Result<f64> {
        let form = Form::new().text("name", name.to_string());
        let response = self
            .client
            .post(self.endpoint("/analyze"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| InquestError::Transport(format!("Analysis failed: {e}")))?;

        let (ok, body) = Self::json_body(response).await;
        guilt_from_response(ok, &body)
    }

    async fn list(&self) -> Result<Vec<InterviewRecord>> {
        let response = self
            .client
            .get(self.endpoint("/interviews"))
            .send()
            .await
            .map_err(|e| InquestError::Transport(format!("Failed to fetch interviews: {e}")))?;

        if !response.status().is_success() {
            return Err(InquestError::Transport(
                "Failed to fetch interviews".to_string(),
            ));
        }
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(records_from_response(body))
    }

    async fn reset(&self) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint("/interviews"))
            .send()
            .await
            .map_err(|e| InquestError::Transport(format!("Failed to reset interviews: {e}")))?;

        if !response.status().is_success() {
            return Err(InquestError::Transport(
                "Failed to reset interviews".to_string(),
            ));
        }
        info!("All stored interviews deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let service = HttpInterviewService::new("http://localhost:8000/");
        assert_eq!(
            service.endpoint("/interview"),
            "http://localhost:8000/interview"
        );
    }
}
