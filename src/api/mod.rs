//! Client contracts for the transcription/analysis backend.
//!
//! The workflow engine talks to the backend through the [`InterviewService`]
//! trait so it can run against a scripted double in tests. Response shaping
//! lives here as plain functions; the wire client is in [`http`].

pub mod http;

pub use http::HttpInterviewService;

use crate::audio::AudioArtifact;
use crate::{InquestError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stored interview as reported by the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub name: String,
    #[serde(default)]
    pub guilt_level: Option<f64>,
    #[serde(default)]
    pub transcript: Option<String>,
}

impl InterviewRecord {
    /// Usable analysis score, if any. The backend stores `-1` until an
    /// interview has been analyzed.
    pub fn guilt_score(&self) -> Option<f64> {
        self.guilt_level.filter(|g| g.is_finite() && *g >= 0.0)
    }

    pub fn guilt_label(&self) -> String {
        match self.guilt_score() {
            Some(score) => format!("{score:.0}"),
            None => "Unknown".to_string(),
        }
    }
}

/// The transcription/storage/analysis backend.
#[async_trait]
pub trait InterviewService: Send + Sync {
    /// Store the artifact under `name` and return the transcript.
    async fn upload(&self, name: &str, artifact: &AudioArtifact) -> Result<String>;

    /// Run guilt analysis for a stored interview and return the score.
    async fn analyze(&self, name: &str) -> Result<f64>;

    /// Fetch all stored interviews.
    async fn list(&self) -> Result<Vec<InterviewRecord>>;

    /// Delete every stored interview.
    async fn reset(&self) -> Result<()>;
}

/// A service-reported error field. Present means failure regardless of the
/// HTTP status.
fn service_error(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

/// Shape an upload response into a transcript.
pub(crate) fn transcript_from_response(ok: bool, body: &Value) -> Result<String> {
    if let Some(message) = service_error(body) {
        return Err(InquestError::Transport(message));
    }
    if !ok {
        return Err(InquestError::Transport(
            "Failed to save interview".to_string(),
        ));
    }
    Ok(body
        .get("transcript")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

/// Shape an analyze response into a guilt score.
pub(crate) fn guilt_from_response(ok: bool, body: &Value) -> Result<f64> {
    if let Some(message) = service_error(body) {
        return Err(InquestError::Transport(message));
    }
    if !ok {
        return Err(InquestError::Transport("Analysis failed".to_string()));
    }
    body.get("guilt_level")
        .and_then(Value::as_f64)
        .ok_or_else(|| InquestError::Transport("Analysis failed".to_string()))
}

/// Shape a listing body. A non-array body and entries without a usable name
/// are dropped rather than surfaced as errors.
pub(crate) fn records_from_response(body: Value) -> Vec<InterviewRecord> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<InterviewRecord>(item).ok())
            .filter(|record| !record.name.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transcript_from_success_body() {
        let body = json!({"message": "Interview added", "transcript": "they did it"});
        assert_eq!(
            transcript_from_response(true, &body).unwrap(),
            "they did it"
        );
    }

    #[test]
    fn test_error_field_beats_ok_status() {
        let body = json!({"error": "Failed to save file."});
        let err = transcript_from_response(true, &body).unwrap_err();
        assert!(matches!(err, InquestError::Transport(_)));
        assert_eq!(err.user_message(), "Failed to save file.");
    }

    #[test]
    fn test_non_2xx_without_error_field_is_transport_failure() {
        let body = json!({});
        assert!(transcript_from_response(false, &body).is_err());
    }

    #[test]
    fn test_missing_transcript_defaults_to_empty() {
        let body = json!({"message": "ok"});
        assert_eq!(transcript_from_response(true, &body).unwrap(), "");
    }

    #[test]
    fn test_guilt_from_response() {
        let body = json!({"name": "x", "guilt_level": 72});
        assert_eq!(guilt_from_response(true, &body).unwrap(), 72.0);

        let err = guilt_from_response(true, &json!({"error": "timeout"})).unwrap_err();
        assert_eq!(err.user_message(), "timeout");

        assert!(guilt_from_response(true, &json!({"name": "x"})).is_err());
    }

    #[test]
    fn test_records_tolerate_malformed_entries() {
        let body = json!([
            {"name": "Suspect 12", "guilt_level": 72, "transcript": "..."},
            {"name": "   "},
            {"guilt_level": 3},
            "garbage",
            {"name": "Suspect 13", "guilt_level": -1}
        ]);
        let records = records_from_response(body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Suspect 12");
        assert_eq!(records[1].name, "Suspect 13");
    }

    #[test]
    fn test_non_array_listing_is_empty() {
        assert!(records_from_response(json!({"error": "nope"})).is_empty());
        assert!(records_from_response(Value::Null).is_empty());
    }

    #[test]
    fn test_guilt_label_handles_sentinel() {
        let record = InterviewRecord {
            name: "a".into(),
            guilt_level: Some(-1.0),
            transcript: None,
        };
        assert_eq!(record.guilt_label(), "Unknown");
        assert_eq!(record.guilt_score(), None);

        let record = InterviewRecord {
            name: "b".into(),
            guilt_level: Some(72.0),
            transcript: None,
        };
        assert_eq!(record.guilt_label(), "72");
    }
}
