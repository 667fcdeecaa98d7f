//! Workflow phases and the state snapshot the UI renders from.

use crate::audio::AudioArtifact;

/// Discrete state of the recording/analysis workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Recording,
    Recorded,
    Uploading,
    Analyzing,
    AnalyzedSuccess,
    AnalyzedError,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

impl Phase {
    /// Whether a submission is currently on the wire.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Phase::Uploading | Phase::Analyzing)
    }

    /// Whether a submission has settled, successfully or not.
    pub fn is_settled(self) -> bool {
        matches!(self, Phase::AnalyzedSuccess | Phase::AnalyzedError)
    }
}

/// Single source of truth for rendering the capture screen.
#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pub phase: Phase,
    pub name: String,
    pub artifact: Option<AudioArtifact>,
    pub transcript: Option<String>,
    pub error_message: Option<String>,
    pub guilt_level: Option<f64>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trimmed interview name used for submission and artifact naming.
    pub fn trimmed_name(&self) -> &str {
        self.name.trim()
    }

    /// Short status string mirroring the phase.
    pub fn status_line(&self) -> &'static str {
        match self.phase {
            Phase::Idle => "ready",
            Phase::Recording => "recording...",
            Phase::Recorded => "recorded",
            Phase::Uploading => "uploading...",
            Phase::Analyzing => "analyzing...",
            Phase::AnalyzedSuccess => "saved & analyzed",
            Phase::AnalyzedError => "saved (analysis failed)",
        }
    }

    pub fn can_start_recording(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Recorded)
    }

    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Recorded
    }

    /// The finish action is enabled only once a submission has settled,
    /// never mid-flight.
    pub fn can_finish(&self) -> bool {
        self.phase.is_settled()
    }

    /// Start a fresh submission attempt. Transcript and outcome always
    /// clear together.
    pub(crate) fn begin_submission(&mut self) {
        self.transcript = None;
        self.guilt_level = None;
        self.error_message = None;
        self.phase = Phase::Uploading;
    }
}
