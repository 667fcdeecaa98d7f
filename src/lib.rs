pub mod api;
pub mod audio;
pub mod config;
pub mod indicator;
pub mod ui;
pub mod workflow;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum InquestError {
    #[error("No audio capture device available on this host")]
    DeviceUnavailable,

    #[error("Capture permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture stream error: {0}")]
    CaptureStream(String),

    #[error("{0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Channel error: {0}")]
    Channel(String),
}

impl InquestError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Device access needs explicit user action (permission prompt,
            // plugging in a microphone); never auto-retried
            InquestError::DeviceUnavailable => false,
            InquestError::PermissionDenied(_) => false,
            InquestError::CaptureStream(_) => false,
            // Fixable by correcting the input or retrying the request
            InquestError::Validation(_) => true,
            InquestError::Transport(_) => true,
            InquestError::Channel(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            InquestError::DeviceUnavailable => {
                "Recording is not supported on this machine.".to_string()
            }
            InquestError::PermissionDenied(_) => {
                "Microphone permission denied or unavailable.".to_string()
            }
            InquestError::CaptureStream(_) => {
                "The capture device stopped unexpectedly. Please try again.".to_string()
            }
            InquestError::Validation(msg) => msg.clone(),
            InquestError::Transport(msg) => msg.clone(),
            InquestError::Channel(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, InquestError>;
