//! The finite-state controller composing capture, submission and indicator
//! signaling.
//!
//! The controller runs on the UI thread. Pipeline steps complete on the
//! async runtime and report back over a channel; `poll_events` applies them
//! once per frame. Every completion carries the generation it was spawned
//! under, so results arriving after a reset or teardown are discarded
//! instead of mutating a state they no longer belong to.

use crate::api::InterviewService;
use crate::audio::{AudioArtifact, CaptureSession};
use crate::indicator::{IndicatorCommand, IndicatorNotifier};
use crate::workflow::state::{Phase, WorkflowState};
use crate::InquestError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Completion of one pipeline step, stamped with the controller generation
/// it was spawned under.
#[derive(Debug, Clone)]
struct WorkflowEvent {
    generation: u64,
    kind: EventKind,
}

#[derive(Debug, Clone)]
enum EventKind {
    UploadSucceeded { transcript: String },
    UploadFailed(InquestError),
    AnalyzeSucceeded { guilt_level: f64 },
    AnalyzeFailed(InquestError),
}

/// Finite state machine behind the capture screen.
///
/// At most one open capture session and one submission run exist at any
/// time; both are singletons guarded by phase checks.
pub struct WorkflowController {
    state: WorkflowState,
    session: Option<CaptureSession>,
    service: Arc<dyn InterviewService>,
    notifier: IndicatorNotifier,
    runtime: Handle,
    event_tx: Sender<WorkflowEvent>,
    event_rx: Receiver<WorkflowEvent>,
    generation: u64,
}

impl WorkflowController {
    pub fn new(
        service: Arc<dyn InterviewService>,
        notifier: IndicatorNotifier,
        runtime: Handle,
    ) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            state: WorkflowState::new(),
            session: None,
            service,
            notifier,
            runtime,
            event_tx,
            event_rx,
            generation: 0,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Mutable binding for the name input field.
    pub fn name_mut(&mut self) -> &mut String {
        &mut self.state.name
    }

    pub fn is_recording(&self) -> bool {
        self.state.phase == Phase::Recording
    }

    /// Latest spectrum bars while a session is open.
    pub fn spectrum_bars(&self) -> Option<Vec<f32>> {
        self.session.as_ref().map(CaptureSession::spectrum_bars)
    }

    /// `idle/recorded --start--> recording`. An open failure keeps the
    /// current phase; device errors are never auto-retried.
    pub fn start_recording(&mut self) {
        if !self.state.can_start_recording() {
            return;
        }
        self.state.error_message = None;

        match CaptureSession::open() {
            Ok(session) => {
                self.session = Some(session);
                self.state.phase = Phase::Recording;
                info!("Recording started");
            }
            Err(e) => {
                warn!("Could not open capture session: {}", e);
                self.state.error_message = Some(e.user_message());
            }
        }
    }

    /// `recording --stop--> recorded`, finalizing the capture into an
    /// artifact.
    pub fn stop_recording(&mut self) {
        if self.state.phase != Phase::Recording {
            return;
        }
        if let Some(mut session) = self.session.take() {
            let artifact = session.close(self.state.trimmed_name());
            info!(
                "Recording stopped, artifact {} ({} bytes)",
                artifact.file_name(),
                artifact.bytes.len()
            );
            self.state.artifact = Some(artifact);
        }
        self.state.phase = Phase::Recorded;
    }

    /// Replace the artifact with a user-supplied file.
    pub fn pick_file(&mut self, path: &Path) {
        if self.state.phase.is_in_flight() || self.state.phase.is_settled() {
            return;
        }
        match AudioArtifact::from_file(self.state.trimmed_name(), path) {
            Ok(artifact) => {
                debug!("Picked file {}", path.display());
                self.accept_artifact(artifact);
            }
            Err(e) => self.state.error_message = Some(e.user_message()),
        }
    }

    /// Accept a finalized artifact, superseding any previous one. An open
    /// session is closed first and its capture discarded.
    pub fn accept_artifact(&mut self, artifact: AudioArtifact) {
        if !matches!(
            self.state.phase,
            Phase::Idle | Phase::Recording | Phase::Recorded
        ) {
            return;
        }
        if let Some(mut session) = self.session.take() {
            let _ = session.close(self.state.trimmed_name());
            debug!("Open session discarded in favor of supplied artifact");
        }
        self.state.error_message = None;
        self.state.artifact = Some(artifact);
        self.state.phase = Phase::Recorded;
    }

    /// `recorded --submit--> uploading`; the two-phase pipeline then drives
    /// the workflow through events.
    ///
    /// Validation failures never reach the wire. A submission already in
    /// flight makes this a no-op (the phase guard rejects it).
    pub fn submit(&mut self) {
        if !self.state.can_submit() {
            debug!("Submit ignored in phase {:?}", self.state.phase);
            return;
        }

        let name = self.state.trimmed_name().to_string();
        if name.is_empty() {
            self.state.error_message = Some("Name is required.".to_string());
            return;
        }
        let Some(artifact) = self.state.artifact.clone() else {
            self.state.error_message = Some("Attach or record an audio file first.".to_string());
            return;
        };

        self.state.begin_submission();
        info!("Submitting interview '{}'", name);

        let service = Arc::clone(&self.service);
        let event_tx = self.event_tx.clone();
        let generation = self.generation;
        self.runtime.spawn(async move {
            let send = |kind: EventKind| {
                let _ = event_tx.send(WorkflowEvent { generation, kind });
            };

            match service.upload(&name, &artifact).await {
                Ok(transcript) => {
                    send(EventKind::UploadSucceeded { transcript });
                    match service.analyze(&name).await {
                        Ok(guilt_level) => send(EventKind::AnalyzeSucceeded { guilt_level }),
                        Err(e) => send(EventKind::AnalyzeFailed(e)),
                    }
                }
                Err(e) => send(EventKind::UploadFailed(e)),
            }
        });
    }

    /// Apply pipeline completions. Completions from a previous generation
    /// are discarded unseen.
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            if event.generation != self.generation {
                debug!("Discarding stale workflow event");
                continue;
            }
            self.apply(event.kind);
        }
    }

    fn apply(&mut self, kind: EventKind) {
        match kind {
            EventKind::UploadSucceeded { transcript } => {
                if self.state.phase != Phase::Uploading {
                    return;
                }
                self.state.transcript = Some(transcript);
                self.state.phase = Phase::Analyzing;
                self.notifier.notify(IndicatorCommand::NEUTRAL);
                info!("Upload complete, analysis started");
            }
            EventKind::UploadFailed(e) => {
                if self.state.phase != Phase::Uploading {
                    return;
                }
                // Full revert; the artifact stays so the operator can retry
                // without re-recording
                self.state.transcript = None;
                self.state.guilt_level = None;
                self.state.error_message = Some(e.user_message());
                self.state.phase = Phase::Recorded;
                warn!("Upload failed: {}", e);
            }
            EventKind::AnalyzeSucceeded { guilt_level } => {
                if self.state.phase != Phase::Analyzing {
                    return;
                }
                self.state.guilt_level = Some(guilt_level);
                self.state.phase = Phase::AnalyzedSuccess;
                self.notifier.notify(self.notifier.color_for(guilt_level));
                info!("Analysis complete, guilt level {}", guilt_level);
            }
            EventKind::AnalyzeFailed(e) => {
                if self.state.phase != Phase::Analyzing {
                    return;
                }
                // The saved upload stands; only the analysis is reported as
                // failed
                self.state.error_message = Some(e.user_message());
                self.state.phase = Phase::AnalyzedError;
                self.notifier.notify(IndicatorCommand::NEUTRAL);
                warn!("Analysis failed: {}", e);
            }
        }
    }

    /// Return to `idle`, discarding any open capture and ignoring any
    /// outstanding pipeline completions.
    pub fn reset(&mut self) {
        self.generation += 1;
        if let Some(mut session) = self.session.take() {
            let _ = session.close(self.state.trimmed_name());
        }
        self.state = WorkflowState::new();
        info!("Workflow reset");
    }

    /// Leave the capture flow. Permitted only once a submission has
    /// settled; returns whether the action was taken.
    pub fn finish(&mut self) -> bool {
        if !self.state.can_finish() {
            return false;
        }
        self.reset();
        true
    }
}
