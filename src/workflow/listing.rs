//! Stored-interview listing and the bulk reset flow.

use crate::api::{InterviewRecord, InterviewService};
use crate::InquestError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct ListingEvent {
    generation: u64,
    kind: ListingEventKind,
}

#[derive(Debug, Clone)]
enum ListingEventKind {
    Loaded(Vec<InterviewRecord>),
    LoadFailed(InquestError),
    ResetCompleted,
    ResetFailed(InquestError),
}

/// Drives the stored-interview screen: fetch on entry, manual refresh, and
/// the confirm-guarded bulk delete.
pub struct ListingController {
    service: Arc<dyn InterviewService>,
    runtime: Handle,
    event_tx: Sender<ListingEvent>,
    event_rx: Receiver<ListingEvent>,
    generation: u64,
    records: Vec<InterviewRecord>,
    busy: bool,
    error: Option<String>,
    /// A destructive reset has been requested and awaits confirmation.
    pub confirm_reset: bool,
}

impl ListingController {
    pub fn new(service: Arc<dyn InterviewService>, runtime: Handle) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            service,
            runtime,
            event_tx,
            event_rx,
            generation: 0,
            records: Vec::new(),
            busy: false,
            error: None,
            confirm_reset: false,
        }
    }

    pub fn records(&self) -> &[InterviewRecord] {
        &self.records
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Average guilt across analyzed interviews, with the analyzed count.
    pub fn guilt_summary(&self) -> Option<(f64, usize)> {
        let scores: Vec<f64> = self
            .records
            .iter()
            .filter_map(InterviewRecord::guilt_score)
            .collect();
        if scores.is_empty() {
            return None;
        }
        let average = scores.iter().sum::<f64>() / scores.len() as f64;
        Some((average, scores.len()))
    }

    /// Fetch the stored interviews. Ignored while another call is out.
    pub fn refresh(&mut self) {
        if self.busy {
            return;
        }
        self.busy = true;
        self.error = None;

        let service = Arc::clone(&self.service);
        let event_tx = self.event_tx.clone();
        let generation = self.generation;
        self.runtime.spawn(async move {
            let kind = match service.list().await {
                Ok(records) => ListingEventKind::Loaded(records),
                Err(e) => ListingEventKind::LoadFailed(e),
            };
            let _ = event_tx.send(ListingEvent { generation, kind });
        });
    }

    /// Destructive bulk delete. Call only after the user has confirmed.
    pub fn reset_all(&mut self) {
        if self.busy {
            return;
        }
        self.confirm_reset = false;
        self.busy = true;
        self.error = None;

        let service = Arc::clone(&self.service);
        let event_tx = self.event_tx.clone();
        let generation = self.generation;
        self.runtime.spawn(async move {
            let kind = match service.reset().await {
                Ok(()) => ListingEventKind::ResetCompleted,
                Err(e) => ListingEventKind::ResetFailed(e),
            };
            let _ = event_tx.send(ListingEvent { generation, kind });
        });
    }

    /// Apply fetch/reset completions, discarding stale generations.
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            if event.generation != self.generation {
                debug!("Discarding stale listing event");
                continue;
            }
            match event.kind {
                ListingEventKind::Loaded(records) => {
                    info!("Loaded {} stored interviews", records.len());
                    self.records = records;
                    self.busy = false;
                }
                ListingEventKind::LoadFailed(e) => {
                    warn!("Interview listing failed: {}", e);
                    self.error = Some(e.user_message());
                    self.busy = false;
                }
                ListingEventKind::ResetCompleted => {
                    info!("Stored interviews cleared");
                    self.records.clear();
                    self.busy = false;
                    self.refresh();
                }
                ListingEventKind::ResetFailed(e) => {
                    warn!("Interview reset failed: {}", e);
                    self.error = Some(e.user_message());
                    self.busy = false;
                }
            }
        }
    }
}
