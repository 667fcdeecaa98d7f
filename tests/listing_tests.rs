//! Stored-interview listing and bulk reset tests.

use async_trait::async_trait;
use inquest::api::{InterviewRecord, InterviewService};
use inquest::audio::AudioArtifact;
use inquest::workflow::ListingController;
use inquest::{InquestError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

struct StoredBackend {
    records: Mutex<Vec<InterviewRecord>>,
    fail_list: bool,
}

impl StoredBackend {
    fn with_records(records: Vec<InterviewRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fail_list: false,
        }
    }

    fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_list: true,
        }
    }
}

#[async_trait]
impl InterviewService for StoredBackend {
    async fn upload(&self, _name: &str, _artifact: &AudioArtifact) -> Result<String> {
        Ok(String::new())
    }

    async fn analyze(&self, _name: &str) -> Result<f64> {
        Ok(0.0)
    }

    async fn list(&self) -> Result<Vec<InterviewRecord>> {
        if self.fail_list {
            return Err(InquestError::Transport(
                "Failed to fetch interviews".to_string(),
            ));
        }
        Ok(self.records.lock().clone())
    }

    async fn reset(&self) -> Result<()> {
        self.records.lock().clear();
        Ok(())
    }
}

fn record(name: &str, guilt: Option<f64>) -> InterviewRecord {
    InterviewRecord {
        name: name.to_string(),
        guilt_level: guilt,
        transcript: Some("...".to_string()),
    }
}

fn wait_until_idle(listing: &mut ListingController) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        listing.poll_events();
        if !listing.is_busy() {
            return;
        }
        assert!(Instant::now() < deadline, "listing never settled");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_refresh_loads_records() {
    let runtime = Runtime::new().expect("test runtime");
    let backend = Arc::new(StoredBackend::with_records(vec![
        record("Suspect 12", Some(72.0)),
        record("Witness 3", Some(-1.0)),
    ]));
    let mut listing = ListingController::new(backend, runtime.handle().clone());

    listing.refresh();
    assert!(listing.is_busy());
    wait_until_idle(&mut listing);

    assert_eq!(listing.records().len(), 2);
    assert_eq!(listing.records()[0].guilt_label(), "72");
    assert_eq!(listing.records()[1].guilt_label(), "Unknown");
}

#[test]
fn test_guilt_summary_skips_unanalyzed() {
    let runtime = Runtime::new().expect("test runtime");
    let backend = Arc::new(StoredBackend::with_records(vec![
        record("a", Some(80.0)),
        record("b", Some(40.0)),
        record("c", Some(-1.0)),
        record("d", None),
    ]));
    let mut listing = ListingController::new(backend, runtime.handle().clone());

    listing.refresh();
    wait_until_idle(&mut listing);

    let (average, count) = listing.guilt_summary().expect("two analyzed records");
    assert_eq!(count, 2);
    assert!((average - 60.0).abs() < f64::EPSILON);
}

#[test]
fn test_empty_listing_has_no_summary() {
    let runtime = Runtime::new().expect("test runtime");
    let backend = Arc::new(StoredBackend::with_records(Vec::new()));
    let mut listing = ListingController::new(backend, runtime.handle().clone());

    listing.refresh();
    wait_until_idle(&mut listing);

    assert!(listing.guilt_summary().is_none());
}

#[test]
fn test_load_failure_surfaces_message() {
    let runtime = Runtime::new().expect("test runtime");
    let backend = Arc::new(StoredBackend::failing());
    let mut listing = ListingController::new(backend, runtime.handle().clone());

    listing.refresh();
    wait_until_idle(&mut listing);

    assert!(listing.records().is_empty());
    assert_eq!(listing.error(), Some("Failed to fetch interviews"));
}

#[test]
fn test_reset_clears_records_and_refetches() {
    let runtime = Runtime::new().expect("test runtime");
    let backend = Arc::new(StoredBackend::with_records(vec![record(
        "Suspect 12",
        Some(72.0),
    )]));
    let mut listing = ListingController::new(backend, runtime.handle().clone());

    listing.refresh();
    wait_until_idle(&mut listing);
    assert_eq!(listing.records().len(), 1);

    listing.confirm_reset = true;
    listing.reset_all();
    assert!(!listing.confirm_reset, "confirmation consumed by the reset");
    wait_until_idle(&mut listing);

    assert!(listing.records().is_empty());
    assert!(listing.error().is_none());
}
