//! Indicator device notifications.
//!
//! The physical indicator is ambiance, not correctness-critical: commands
//! are throttled, delivered fire-and-forget, and delivery failures never
//! reach the workflow.

use crate::config::IndicatorConfig;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{debug, trace};
use uuid::Uuid;

/// Minimum interval before an identical command is sent again.
pub const MIN_RESEND_INTERVAL: Duration = Duration::from_millis(750);

/// One RGB command for the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorCommand {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl IndicatorCommand {
    /// Shown while analysis is pending or has no usable outcome.
    pub const NEUTRAL: Self = Self::rgb(255, 255, 255);
    /// Shown when the guilt score reaches the threshold.
    pub const HIGH: Self = Self::rgb(255, 0, 0);
    /// Shown when the guilt score stays below the threshold.
    pub const LOW: Self = Self::rgb(0, 255, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Build a command from unclamped channel values.
    pub fn from_unclamped(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red: clamp_channel(red),
            green: clamp_channel(green),
            blue: clamp_channel(blue),
        }
    }
}

fn clamp_channel(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Map a guilt score to a color: high at or above the threshold, low below
/// it, neutral when the score is not a finite number.
pub fn color_for_guilt(score: f64, threshold: f64) -> IndicatorCommand {
    if !score.is_finite() {
        IndicatorCommand::NEUTRAL
    } else if score >= threshold {
        IndicatorCommand::HIGH
    } else {
        IndicatorCommand::LOW
    }
}

/// Same-command suppression state.
///
/// The process-wide instance is shared across workflow instances so two
/// concurrent workflows cannot flood the device. This is a throttle, not a
/// rate limit: a different command always passes immediately.
pub struct Throttle {
    last: Mutex<Option<(IndicatorCommand, Instant)>>,
}

impl Throttle {
    pub const fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// The shared process-wide throttle.
    pub fn global() -> &'static Throttle {
        static GLOBAL: Throttle = Throttle::new();
        &GLOBAL
    }

    /// Record a delivery attempt. `false` means the command repeats the
    /// previous delivery inside the minimum interval and must be dropped.
    pub fn admit(&self, command: IndicatorCommand) -> bool {
        self.admit_at(command, Instant::now())
    }

    fn admit_at(&self, command: IndicatorCommand, now: Instant) -> bool {
        let mut last = self.last.lock();
        if let Some((previous, at)) = *last {
            if previous == command && now.saturating_duration_since(at) < MIN_RESEND_INTERVAL {
                return false;
            }
        }
        *last = Some((command, now));
        true
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort delivery channel. Implementations swallow failures.
#[async_trait]
pub trait IndicatorTransport: Send + Sync {
    async fn deliver(&self, command: IndicatorCommand);
}

/// GET-style gateway in front of the LED device.
pub struct HttpIndicatorTransport {
    client: Client,
    base_url: String,
}

impl HttpIndicatorTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(2))
            .timeout(Duration::from_secs(3))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn color_url(&self, command: IndicatorCommand) -> String {
        // Trailing token busts caches between identical commands
        format!(
            "{}/color?r={}&g={}&b={}&_={}",
            self.base_url,
            command.red,
            command.green,
            command.blue,
            Uuid::new_v4().simple()
        )
    }
}

#[async_trait]
impl IndicatorTransport for HttpIndicatorTransport {
    async fn deliver(&self, command: IndicatorCommand) {
        let url = self.color_url(command);
        match self.client.get(&url).send().await {
            Ok(response) => trace!("Indicator responded {}", response.status()),
            Err(e) => debug!("Indicator delivery failed: {}", e),
        }
    }
}

/// Facade the workflow uses to signal the device.
pub struct IndicatorNotifier {
    enabled: bool,
    threshold: f64,
    transport: Arc<dyn IndicatorTransport>,
    throttle: &'static Throttle,
    runtime: Handle,
}

impl IndicatorNotifier {
    pub fn new(
        config: &IndicatorConfig,
        transport: Arc<dyn IndicatorTransport>,
        runtime: Handle,
    ) -> Self {
        Self::with_throttle(config, transport, runtime, Throttle::global())
    }

    /// Construct with an explicit throttle instead of the process-wide one.
    pub fn with_throttle(
        config: &IndicatorConfig,
        transport: Arc<dyn IndicatorTransport>,
        runtime: Handle,
        throttle: &'static Throttle,
    ) -> Self {
        Self {
            enabled: config.enabled,
            threshold: config.guilt_threshold,
            transport,
            throttle,
            runtime,
        }
    }

    /// The configured color for a settled analysis.
    pub fn color_for(&self, score: f64) -> IndicatorCommand {
        color_for_guilt(score, self.threshold)
    }

    /// Queue a command for delivery. Non-blocking; a repeat of the previous
    /// command inside the minimum interval is dropped.
    pub fn notify(&self, command: IndicatorCommand) {
        if !self.enabled {
            return;
        }
        if !self.throttle.admit(command) {
            trace!("Indicator command suppressed: {:?}", command);
            return;
        }

        let transport = Arc::clone(&self.transport);
        self.runtime.spawn(async move {
            transport.deliver(command).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_channel() {
        assert_eq!(clamp_channel(-20.0), 0);
        assert_eq!(clamp_channel(300.0), 255);
        assert_eq!(clamp_channel(127.6), 128);
        assert_eq!(clamp_channel(f64::NAN), 0);
    }

    #[test]
    fn test_from_unclamped() {
        let command = IndicatorCommand::from_unclamped(-1.0, 999.0, 64.0);
        assert_eq!(command, IndicatorCommand::rgb(0, 255, 64));
    }

    #[test]
    fn test_color_for_guilt_threshold() {
        assert_eq!(color_for_guilt(72.0, 60.0), IndicatorCommand::HIGH);
        assert_eq!(color_for_guilt(60.0, 60.0), IndicatorCommand::HIGH);
        assert_eq!(color_for_guilt(59.9, 60.0), IndicatorCommand::LOW);
        assert_eq!(color_for_guilt(0.0, 60.0), IndicatorCommand::LOW);
    }

    #[test]
    fn test_color_for_guilt_non_finite_is_neutral() {
        assert_eq!(color_for_guilt(f64::NAN, 60.0), IndicatorCommand::NEUTRAL);
        assert_eq!(
            color_for_guilt(f64::INFINITY, 60.0),
            IndicatorCommand::NEUTRAL
        );
        assert_eq!(
            color_for_guilt(f64::NEG_INFINITY, 60.0),
            IndicatorCommand::NEUTRAL
        );
    }

    #[test]
    fn test_throttle_suppresses_identical_within_window() {
        let throttle = Throttle::new();
        let t0 = Instant::now();

        assert!(throttle.admit_at(IndicatorCommand::HIGH, t0));
        assert!(!throttle.admit_at(IndicatorCommand::HIGH, t0 + Duration::from_millis(100)));
        assert!(!throttle.admit_at(IndicatorCommand::HIGH, t0 + Duration::from_millis(749)));
    }

    #[test]
    fn test_throttle_readmits_after_window() {
        let throttle = Throttle::new();
        let t0 = Instant::now();

        assert!(throttle.admit_at(IndicatorCommand::HIGH, t0));
        assert!(throttle.admit_at(IndicatorCommand::HIGH, t0 + Duration::from_millis(750)));
    }

    #[test]
    fn test_throttle_passes_different_command_immediately() {
        let throttle = Throttle::new();
        let t0 = Instant::now();

        assert!(throttle.admit_at(IndicatorCommand::HIGH, t0));
        assert!(throttle.admit_at(IndicatorCommand::LOW, t0 + Duration::from_millis(1)));
        // The dedup key follows the last delivery
        assert!(!throttle.admit_at(IndicatorCommand::LOW, t0 + Duration::from_millis(2)));
        assert!(throttle.admit_at(IndicatorCommand::HIGH, t0 + Duration::from_millis(3)));
    }
}
