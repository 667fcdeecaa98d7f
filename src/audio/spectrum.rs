//! Frequency-domain view of the live capture.
//!
//! The analyzer reduces the most recent sample window to a fixed number of
//! display bars; the loop runs that reduction on its own thread at display
//! cadence while a capture session is open.

use parking_lot::Mutex;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// Number of display bars the spectrum is reduced to.
pub const DISPLAY_BARS: usize = 28;

/// FFT window size in samples.
pub const FFT_SIZE: usize = 1024;

/// Emphasis exponent biasing bar heights toward mid/high energy.
const BAR_EMPHASIS: f32 = 1.6;

/// One tick per display refresh, roughly 60 Hz.
const TICK: Duration = Duration::from_millis(16);

/// Reduces a sample window to `DISPLAY_BARS` heights in `[0, 1]`.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    hann: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let hann = (0..FFT_SIZE)
            .map(|i| {
                let phase = i as f32 * std::f32::consts::TAU / (FFT_SIZE as f32 - 1.0);
                0.5 * (1.0 - phase.cos())
            })
            .collect();

        Self {
            fft,
            buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            scratch,
            hann,
        }
    }

    /// Compute bar heights from the tail of `samples`.
    ///
    /// Inputs shorter than the FFT window are zero-padded at the front, so
    /// the first ticks after opening a session render quietly instead of
    /// failing.
    pub fn bars(&mut self, samples: &[f32]) -> Vec<f32> {
        let start = samples.len().saturating_sub(FFT_SIZE);
        let window = &samples[start..];
        let offset = FFT_SIZE - window.len();

        for slot in self.buffer.iter_mut().take(offset) {
            *slot = Complex::new(0.0, 0.0);
        }
        for (i, &sample) in window.iter().enumerate() {
            let idx = offset + i;
            self.buffer[idx] = Complex::new(sample * self.hann[idx], 0.0);
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        // Half-spectrum magnitude of a Hann-windowed full-scale tone peaks
        // near FFT_SIZE / 4
        let half = FFT_SIZE / 2;
        let reference = FFT_SIZE as f32 / 4.0;

        let mut bars = Vec::with_capacity(DISPLAY_BARS);
        for bar in 0..DISPLAY_BARS {
            let from = bar * half / DISPLAY_BARS;
            let to = ((bar + 1) * half / DISPLAY_BARS).max(from + 1);
            let mean = self.buffer[from..to].iter().map(|c| c.norm()).sum::<f32>()
                / (to - from) as f32;
            bars.push((mean / reference).clamp(0.0, 1.0).powf(BAR_EMPHASIS));
        }
        bars
    }
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Repeating render task tied 1:1 to an open capture session.
///
/// Purely a consumer of the shared sample window. Disarming joins the
/// worker, so no tick runs after `disarm` returns.
pub struct SpectrumLoop {
    armed: Arc<AtomicBool>,
    bars: Arc<Mutex<Vec<f32>>>,
    worker: Option<JoinHandle<()>>,
}

impl SpectrumLoop {
    /// Start ticking against the given sample window.
    pub fn arm(window: Arc<Mutex<Vec<f32>>>) -> Self {
        let armed = Arc::new(AtomicBool::new(true));
        let bars = Arc::new(Mutex::new(vec![0.0; DISPLAY_BARS]));

        let worker_armed = Arc::clone(&armed);
        let worker_bars = Arc::clone(&bars);
        let worker = thread::spawn(move || {
            let mut analyzer = SpectrumAnalyzer::new();
            while worker_armed.load(Ordering::SeqCst) {
                let snapshot = window.lock().clone();
                let next = analyzer.bars(&snapshot);
                *worker_bars.lock() = next;
                thread::sleep(TICK);
            }
            debug!("Spectrum loop stopped");
        });

        Self {
            armed,
            bars,
            worker: Some(worker),
        }
    }

    /// Latest published bar heights.
    pub fn bars(&self) -> Vec<f32> {
        self.bars.lock().clone()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Stop ticking. Blocks until the worker has exited.
    pub fn disarm(&mut self) {
        self.armed.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SpectrumLoop {
    fn drop(&mut self) {
        self.disarm();
    }
}
