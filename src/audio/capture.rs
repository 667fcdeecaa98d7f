//! Capture session lifecycle and the finalized audio artifact.
//!
//! A session owns the microphone exclusively while open. Incoming sample
//! chunks are pumped into an accumulation buffer for the final recording and
//! into a bounded window that feeds the live spectrum view.

use crate::audio::spectrum::SpectrumLoop;
use crate::{InquestError, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Samples retained for the live spectrum view.
const VIS_WINDOW_SAMPLES: usize = 2048;

/// Artifact name when the interview name has no usable characters.
const DEFAULT_SOURCE_NAME: &str = "recording";

/// Derive the artifact name from an interview name: lower-cased, with runs
/// of non-alphanumeric characters collapsed to a single `-`.
pub fn source_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(ch);
        } else {
            pending_separator = true;
        }
    }

    if out.is_empty() {
        DEFAULT_SOURCE_NAME.to_string()
    } else {
        out
    }
}

fn mime_for_extension(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "webm" => "audio/webm",
        "ogg" => "audio/ogg",
        "m4a" | "mp4" => "audio/mp4",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "audio/wav" => "wav",
        "audio/mpeg" => "mp3",
        "audio/webm" => "webm",
        "audio/ogg" => "ogg",
        "audio/mp4" => "m4a",
        "audio/flac" => "flac",
        _ => "bin",
    }
}

/// A finalized recording ready for submission.
///
/// Immutable once created; a new capture or a picked file supersedes the
/// previous artifact instead of mutating it.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub bytes: Vec<u8>,
    pub mime_hint: String,
    pub source_name: String,
}

impl AudioArtifact {
    /// Wrap the bytes of a finalized capture.
    pub fn from_capture(name: &str, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_hint: "audio/wav".to_string(),
            source_name: source_name(name),
        }
    }

    /// Accept a user-supplied audio file from disk.
    pub fn from_file(name: &str, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| InquestError::Validation(format!("Could not read audio file: {e}")))?;
        let mime_hint = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(mime_for_extension)
            .unwrap_or("application/octet-stream");

        Ok(Self {
            bytes,
            mime_hint: mime_hint.to_string(),
            source_name: source_name(name),
        })
    }

    /// File name used when the artifact goes over the wire.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.source_name, extension_for_mime(&self.mime_hint))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode mono f32 samples as 16-bit PCM WAV bytes.
///
/// Zero samples produce a valid header-only file; encoding targets memory
/// and never fails the caller.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    match try_encode_wav(samples, sample_rate) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("WAV encoding failed: {}", e);
            Vec::new()
        }
    }
}

fn try_encode_wav(samples: &[f32], sample_rate: u32) -> std::result::Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sample_rate.max(1),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            writer.write_sample(value)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// One open microphone handle.
///
/// At most one session is open per workflow controller. Opening arms the
/// spectrum loop against the same sample window; closing disarms it, joins
/// the pump, releases the device and encodes the buffered samples.
pub struct CaptureSession {
    #[cfg(feature = "audio-io")]
    mic: Option<crate::audio::input::MicInput>,
    pump: Option<JoinHandle<()>>,
    armed: Arc<AtomicBool>,
    samples: Arc<Mutex<Vec<f32>>>,
    window: Arc<Mutex<Vec<f32>>>,
    spectrum: SpectrumLoop,
    sample_rate: u32,
    artifact: Option<AudioArtifact>,
}

impl CaptureSession {
    /// Request exclusive access to the default input device.
    #[cfg(feature = "audio-io")]
    pub fn open() -> Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded(64);
        let mic = crate::audio::input::MicInput::open(tx)?;
        let sample_rate = mic.sample_rate();
        let mut session = Self::from_source(rx, sample_rate);
        session.mic = Some(mic);
        Ok(session)
    }

    #[cfg(not(feature = "audio-io"))]
    pub fn open() -> Result<Self> {
        Err(InquestError::DeviceUnavailable)
    }

    /// Build a session around an external sample source. `open()` puts a
    /// live microphone behind it; tests feed the channel directly.
    pub fn from_source(rx: Receiver<Vec<f32>>, sample_rate: u32) -> Self {
        let armed = Arc::new(AtomicBool::new(true));
        let samples = Arc::new(Mutex::new(Vec::new()));
        let window = Arc::new(Mutex::new(Vec::with_capacity(VIS_WINDOW_SAMPLES)));

        let pump_armed = Arc::clone(&armed);
        let pump_samples = Arc::clone(&samples);
        let pump_window = Arc::clone(&window);
        let pump = thread::spawn(move || {
            while pump_armed.load(Ordering::SeqCst) {
                match rx.recv_timeout(Duration::from_millis(10)) {
                    Ok(chunk) => {
                        pump_samples.lock().extend_from_slice(&chunk);

                        let mut window = pump_window.lock();
                        window.extend_from_slice(&chunk);
                        let len = window.len();
                        if len > VIS_WINDOW_SAMPLES {
                            window.drain(0..len - VIS_WINDOW_SAMPLES);
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("Capture pump stopped");
        });

        let spectrum = SpectrumLoop::arm(Arc::clone(&window));

        Self {
            #[cfg(feature = "audio-io")]
            mic: None,
            pump: Some(pump),
            armed,
            samples,
            window,
            spectrum,
            sample_rate,
            artifact: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Latest spectrum bar heights.
    pub fn spectrum_bars(&self) -> Vec<f32> {
        self.spectrum.bars()
    }

    /// Stop buffering and finalize the recording.
    ///
    /// Disarms the spectrum loop and joins the pump before returning, so no
    /// tick or sample arrives afterwards. Idempotent: a second close returns
    /// the artifact from the first.
    pub fn close(&mut self, name: &str) -> AudioArtifact {
        if let Some(artifact) = &self.artifact {
            return artifact.clone();
        }

        self.spectrum.disarm();
        self.armed.store(false, Ordering::SeqCst);
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
        #[cfg(feature = "audio-io")]
        {
            self.mic = None;
        }

        let samples = std::mem::take(&mut *self.samples.lock());
        self.window.lock().clear();
        info!(
            "Capture closed with {} samples at {} Hz",
            samples.len(),
            self.sample_rate
        );

        let bytes = encode_wav(&samples, self.sample_rate);
        let artifact = AudioArtifact::from_capture(name, bytes);
        self.artifact = Some(artifact.clone());
        artifact
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.spectrum.disarm();
        self.armed.store(false, Ordering::SeqCst);
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_source_name_sanitization() {
        assert_eq!(source_name("Suspect 12"), "suspect-12");
        assert_eq!(source_name("  Suspect #12!  "), "suspect-12");
        assert_eq!(source_name("A__b..c"), "a-b-c");
        assert_eq!(source_name("!!!"), "recording");
        assert_eq!(source_name(""), "recording");
    }

    #[test]
    fn test_artifact_file_name_follows_mime() {
        let artifact = AudioArtifact::from_capture("Suspect 12", vec![0u8; 4]);
        assert_eq!(artifact.file_name(), "suspect-12.wav");
        assert_eq!(artifact.mime_hint, "audio/wav");
    }

    #[test]
    fn test_mime_lookup_by_extension() {
        assert_eq!(mime_for_extension("MP3"), "audio/mpeg");
        assert_eq!(mime_for_extension("webm"), "audio/webm");
        assert_eq!(mime_for_extension("xyz"), "application/octet-stream");
    }

    #[test]
    fn test_encode_wav_empty_input_is_valid() {
        let bytes = encode_wav(&[], 16_000);
        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn test_encode_wav_round_trips_sample_count() {
        let samples: Vec<f32> = (0..480).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let bytes = encode_wav(&samples, 48_000);
        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(reader.len(), 480);
        assert_eq!(reader.spec().sample_rate, 48_000);
        assert_eq!(reader.spec().channels, 1);
    }

    #[test]
    fn test_close_with_zero_chunks_returns_valid_artifact() {
        let (_tx, rx) = bounded::<Vec<f32>>(4);
        let mut session = CaptureSession::from_source(rx, 16_000);
        let artifact = session.close("Suspect 12");

        assert_eq!(artifact.source_name, "suspect-12");
        assert_eq!(artifact.mime_hint, "audio/wav");
        // Header-only WAV, still decodable
        let reader = hound::WavReader::new(std::io::Cursor::new(artifact.bytes)).unwrap();
        assert_eq!(reader.len(), 0);
        assert!(!session.is_open());
    }

    #[test]
    fn test_close_is_idempotent() {
        let (tx, rx) = bounded::<Vec<f32>>(4);
        let mut session = CaptureSession::from_source(rx, 16_000);
        tx.send(vec![0.1; 256]).unwrap();
        std::thread::sleep(Duration::from_millis(50));

        let first = session.close("one");
        let second = session.close("two");
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.source_name, second.source_name);
    }

    #[test]
    fn test_session_accumulates_samples() {
        let (tx, rx) = bounded::<Vec<f32>>(8);
        let mut session = CaptureSession::from_source(rx, 16_000);
        assert!(session.is_open());

        for _ in 0..4 {
            tx.send(vec![0.25; 128]).unwrap();
        }
        std::thread::sleep(Duration::from_millis(100));

        let artifact = session.close("take");
        let reader = hound::WavReader::new(std::io::Cursor::new(artifact.bytes)).unwrap();
        assert_eq!(reader.len(), 512);
    }

    #[test]
    fn test_spectrum_bars_available_while_open() {
        let (tx, rx) = bounded::<Vec<f32>>(8);
        let mut session = CaptureSession::from_source(rx, 16_000);
        tx.send(vec![0.5; 2048]).unwrap();
        std::thread::sleep(Duration::from_millis(80));

        let bars = session.spectrum_bars();
        assert_eq!(bars.len(), crate::audio::spectrum::DISPLAY_BARS);
        let _ = session.close("take");
    }
}
