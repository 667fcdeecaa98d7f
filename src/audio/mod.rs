pub mod capture;
#[cfg(feature = "audio-io")]
pub mod input;
pub mod spectrum;

pub use capture::{source_name, AudioArtifact, CaptureSession};
#[cfg(feature = "audio-io")]
pub use input::MicInput;
pub use spectrum::{SpectrumAnalyzer, SpectrumLoop, DISPLAY_BARS};
