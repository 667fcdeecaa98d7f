//! Reusable widgets for the console screens.

mod interviews;
mod recorder;
mod spectrum;

pub use interviews::{InterviewList, ListAction};
pub use recorder::{RecorderAction, RecorderPanel};
pub use spectrum::SpectrumBars;
