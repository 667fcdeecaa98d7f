//! Recording & analysis workflow engine.

pub mod controller;
pub mod listing;
pub mod state;

pub use controller::WorkflowController;
pub use listing::ListingController;
pub use state::{Phase, WorkflowState};
