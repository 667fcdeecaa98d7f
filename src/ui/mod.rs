//! egui shell for the capture console.

pub mod app;
pub mod components;
pub mod theme;

pub use app::InquestApp;
pub use theme::Theme;
