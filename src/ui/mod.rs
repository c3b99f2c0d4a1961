//! UI components for the dashboard

pub mod editor;
pub mod preview;
pub mod settings;
pub mod sidebar;
