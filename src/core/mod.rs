//! Core module - Configuration, errors, and preset session state

pub mod config;
pub mod error;
pub mod presets;
pub mod session;
