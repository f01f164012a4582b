//! Core types and constants for the GPS tracker

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
