//! Position sample processing

pub mod debounce;

pub use debounce::{should_accept, FilterDecision, MovementFilter};
