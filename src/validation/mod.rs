//! Sample validation

pub mod coordinates;

pub use coordinates::{CoordinateValidator, ValidationError};
