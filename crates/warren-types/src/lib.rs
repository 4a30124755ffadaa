//! Shared types for the warren gopher client.

pub mod error;

pub use error::{Result, WarrenError};
