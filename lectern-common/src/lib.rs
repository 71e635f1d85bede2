//! # Lectern Common Library
//!
//! Shared code for the Lectern services including:
//! - Error types
//! - Configuration loading and data directory resolution
//! - Event types (LecternEvent enum) and the EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
