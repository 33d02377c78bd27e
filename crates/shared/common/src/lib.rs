//! Common utilities shared by the identity crates.
//!
//! This crate provides:
//! - Unified store error handling
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{StoreError, StoreResult};
