//! # Configuration
//!
//! Client configuration: where the auth API lives, how long to wait for it,
//! and where the session record is persisted.

pub mod client;

pub use client::{ClientConfig, ConfigError};
