//! Keybox Core - Foundational Types and Abstractions
//!
//! This crate provides the vocabulary shared by the keybox engine and its
//! front-ends: the error type, rewrite configuration, the key entry response
//! exchanged with callers, and the key material provider interface.

pub mod config;
pub mod error;
pub mod provider;
pub mod response;

// Re-export commonly used types
pub use config::{LogLevel, RewriteConfig, DISABLE_REWRITE_ENV};
pub use error::{KeyboxError, Result};
pub use provider::{KeyAlgorithm, KeyMaterialProvider};
pub use response::{KeyEntryResponse, KeyMetadata};

/// Keybox version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
