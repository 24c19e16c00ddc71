//! Core types for stevedore.
//!
//! This crate resolves the raw parameters a CI job hands to the plugin
//! ([`RawParams`]) into the immutable [`BuildConfig`] the publish pipeline
//! runs from, and owns the image reference rules shared by the tagging and
//! push steps.

pub mod config;
pub mod error;

pub use config::{BuildConfig, RawParams, DEFAULT_CONTEXT, DEFAULT_DOCKERFILE, DEFAULT_REGISTRY};
pub use error::{Error, Result};
