//! Codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the codec adapter: it reports what an input
//! is ([`ImageBackend::identify`]) and turns an input into encoded bytes
//! ([`ImageBackend::encode`]). Everything above it (planning, file writes,
//! logging) is codec-agnostic.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::EncodeParams;
use crate::types::SourceFormat;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: SourceFormat,
}

/// Trait for codec backends.
pub trait ImageBackend {
    /// Read dimensions and container format without a full decode.
    fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError>;

    /// Decode the source, resize if asked, and return the encoded bytes.
    fn encode(&self, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}
