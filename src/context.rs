//! Per-request values consumed by the storage facade

use std::collections::HashMap;

/// Request-scoped inputs for key derivation and metadata capture
///
/// Every facade call receives the request values it needs explicitly;
/// the adapter holds no ambient request state.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Logical path of the resource being processed
    pub path: String,

    /// Client advertised WebP support
    pub accepts_webp: bool,

    /// Outgoing response headers, captured as object metadata on
    /// result-storage writes when metadata capture is enabled
    pub response_headers: HashMap<String, String>,
}

impl RequestContext {
    /// Context for a bare path with no capability flags
    pub fn for_path<P: Into<String>>(path: P) -> Self {
        RequestContext {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Context for a path from a client that accepts WebP
    pub fn with_webp<P: Into<String>>(path: P) -> Self {
        RequestContext {
            path: path.into(),
            accepts_webp: true,
            ..Default::default()
        }
    }
}
