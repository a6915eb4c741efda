//! Error types for tracecost-core.

// ==============================================================================
// Core Errors
// ==============================================================================

/// Top-level error type for the tracecost-core crate.
///
/// Most upstream failures are deliberately *not* surfaced through this type:
/// the traversal and attribution pipelines degrade to `None`/stub nodes and
/// record the failure quantitatively instead of aborting the run. `CoreError`
/// covers the cases where a caller still needs a structured cause — oracle
/// transport failures before the pipeline coerces them, store I/O, and
/// malformed upstream payloads.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("HTTP transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("entity store: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("invalid entity data: {0}")]
    InvalidEntityData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
