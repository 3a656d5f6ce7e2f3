// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Noctua.

use thiserror::Error;

/// Top-level error type for all Noctua operations.
#[derive(Debug, Error)]
pub enum NoctuaError {
    // -- Configuration --
    #[error("config file noctuagg.json not found")]
    ConfigNotFound,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config key missing or empty: {0}")]
    MissingKey(String),

    // -- Payload --
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    // -- Lifecycle --
    #[error("Noctua SDK is not initialized")]
    NotInitialized,

    #[error("Noctua SDK is already initialized")]
    AlreadyInitialized,

    // -- Engine --
    #[error("tracker error: {0}")]
    Tracker(String),

    #[error("purchase failed: {0}")]
    Purchase(String),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("in-app purchase is not available on this platform")]
    PlatformUnavailable,

    // -- I/O --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NoctuaError>;
