// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Vitawerk.

use thiserror::Error;

/// Top-level error type for all Vitawerk operations.
#[derive(Debug, Error)]
pub enum VitawerkError {
    // -- Export errors --
    /// The export input is missing or unusable (e.g. no resume loaded).
    /// Not retryable until the caller fixes its state.
    #[error("export input unusable: {0}")]
    Input(String),

    /// A render backend failed mid-render (snapshot, encoding, layout).
    /// No partial artifact is produced.
    #[error("render failed: {0}")]
    Render(String),

    /// An external asset (e.g. a font file) could not be loaded. Absorbed
    /// with a fallback inside the pipeline; callers of `export` never see it.
    #[error("resource unavailable: {0}")]
    Resource(String),

    // -- Ambient --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VitawerkError>;
