// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{BackendKind, PaperSize, ScaleMode};

/// In-memory settings for the export pipeline. Constructed at application
/// start; there is no on-disk configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Paper size for exported documents.
    pub paper_size: PaperSize,
    /// Uniform page margin in millimetres.
    pub margin_mm: f32,
    /// Backend used when the caller does not pick one.
    pub default_backend: BackendKind,
    /// Raster fit behavior for content taller than one page.
    pub scale_mode: ScaleMode,
    /// Snapshot oversampling factor for text sharpness. Values below 2 are
    /// raised to 2 by the raster backend.
    pub oversample: u8,
    /// Explicit TTF/OTF file for the raster snapshot. When unset (or
    /// unreadable) the backend falls back to a scan of common system fonts.
    pub snapshot_font: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            margin_mm: 15.0,
            default_backend: BackendKind::Raster,
            scale_mode: ScaleMode::Paginate,
            oversample: 2,
            snapshot_font: None,
        }
    }
}
