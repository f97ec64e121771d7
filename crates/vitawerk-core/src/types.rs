// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Vitawerk document pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a section entry in a resume record.
///
/// Opaque, generated at creation, and stable for the record's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Standard paper sizes the pipeline can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    Letter,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::Letter => (216, 279),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// Physical page dimensions content must fit within, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBox {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageBox {
    pub fn from_paper(paper: PaperSize) -> Self {
        let (w, h) = paper.dimensions_mm();
        Self {
            width_mm: w as f32,
            height_mm: h as f32,
        }
    }

    /// A4 portrait, the pipeline's fixed default.
    pub fn a4() -> Self {
        Self::from_paper(PaperSize::A4)
    }

    /// Usable height once a uniform margin is subtracted top and bottom.
    pub fn usable_height_mm(&self, margin_mm: f32) -> f32 {
        (self.height_mm - 2.0 * margin_mm).max(0.0)
    }

    /// Usable width once a uniform margin is subtracted left and right.
    pub fn usable_width_mm(&self, margin_mm: f32) -> f32 {
        (self.width_mm - 2.0 * margin_mm).max(0.0)
    }
}

/// How the raster backend fits content taller than a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    /// Split content across as many pages as needed (default).
    Paginate,
    /// Shrink the whole document uniformly onto one page.
    ShrinkToFit,
}

/// The interchangeable render backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// Snapshot pages to bitmaps and embed one image per PDF page.
    Raster,
    /// Emit native text operations into the PDF.
    Vector,
    /// Emit a standalone styled HTML document for the host's print dialog.
    PrintView,
}

impl BackendKind {
    /// File extension of the artifact this backend produces.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Raster | Self::Vector => "pdf",
            Self::PrintView => "html",
        }
    }
}

/// Progress events observable by the caller, at most three per export:
/// `Started`, then exactly one of `Succeeded` or `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportEvent {
    Started { backend: BackendKind },
    Succeeded { file_name: String },
    Failed { reason: String },
}
