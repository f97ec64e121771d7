// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The render backend seam. Three independent strategies implement the same
// capability interface and must produce visually equivalent documents; they
// differ only in serialization technology. Composition, not inheritance —
// the internal representations (bitmap, markup, page-description ops) share
// nothing worth a common base.

use std::path::PathBuf;

use vitawerk_core::config::AppConfig;
use vitawerk_core::error::Result;
use vitawerk_core::resume::ResumeRecord;
use vitawerk_core::types::{BackendKind, PageBox, ScaleMode};
use vitawerk_layout::style::LayoutStyle;
use vitawerk_layout::tree::LayoutTree;

/// Output of one render invocation.
#[derive(Debug, Clone)]
pub enum RenderedDocument {
    /// Finished PDF bytes (raster and vector backends).
    Pdf { bytes: Vec<u8>, page_count: usize },
    /// A self-contained styled HTML document (print-view backend). The
    /// pipeline never writes this to disk; the host opens it in a viewing
    /// context.
    Html(String),
}

impl RenderedDocument {
    pub fn page_count(&self) -> Option<usize> {
        match self {
            Self::Pdf { page_count, .. } => Some(*page_count),
            Self::Html(_) => None,
        }
    }
}

/// Per-invocation render parameters, derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub page: PageBox,
    pub margin_mm: f32,
    pub scale_mode: ScaleMode,
    /// Snapshot oversampling factor; the raster backend raises values
    /// below 2 to 2.
    pub oversample: u8,
    pub snapshot_font: Option<PathBuf>,
    pub style: LayoutStyle,
}

impl RenderOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page: PageBox::from_paper(config.paper_size),
            margin_mm: config.margin_mm,
            scale_mode: config.scale_mode,
            oversample: config.oversample,
            snapshot_font: config.snapshot_font.clone(),
            style: LayoutStyle::default(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// One interchangeable serialization strategy.
///
/// Backends receive both the record and its composed tree; each consumes
/// the representation its technology needs (the vector backend re-derives
/// layout from the record, the others read the tree).
pub trait RenderBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn render(
        &self,
        record: &ResumeRecord,
        tree: &LayoutTree,
        opts: &RenderOptions,
    ) -> Result<RenderedDocument>;
}
