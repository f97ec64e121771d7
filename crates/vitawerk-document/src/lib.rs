// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// vitawerk-document — Render backends and export orchestration for the
// Vitawerk document pipeline.
//
// Provides the three interchangeable backends (raster snapshot PDF, native
// vector PDF, print-view HTML), the off-screen snapshot surface they share,
// and the exporter that drives a backend to a named artifact.

pub mod backend;
pub mod export;
pub mod pdf;
pub mod printview;
pub mod snapshot;

// Re-export the primary types so callers can use `vitawerk_document::Exporter` etc.
pub use backend::{RenderBackend, RenderOptions, RenderedDocument};
pub use export::{ExportArtifact, Exporter};
pub use pdf::{RasterBackend, VectorBackend};
pub use printview::PrintViewBackend;
pub use snapshot::SnapshotFont;
