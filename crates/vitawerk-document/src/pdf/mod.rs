// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — the two PDF-producing backends: raster (snapshot bitmaps
// embedded one per page) and vector (native text operations).

pub mod raster;
pub mod vector;

pub use raster::RasterBackend;
pub use vector::VectorBackend;
