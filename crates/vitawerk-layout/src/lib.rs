// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// vitawerk-layout — Layout composition and pagination for the Vitawerk
// document pipeline.
//
// Provides the composer (resume record → layout tree), the measurement
// capability (text widths, word wrap) that render backends can override, and
// the paginator (layout tree → fixed-height A4 pages).

pub mod compose;
pub mod metrics;
pub mod paginate;
pub mod style;
pub mod tree;

pub use compose::compose;
pub use metrics::{HelveticaMetrics, TextMeasurer};
pub use paginate::{Page, Placement, paginate};
pub use style::LayoutStyle;
pub use tree::{LayoutTree, SectionKind};
