// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vitawerk — Core types, resume record, and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod resume;
pub mod types;

pub use config::AppConfig;
pub use error::VitawerkError;
pub use resume::*;
pub use types::*;
