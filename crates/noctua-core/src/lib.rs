// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Noctua — Core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod payload;
pub mod types;

pub use config::NoctuaConfig;
pub use error::NoctuaError;
pub use payload::{Payload, PayloadInput, normalize, parse_payload};
pub use types::*;
