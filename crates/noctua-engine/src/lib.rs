// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Noctua — Tracking and commerce engine.
//
// The bridge never talks to a tracker or a store directly. It forwards into
// an `Engine`, which fans tracking events out to every registered
// `TrackerService` and hands purchases to a single `IapService`.

pub mod completion;
pub mod engine;
pub mod global;
pub mod http_tracker;
pub mod stub;
pub mod traits;

pub use completion::{CallbackExecutor, Completion, ImmediateExecutor};
pub use engine::{NoctuaEngine, NoctuaEngineBuilder};
pub use http_tracker::HttpTracker;
pub use stub::UnavailableStore;
pub use traits::{Engine, IapService, TrackerService};
