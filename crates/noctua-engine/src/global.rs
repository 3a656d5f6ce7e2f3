// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide engine and callback-executor slots.
//
// Hosts call the bridge through a static surface, so exactly one engine is
// installed per process. Both slots are written once and never replaced.

use std::sync::{Arc, OnceLock};

use noctua_core::error::{NoctuaError, Result};

use crate::completion::{CallbackExecutor, ImmediateExecutor};
use crate::traits::Engine;

static ENGINE: OnceLock<Arc<dyn Engine>> = OnceLock::new();
static EXECUTOR: OnceLock<Arc<dyn CallbackExecutor>> = OnceLock::new();

/// Install the process-wide engine.
///
/// Fails with `AlreadyInitialized` if an engine is already installed; the
/// existing engine stays in place.
pub fn install(engine: Arc<dyn Engine>) -> Result<()> {
    ENGINE
        .set(engine)
        .map_err(|_| NoctuaError::AlreadyInitialized)
}

/// The installed engine, if any.
pub fn engine() -> Option<Arc<dyn Engine>> {
    ENGINE.get().cloned()
}

pub fn is_installed() -> bool {
    ENGINE.get().is_some()
}

/// Install the executor used for purchase completions started through the
/// static surface. Only the first installation takes effect.
pub fn install_executor(executor: Arc<dyn CallbackExecutor>) -> Result<()> {
    EXECUTOR
        .set(executor)
        .map_err(|_| NoctuaError::Bridge("callback executor already installed".into()))
}

/// The installed executor, or [`ImmediateExecutor`] when none was set.
pub fn executor() -> Arc<dyn CallbackExecutor> {
    match EXECUTOR.get() {
        Some(executor) => Arc::clone(executor),
        None => Arc::new(ImmediateExecutor),
    }
}
