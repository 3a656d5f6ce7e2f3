// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-shot purchase completion.
//
// A `Completion` is consumed by the call that completes it, so it cannot fire
// twice. If the engine or store drops it without completing, `Drop` fires it
// with a failure, so it cannot stay silent either.

use std::sync::Arc;

use noctua_core::types::PurchaseResult;

/// Message delivered when a purchase flow ends without reporting a result.
pub const ABANDONED_MESSAGE: &str = "purchase flow ended without a result";

/// A unit of work handed to a [`CallbackExecutor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Decides where completion handlers run.
///
/// Stores resolve purchases on whatever thread they like. Hosts that require
/// callbacks on a particular thread (a UI main loop, a JVM-attached thread)
/// provide an executor that posts the job there.
pub trait CallbackExecutor: Send + Sync {
    fn execute(&self, job: Job);
}

/// Runs the handler on the completing thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateExecutor;

impl CallbackExecutor for ImmediateExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}

type Handler = Box<dyn FnOnce(PurchaseResult) + Send + 'static>;

/// Exactly-once handler for the outcome of a purchase.
pub struct Completion {
    handler: Option<Handler>,
    executor: Arc<dyn CallbackExecutor>,
}

impl Completion {
    /// Completion whose handler runs on the completing thread.
    pub fn new<F>(handler: F) -> Self
    where
        F: FnOnce(PurchaseResult) + Send + 'static,
    {
        Self::with_executor(handler, Arc::new(ImmediateExecutor))
    }

    /// Completion whose handler is dispatched through `executor`.
    pub fn with_executor<F>(handler: F, executor: Arc<dyn CallbackExecutor>) -> Self
    where
        F: FnOnce(PurchaseResult) + Send + 'static,
    {
        Self {
            handler: Some(Box::new(handler)),
            executor,
        }
    }

    /// Deliver the result.
    pub fn complete(mut self, result: PurchaseResult) {
        self.fire(result);
    }

    pub fn succeed(self, message: impl Into<String>) {
        self.complete(PurchaseResult::success(message));
    }

    pub fn fail(self, message: impl Into<String>) {
        self.complete(PurchaseResult::failure(message));
    }

    fn fire(&mut self, result: PurchaseResult) {
        if let Some(handler) = self.handler.take() {
            tracing::debug!(success = result.success, "completing purchase");
            self.executor.execute(Box::new(move || handler(result)));
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.handler.is_some() {
            tracing::warn!("purchase completion dropped without a result");
            self.fire(PurchaseResult::failure(ABANDONED_MESSAGE));
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.handler.is_some())
            .finish()
    }
}
