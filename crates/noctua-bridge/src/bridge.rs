// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge facade object.
//
// Translates host-shaped calls (primitive arguments plus a JSON-string or
// mapping payload) into engine events, and engine purchase results back into
// a host completion. Holds no state of its own beyond the engine handle and
// the executor used for completions.

use std::sync::Arc;

use noctua_core::payload::{PayloadInput, normalize};
use noctua_core::types::{AdRevenueEvent, CustomEvent, PurchaseEvent, PurchaseResult};
use noctua_engine::{CallbackExecutor, Completion, Engine, ImmediateExecutor};

/// Message delivered when the async purchase channel closes unexpectedly.
const CHANNEL_CLOSED_MESSAGE: &str = "purchase result channel closed";

/// Facade over an [`Engine`].
#[derive(Clone)]
pub struct Bridge {
    engine: Arc<dyn Engine>,
    executor: Arc<dyn CallbackExecutor>,
}

impl Bridge {
    /// Bridge whose purchase completions run on the thread the store
    /// completes on.
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self::with_executor(engine, Arc::new(ImmediateExecutor))
    }

    /// Bridge whose purchase completions are dispatched through `executor`
    /// (e.g. onto the host's UI thread).
    pub fn with_executor(engine: Arc<dyn Engine>, executor: Arc<dyn CallbackExecutor>) -> Self {
        Self { engine, executor }
    }

    pub fn track_ad_revenue<'a>(
        &self,
        source: &str,
        revenue: f64,
        currency: &str,
        payload: impl Into<PayloadInput<'a>>,
    ) {
        tracing::debug!(source, revenue, currency, "trackAdRevenue");
        self.engine.track_ad_revenue(AdRevenueEvent {
            source: source.to_owned(),
            revenue,
            currency: currency.to_owned(),
            payload: normalize(payload),
        });
    }

    pub fn track_purchase<'a>(
        &self,
        order_id: &str,
        amount: f64,
        currency: &str,
        payload: impl Into<PayloadInput<'a>>,
    ) {
        tracing::debug!(order_id, amount, currency, "trackPurchase");
        self.engine.track_purchase(PurchaseEvent {
            order_id: order_id.to_owned(),
            amount,
            currency: currency.to_owned(),
            payload: normalize(payload),
        });
    }

    pub fn track_custom_event<'a>(&self, event_name: &str, payload: impl Into<PayloadInput<'a>>) {
        tracing::debug!(event_name, "trackCustomEvent");
        self.engine
            .track_custom_event(CustomEvent::new(event_name, normalize(payload)));
    }

    pub fn track_custom_event_with_revenue<'a>(
        &self,
        event_name: &str,
        revenue: f64,
        currency: &str,
        payload: impl Into<PayloadInput<'a>>,
    ) {
        tracing::debug!(event_name, revenue, currency, "trackCustomEventWithRevenue");
        self.engine.track_custom_event(
            CustomEvent::new(event_name, normalize(payload)).with_revenue(revenue, currency),
        );
    }

    /// Start a purchase. `completion` is invoked exactly once, possibly
    /// later and on another thread (routed through this bridge's executor).
    pub fn purchase_item<F>(&self, product_id: &str, completion: F)
    where
        F: FnOnce(PurchaseResult) + Send + 'static,
    {
        tracing::debug!(product_id, "purchaseItem");
        let completion = Completion::with_executor(completion, Arc::clone(&self.executor));
        self.engine.purchase_item(product_id, completion);
    }

    /// Start a purchase and await its result.
    pub async fn purchase_item_async(&self, product_id: &str) -> PurchaseResult {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.purchase_item(product_id, move |result| {
            // Receiver gone means the caller stopped waiting.
            let _ = tx.send(result);
        });
        rx.await
            .unwrap_or_else(|_| PurchaseResult::failure(CHANNEL_CLOSED_MESSAGE))
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge").finish_non_exhaustive()
    }
}
