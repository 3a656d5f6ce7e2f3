// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Noctua — Native platform bridge.
//!
//! Exposes the SDK's static surface to host applications: initialization,
//! ad-revenue, purchase and custom event tracking, and the item-purchase
//! flow. Rust hosts call the free functions below (or hold a [`Bridge`]
//! directly); iOS hosts link the C ABI in [`ffi`]; Android hosts load the JNI
//! exports in `android`.
//!
//! Tracking calls are fire-and-forget. Purchases complete exactly once.

pub mod bridge;
pub mod ffi;
pub mod logging;

#[cfg(target_os = "android")]
pub mod android;

use std::sync::Arc;

use noctua_core::config::NoctuaConfig;
use noctua_core::error::{NoctuaError, Result};
use noctua_core::payload::PayloadInput;
use noctua_core::types::PurchaseResult;
use noctua_engine::{CallbackExecutor, Completion, Engine, IapService, NoctuaEngine, global};

pub use bridge::Bridge;

/// Load `noctuagg.json` from the default locations and install the engine.
///
/// Calling again once an engine is installed is a no-op.
pub fn initialize() -> Result<()> {
    if global::is_installed() {
        tracing::debug!("Noctua already initialized");
        return Ok(());
    }
    let config = NoctuaConfig::load_default()?;
    initialize_with_config(config)
}

/// Install an engine built from an explicit configuration.
pub fn initialize_with_config(config: NoctuaConfig) -> Result<()> {
    initialize_with_store(config, None)
}

/// Like [`initialize_with_config`], with a host store for purchases.
pub fn initialize_with_store(
    config: NoctuaConfig,
    store: Option<Arc<dyn IapService>>,
) -> Result<()> {
    if global::is_installed() {
        tracing::debug!("Noctua already initialized");
        return Ok(());
    }
    let mut builder = NoctuaEngine::builder().configure(&config)?;
    if let Some(store) = store {
        builder = builder.store(store);
    }
    let engine = builder.build();
    tracing::info!(
        client_id = %config.client_id,
        trackers = ?engine.tracker_names(),
        store = engine.store_name(),
        "Noctua initialized"
    );
    initialize_with_engine(Arc::new(engine))
}

/// Install a caller-built engine.
pub fn initialize_with_engine(engine: Arc<dyn Engine>) -> Result<()> {
    match global::install(engine) {
        Ok(()) | Err(NoctuaError::AlreadyInitialized) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Route completions of [`purchase_item`] through `executor`, for hosts that
/// need callbacks on a particular thread.
///
/// May be called before or after initialization, but only once; later calls
/// fail and keep the first executor.
pub fn set_callback_executor(executor: Arc<dyn CallbackExecutor>) -> Result<()> {
    global::install_executor(executor)
}

/// Bridge over the installed engine, if `initialize` has succeeded.
pub fn global_bridge() -> Option<Bridge> {
    global::engine().map(|engine| Bridge::with_executor(engine, global::executor()))
}

fn with_bridge(operation: &str, f: impl FnOnce(&Bridge)) {
    match global_bridge() {
        Some(bridge) => f(&bridge),
        None => tracing::warn!(operation, "Noctua is not initialized, call dropped"),
    }
}

pub fn track_ad_revenue<'a>(
    source: &str,
    revenue: f64,
    currency: &str,
    payload: impl Into<PayloadInput<'a>>,
) {
    with_bridge("trackAdRevenue", |b| {
        b.track_ad_revenue(source, revenue, currency, payload)
    });
}

pub fn track_purchase<'a>(
    order_id: &str,
    amount: f64,
    currency: &str,
    payload: impl Into<PayloadInput<'a>>,
) {
    with_bridge("trackPurchase", |b| {
        b.track_purchase(order_id, amount, currency, payload)
    });
}

pub fn track_custom_event<'a>(event_name: &str, payload: impl Into<PayloadInput<'a>>) {
    with_bridge("trackCustomEvent", |b| b.track_custom_event(event_name, payload));
}

pub fn track_custom_event_with_revenue<'a>(
    event_name: &str,
    revenue: f64,
    currency: &str,
    payload: impl Into<PayloadInput<'a>>,
) {
    with_bridge("trackCustomEventWithRevenue", |b| {
        b.track_custom_event_with_revenue(event_name, revenue, currency, payload)
    });
}

/// Start a purchase on the installed engine.
///
/// Before initialization the completion fires immediately with a failure.
pub fn purchase_item<F>(product_id: &str, completion: F)
where
    F: FnOnce(PurchaseResult) + Send + 'static,
{
    match global_bridge() {
        Some(bridge) => bridge.purchase_item(product_id, completion),
        None => {
            tracing::warn!(product_id, "purchaseItem before initialization");
            Completion::with_executor(completion, global::executor())
                .complete(PurchaseResult::from(NoctuaError::NotInitialized));
        }
    }
}
