// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The default engine: tracker fan-out plus a single store.
//
// Tracking events are checked once here, then handed to every registered
// tracker in registration order. An event that fails the checks reaches no
// tracker at all.

use std::sync::Arc;

use noctua_core::config::NoctuaConfig;
use noctua_core::error::Result;
use noctua_core::types::{AdRevenueEvent, CustomEvent, PurchaseEvent};
use tracing::{debug, error, info, warn};

use crate::completion::Completion;
use crate::http_tracker::HttpTracker;
use crate::stub::UnavailableStore;
use crate::traits::{Engine, IapService, TrackerService};

/// Fan-out engine over trackers and one store.
pub struct NoctuaEngine {
    trackers: Vec<Arc<dyn TrackerService>>,
    store: Arc<dyn IapService>,
    iap_disabled: bool,
    custom_event_disabled: bool,
}

/// Builder for [`NoctuaEngine`].
pub struct NoctuaEngineBuilder {
    trackers: Vec<Arc<dyn TrackerService>>,
    store: Option<Arc<dyn IapService>>,
    iap_disabled: bool,
    custom_event_disabled: bool,
}

impl NoctuaEngine {
    pub fn builder() -> NoctuaEngineBuilder {
        NoctuaEngineBuilder {
            trackers: Vec::new(),
            store: None,
            iap_disabled: false,
            custom_event_disabled: false,
        }
    }

    /// Engine wired from configuration: the HTTP collector when the
    /// `noctua` section is present, and the stub store.
    pub fn from_config(config: &NoctuaConfig) -> Result<Self> {
        Ok(Self::builder().configure(config)?.build())
    }

    /// Names of the registered trackers, in dispatch order.
    pub fn tracker_names(&self) -> Vec<&str> {
        self.trackers.iter().map(|t| t.name()).collect()
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }
}

impl NoctuaEngineBuilder {
    /// Register a tracker. Trackers receive events in registration order.
    pub fn tracker(mut self, tracker: Arc<dyn TrackerService>) -> Self {
        self.trackers.push(tracker);
        self
    }

    /// Use `store` for purchases instead of the stub store.
    pub fn store(mut self, store: Arc<dyn IapService>) -> Self {
        self.store = Some(store);
        self
    }

    /// Apply the switches and built-in collector from `config`.
    pub fn configure(mut self, config: &NoctuaConfig) -> Result<Self> {
        self.iap_disabled = config.iap_disabled();
        self.custom_event_disabled = config.custom_event_disabled();

        match &config.noctua {
            Some(section) => {
                let tracker = HttpTracker::new(section.tracker_url())?;
                info!(url = tracker.url(), "HttpTracker initialized");
                self.trackers.push(Arc::new(tracker));
            }
            None => warn!("config for NoctuaService not found"),
        }

        Ok(self)
    }

    pub fn build(self) -> NoctuaEngine {
        let store = self.store.unwrap_or_else(|| Arc::new(UnavailableStore));
        debug!(
            trackers = self.trackers.len(),
            store = store.name(),
            iap_disabled = self.iap_disabled,
            "engine built"
        );
        NoctuaEngine {
            trackers: self.trackers,
            store,
            iap_disabled: self.iap_disabled,
            custom_event_disabled: self.custom_event_disabled,
        }
    }
}

/// Shared checks for ad-revenue and purchase events. Zero is a valid amount.
fn check_monetary(id_field: &str, id: &str, amount: f64, currency: &str) -> bool {
    if id.is_empty() {
        error!("{id_field} is empty");
        return false;
    }
    if !amount.is_finite() || amount < 0.0 {
        error!(amount, "amount is negative or not a number");
        return false;
    }
    if currency.is_empty() {
        error!("currency is empty");
        return false;
    }
    true
}

impl Engine for NoctuaEngine {
    fn track_ad_revenue(&self, event: AdRevenueEvent) {
        if !check_monetary("source", &event.source, event.revenue, &event.currency) {
            return;
        }
        for tracker in &self.trackers {
            tracker.track_ad_revenue(&event);
        }
    }

    fn track_purchase(&self, event: PurchaseEvent) {
        if !check_monetary("orderId", &event.order_id, event.amount, &event.currency) {
            return;
        }
        for tracker in &self.trackers {
            tracker.track_purchase(&event);
        }
    }

    fn track_custom_event(&self, event: CustomEvent) {
        if self.custom_event_disabled {
            warn!(event = %event.name, "custom event is disabled");
            return;
        }
        if event.name.is_empty() {
            error!("eventName is empty");
            return;
        }
        if let Some(revenue) = &event.revenue {
            if !check_monetary("eventName", &event.name, revenue.amount, &revenue.currency) {
                return;
            }
        }
        for tracker in &self.trackers {
            tracker.track_custom_event(&event);
        }
    }

    fn purchase_item(&self, product_id: &str, completion: Completion) {
        debug!(product_id, store = self.store.name(), "purchase requested");
        if product_id.is_empty() {
            completion.fail("product id is empty");
            return;
        }
        if self.iap_disabled {
            completion.fail("in-app purchase is disabled by configuration");
            return;
        }
        self.store.purchase_item(product_id, completion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use noctua_core::payload::{Payload, normalize};
    use noctua_core::types::PurchaseResult;

    struct RecordingTracker {
        name: &'static str,
        seen: Mutex<Vec<String>>,
    }

    impl RecordingTracker {
        fn named(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().expect("lock").clone()
        }
    }

    impl TrackerService for RecordingTracker {
        fn name(&self) -> &str {
            self.name
        }

        fn track_ad_revenue(&self, event: &AdRevenueEvent) {
            self.seen.lock().expect("lock").push(format!("ad:{}", event.source));
        }

        fn track_purchase(&self, event: &PurchaseEvent) {
            self.seen.lock().expect("lock").push(format!("purchase:{}", event.order_id));
        }

        fn track_custom_event(&self, event: &CustomEvent) {
            self.seen.lock().expect("lock").push(format!("custom:{}", event.name));
        }
    }

    struct GrantingStore;

    impl IapService for GrantingStore {
        fn name(&self) -> &str {
            "granting"
        }

        fn purchase_item(&self, product_id: &str, completion: Completion) {
            completion.succeed(format!("purchased {product_id}"));
        }
    }

    fn purchase(engine: &NoctuaEngine, product_id: &str) -> Vec<PurchaseResult> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.purchase_item(
            product_id,
            Completion::new(move |r| sink.lock().expect("lock").push(r)),
        );
        let seen = seen.lock().expect("lock");
        seen.clone()
    }

    fn ad(source: &str, revenue: f64, currency: &str) -> AdRevenueEvent {
        AdRevenueEvent {
            source: source.into(),
            revenue,
            currency: currency.into(),
            payload: Payload::new(),
        }
    }

    #[test]
    fn events_fan_out_to_every_tracker_in_order() {
        let a = RecordingTracker::named("a");
        let b = RecordingTracker::named("b");
        let engine = NoctuaEngine::builder()
            .tracker(a.clone())
            .tracker(b.clone())
            .build();
        assert_eq!(engine.tracker_names(), vec!["a", "b"]);

        engine.track_ad_revenue(ad("admob", 1.5, "USD"));
        engine.track_purchase(PurchaseEvent {
            order_id: "ORD-1".into(),
            amount: 9.99,
            currency: "USD".into(),
            payload: Payload::new(),
        });
        engine.track_custom_event(CustomEvent::new("level_up", normalize("{}")));

        let expected = vec!["ad:admob", "purchase:ORD-1", "custom:level_up"];
        assert_eq!(a.seen(), expected);
        assert_eq!(b.seen(), expected);
    }

    #[test]
    fn invalid_monetary_events_reach_no_tracker() {
        let t = RecordingTracker::named("t");
        let engine = NoctuaEngine::builder().tracker(t.clone()).build();

        engine.track_ad_revenue(ad("", 1.0, "USD"));
        engine.track_ad_revenue(ad("admob", -0.01, "USD"));
        engine.track_ad_revenue(ad("admob", f64::NAN, "USD"));
        engine.track_ad_revenue(ad("admob", 1.0, ""));
        engine.track_custom_event(
            CustomEvent::new("offer", Payload::new()).with_revenue(f64::INFINITY, "USD"),
        );

        assert!(t.seen().is_empty());
    }

    #[test]
    fn zero_revenue_is_accepted() {
        let t = RecordingTracker::named("t");
        let engine = NoctuaEngine::builder().tracker(t.clone()).build();
        engine.track_ad_revenue(ad("admob", 0.0, "USD"));
        assert_eq!(t.seen(), vec!["ad:admob"]);
    }

    #[test]
    fn empty_custom_event_name_is_dropped() {
        let t = RecordingTracker::named("t");
        let engine = NoctuaEngine::builder().tracker(t.clone()).build();
        engine.track_custom_event(CustomEvent::new("", Payload::new()));
        assert!(t.seen().is_empty());
    }

    #[test]
    fn custom_events_can_be_disabled_by_config() {
        let config = NoctuaConfig::from_json_str(
            r#"{"clientId":"c","noctua":{"trackerURL":"http://127.0.0.1:9/","customEventDisabled":true}}"#,
        )
        .expect("config");
        let t = RecordingTracker::named("t");
        let engine = NoctuaEngine::builder()
            .tracker(t.clone())
            .configure(&config)
            .expect("configure")
            .build();

        engine.track_custom_event(CustomEvent::new("level_up", Payload::new()));
        assert!(t.seen().is_empty());
        assert_eq!(engine.tracker_names(), vec!["t", "http"]);
    }

    #[test]
    fn config_without_service_section_has_no_collector() {
        let config = NoctuaConfig::from_json_str(r#"{"clientId":"c"}"#).expect("config");
        let engine = NoctuaEngine::from_config(&config).expect("engine");
        assert!(engine.tracker_names().is_empty());
        assert_eq!(engine.store_name(), "unavailable");
    }

    #[test]
    fn purchase_delegates_to_store() {
        let engine = NoctuaEngine::builder().store(Arc::new(GrantingStore)).build();
        assert_eq!(
            purchase(&engine, "sku_gold"),
            vec![PurchaseResult::success("purchased sku_gold")]
        );
    }

    #[test]
    fn purchase_without_store_fails_once() {
        let engine = NoctuaEngine::builder().build();
        let results = purchase(&engine, "sku_gold");
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
    }

    #[test]
    fn empty_product_id_fails_before_store() {
        let engine = NoctuaEngine::builder().store(Arc::new(GrantingStore)).build();
        assert_eq!(
            purchase(&engine, ""),
            vec![PurchaseResult::failure("product id is empty")]
        );
    }

    #[test]
    fn iap_disabled_by_config() {
        let config = NoctuaConfig::from_json_str(
            r#"{"clientId":"c","noctua":{"trackerURL":"http://127.0.0.1:9/","iapDisabled":true}}"#,
        )
        .expect("config");
        let engine = NoctuaEngine::builder()
            .store(Arc::new(GrantingStore))
            .configure(&config)
            .expect("configure")
            .build();
        let results = purchase(&engine, "sku_gold");
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
    }
}
