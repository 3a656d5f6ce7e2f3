// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Noctua event collector client.
//
// Each tracking call becomes one JSON POST to the collector. Requests run on
// a small runtime owned by the tracker, so hosts calling from a plain native
// thread need no async context of their own. One attempt per event; the
// outcome is logged and never reported back to the caller.

use std::time::Duration;

use noctua_core::error::{NoctuaError, Result};
use noctua_core::types::{AdRevenueEvent, CustomEvent, EventEnvelope, PurchaseEvent};
use reqwest::Url;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::traits::TrackerService;

/// Upper bound for a single delivery.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts events to a Noctua collector endpoint.
pub struct HttpTracker {
    client: reqwest::Client,
    url: Url,
    runtime: Option<Runtime>,
}

impl HttpTracker {
    /// Create a tracker for the given collector URL.
    pub fn new(tracker_url: &str) -> Result<Self> {
        let url = Url::parse(tracker_url).map_err(|e| {
            NoctuaError::InvalidConfig(format!("trackerURL {tracker_url:?}: {e}"))
        })?;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NoctuaError::Tracker(format!("failed to create HTTP client: {e}")))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("noctua-tracker")
            .enable_all()
            .build()?;

        Ok(Self {
            client,
            url,
            runtime: Some(runtime),
        })
    }

    /// Collector endpoint.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    fn send(&self, envelope: EventEnvelope) {
        let Some(runtime) = self.runtime.as_ref() else {
            return;
        };

        let client = self.client.clone();
        let url = self.url.clone();
        let body = envelope.to_json();
        let event_name = envelope.name;
        let event_id = envelope.id;

        runtime.spawn(async move {
            match client.post(url).json(&body).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(event = %event_name, %event_id, "event delivered");
                }
                Ok(resp) => {
                    warn!(
                        event = %event_name,
                        %event_id,
                        status = %resp.status(),
                        "collector rejected event"
                    );
                }
                Err(e) => {
                    warn!(event = %event_name, %event_id, error = %e, "send event failed");
                }
            }
        });
    }
}

impl Drop for HttpTracker {
    fn drop(&mut self) {
        // Must not block: the last engine handle may go away inside an
        // async context.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl TrackerService for HttpTracker {
    fn name(&self) -> &str {
        "http"
    }

    fn track_ad_revenue(&self, event: &AdRevenueEvent) {
        self.send(EventEnvelope::ad_revenue(event));
    }

    fn track_purchase(&self, event: &PurchaseEvent) {
        self.send(EventEnvelope::purchase(event));
    }

    fn track_custom_event(&self, event: &CustomEvent) {
        self.send(EventEnvelope::custom(event));
    }
}

impl std::fmt::Debug for HttpTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTracker")
            .field("url", &self.url.as_str())
            .finish()
    }
}
