// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine-side trait definitions.
//
// Trackers and stores are pluggable backends. Tracking calls are
// fire-and-forget: no trait method here returns an error, failures are
// logged by the implementation and go no further.

use noctua_core::types::{AdRevenueEvent, CustomEvent, PurchaseEvent};

use crate::completion::Completion;

/// What the bridge forwards into.
///
/// Every method returns promptly. `purchase_item` may finish later on any
/// thread, but must complete the `Completion` exactly once; the type makes a
/// second completion impossible and completes on drop if forgotten.
pub trait Engine: Send + Sync {
    fn track_ad_revenue(&self, event: AdRevenueEvent);

    fn track_purchase(&self, event: PurchaseEvent);

    fn track_custom_event(&self, event: CustomEvent);

    fn purchase_item(&self, product_id: &str, completion: Completion);
}

/// A destination for tracking events (collector, attribution SDK, log).
pub trait TrackerService: Send + Sync {
    /// Short name used in logs (e.g. "http").
    fn name(&self) -> &str;

    fn track_ad_revenue(&self, event: &AdRevenueEvent);

    fn track_purchase(&self, event: &PurchaseEvent);

    /// Custom events, with or without revenue.
    fn track_custom_event(&self, event: &CustomEvent);
}

/// A store that can run an in-app purchase flow.
pub trait IapService: Send + Sync {
    /// Short name used in logs (e.g. "storekit", "play-billing").
    fn name(&self) -> &str;

    /// Start a purchase for `product_id` and complete `completion` when the
    /// store resolves it.
    fn purchase_item(&self, product_id: &str, completion: Completion);
}
