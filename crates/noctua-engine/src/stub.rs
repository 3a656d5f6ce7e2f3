// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub store for builds where no native store has been registered.
//
// Every purchase fails with `PlatformUnavailable`. Real stores (StoreKit,
// Play Billing) are provided by the host through the bridge.

use noctua_core::error::NoctuaError;
use noctua_core::types::PurchaseResult;

use crate::completion::Completion;
use crate::traits::IapService;

/// Store that rejects every purchase.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl IapService for UnavailableStore {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn purchase_item(&self, product_id: &str, completion: Completion) {
        tracing::warn!(product_id, "IapService::purchase_item called on stub store");
        completion.complete(PurchaseResult::from(NoctuaError::PlatformUnavailable));
    }
}
