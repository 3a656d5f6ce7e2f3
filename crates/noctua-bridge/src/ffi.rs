// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// C ABI for iOS hosts.
//
// Mirrors the `NoctuaBridge` Objective-C class (JSON-string payload
// revision): the Objective-C shim forwards each class method to the
// function of the same shape here.
//
// ## Pointer contract
//
// - String arguments are NUL-terminated UTF-8, borrowed for the duration of
//   the call. NULL reads as the empty string; invalid UTF-8 is replaced.
// - Message pointers handed to host callbacks are valid only until the
//   callback returns. Copy them if they must outlive it.
// - `context` pointers are opaque to Rust and passed back untouched. They
//   must be safe to use from whichever thread completes the purchase.
//
// ## Host stores
//
// A host with a native store (StoreKit) registers a handler with
// `noctua_register_store`. Each purchase then reaches the handler as an
// owned `PurchaseRequest`, which the host must resolve exactly once with
// `noctua_purchase_resolve`. Resolving frees the request.

use std::ffi::{CStr, CString, c_char, c_void};
use std::sync::{Arc, OnceLock};

use noctua_core::config::NoctuaConfig;
use noctua_core::error::{NoctuaError, Result};
use noctua_core::types::PurchaseResult;
use noctua_engine::{Completion, IapService, global};

use crate::logging;

/// Completion callback for `noctua_purchase_item`.
pub type PurchaseCompletionFn =
    extern "C" fn(context: *mut c_void, success: bool, message: *const c_char);

/// Host store entry point. Receives ownership of `request`.
pub type StoreHandlerFn = extern "C" fn(product_id: *const c_char, request: *mut PurchaseRequest);

static STORE_HANDLER: OnceLock<StoreHandlerFn> = OnceLock::new();

/// A purchase awaiting resolution by the host store.
pub struct PurchaseRequest {
    completion: Completion,
}

/// Host context pointer carried to the completing thread.
struct HostContext(*mut c_void);

// SAFETY: the pointer is never dereferenced on the Rust side; the host
// guarantees it is usable from the completing thread (see pointer contract).
unsafe impl Send for HostContext {}

impl HostContext {
    fn into_raw(self) -> *mut c_void {
        self.0
    }
}

/// Copy a borrowed C string. NULL becomes the empty string.
///
/// # Safety
/// `ptr` must be NULL or point to a NUL-terminated buffer valid for the
/// duration of the call.
unsafe fn read_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    unsafe { CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned()
}

/// Build a C string, dropping interior NULs rather than failing.
fn to_cstring(s: &str) -> CString {
    CString::new(s.replace('\0', "")).unwrap_or_default()
}

/// Store that forwards purchases to the handler registered by the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfiStore;

impl IapService for FfiStore {
    fn name(&self) -> &str {
        "ffi"
    }

    fn purchase_item(&self, product_id: &str, completion: Completion) {
        let Some(handler) = STORE_HANDLER.get() else {
            tracing::warn!(product_id, "no host store registered");
            completion.complete(PurchaseResult::from(NoctuaError::PlatformUnavailable));
            return;
        };
        let request = Box::into_raw(Box::new(PurchaseRequest { completion }));
        let product_id = to_cstring(product_id);
        handler(product_id.as_ptr(), request);
    }
}

/// Initialize the SDK from the bundled `noctuagg.json`, searched in the
/// working directory and then beside the executable.
///
/// Installs a log subscriber if none is set. Returns `true` once an engine
/// is installed (including when it already was).
#[unsafe(no_mangle)]
pub extern "C" fn noctua_init() -> bool {
    logging::init_logging();

    if global::is_installed() {
        tracing::debug!("Noctua already initialized");
        return true;
    }
    install_ffi_engine(NoctuaConfig::load_default())
}

/// Initialize the SDK from a configuration document the host has already
/// read (for example from `Bundle.main`).
///
/// Same return contract as [`noctua_init`]. NULL is rejected as an empty
/// document.
///
/// # Safety
/// See the pointer contract in the module documentation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn noctua_init_with_config(config_json: *const c_char) -> bool {
    logging::init_logging();

    if global::is_installed() {
        tracing::debug!("Noctua already initialized");
        return true;
    }
    // SAFETY: forwarded caller contract.
    let json = unsafe { read_str(config_json) };
    install_ffi_engine(NoctuaConfig::from_json_str(&json))
}

fn install_ffi_engine(config: Result<NoctuaConfig>) -> bool {
    let result =
        config.and_then(|config| crate::initialize_with_store(config, Some(Arc::new(FfiStore))));

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Noctua initialization failed");
            false
        }
    }
}

/// Track ad revenue. `payload_json` may be NULL.
///
/// # Safety
/// See the pointer contract in the module documentation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn noctua_track_ad_revenue(
    source: *const c_char,
    revenue: f64,
    currency: *const c_char,
    payload_json: *const c_char,
) {
    // SAFETY: forwarded caller contract.
    let (source, currency, payload) =
        unsafe { (read_str(source), read_str(currency), read_str(payload_json)) };
    crate::track_ad_revenue(&source, revenue, &currency, &payload);
}

/// Track a purchase. `payload_json` may be NULL.
///
/// # Safety
/// See the pointer contract in the module documentation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn noctua_track_purchase(
    order_id: *const c_char,
    amount: f64,
    currency: *const c_char,
    payload_json: *const c_char,
) {
    // SAFETY: forwarded caller contract.
    let (order_id, currency, payload) =
        unsafe { (read_str(order_id), read_str(currency), read_str(payload_json)) };
    crate::track_purchase(&order_id, amount, &currency, &payload);
}

/// Track a custom event. `payload_json` may be NULL.
///
/// # Safety
/// See the pointer contract in the module documentation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn noctua_track_custom_event(
    event_name: *const c_char,
    payload_json: *const c_char,
) {
    // SAFETY: forwarded caller contract.
    let (event_name, payload) = unsafe { (read_str(event_name), read_str(payload_json)) };
    crate::track_custom_event(&event_name, &payload);
}

/// Track a custom event carrying revenue. `payload_json` may be NULL.
///
/// # Safety
/// See the pointer contract in the module documentation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn noctua_track_custom_event_with_revenue(
    event_name: *const c_char,
    revenue: f64,
    currency: *const c_char,
    payload_json: *const c_char,
) {
    // SAFETY: forwarded caller contract.
    let (event_name, currency, payload) =
        unsafe { (read_str(event_name), read_str(currency), read_str(payload_json)) };
    crate::track_custom_event_with_revenue(&event_name, revenue, &currency, &payload);
}

/// Start a purchase. `completion` is called exactly once with `context`.
///
/// A NULL `completion` is rejected and no purchase is started.
///
/// # Safety
/// See the pointer contract in the module documentation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn noctua_purchase_item(
    product_id: *const c_char,
    completion: Option<PurchaseCompletionFn>,
    context: *mut c_void,
) {
    // SAFETY: forwarded caller contract.
    let product_id = unsafe { read_str(product_id) };
    let Some(callback) = completion else {
        tracing::error!(product_id = %product_id, "purchaseItem called without a completion");
        return;
    };

    let context = HostContext(context);
    crate::purchase_item(&product_id, move |result| {
        let message = to_cstring(&result.message);
        callback(context.into_raw(), result.success, message.as_ptr());
    });
}

/// Register the host store. Only the first registration takes effect.
#[unsafe(no_mangle)]
pub extern "C" fn noctua_register_store(handler: Option<StoreHandlerFn>) -> bool {
    match handler {
        Some(handler) => STORE_HANDLER.set(handler).is_ok(),
        None => false,
    }
}

/// Resolve a purchase handed to the host store. Frees `request`.
///
/// Returns `false` for a NULL request.
///
/// # Safety
/// `request` must come from a store handler call and must not have been
/// resolved before. `message` follows the pointer contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn noctua_purchase_resolve(
    request: *mut PurchaseRequest,
    success: bool,
    message: *const c_char,
) -> bool {
    if request.is_null() {
        return false;
    }
    // SAFETY: `request` was produced by `Box::into_raw` in `FfiStore` and,
    // per the contract, is resolved only once.
    let request = unsafe { Box::from_raw(request) };
    // SAFETY: forwarded caller contract.
    let message = unsafe { read_str(message) };
    request.completion.complete(PurchaseResult { success, message });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::time::Duration;

    use serde_json::json;

    use crate::bridge::tests::RecordingEngine;

    fn installed() -> Arc<RecordingEngine> {
        static ENGINE: OnceLock<Arc<RecordingEngine>> = OnceLock::new();
        ENGINE
            .get_or_init(|| {
                let engine = Arc::new(RecordingEngine::default());
                crate::initialize_with_engine(engine.clone()).expect("install");
                engine
            })
            .clone()
    }

    struct Inbox {
        tx: Mutex<Sender<(bool, String)>>,
    }

    extern "C" fn deliver(context: *mut c_void, success: bool, message: *const c_char) {
        // SAFETY: tests pass a pointer to a live `Inbox`.
        let inbox = unsafe { &*(context as *const Inbox) };
        let message = unsafe { read_str(message) };
        inbox
            .tx
            .lock()
            .expect("lock")
            .send((success, message))
            .expect("send");
    }

    fn inbox() -> (Box<Inbox>, Receiver<(bool, String)>) {
        let (tx, rx) = mpsc::channel();
        (Box::new(Inbox { tx: Mutex::new(tx) }), rx)
    }

    fn purchase(product_id: &str) -> Vec<(bool, String)> {
        installed();
        let (inbox, rx) = inbox();
        let product_id = CString::new(product_id).expect("cstring");
        unsafe {
            noctua_purchase_item(
                product_id.as_ptr(),
                Some(deliver as PurchaseCompletionFn),
                &*inbox as *const Inbox as *mut c_void,
            );
        }
        let first = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("completion invoked");
        // Nothing else may arrive.
        let mut all = vec![first];
        all.extend(rx.recv_timeout(Duration::from_millis(100)).ok());
        all
    }

    #[test]
    fn tracking_calls_reach_installed_engine() {
        let engine = installed();
        let source = CString::new("ffi_admob").expect("cstring");
        let currency = CString::new("USD").expect("cstring");
        let payload = CString::new(r#"{"placement":"banner"}"#).expect("cstring");
        let event = CString::new("ffi_level_up").expect("cstring");
        let bad = CString::new("not valid json").expect("cstring");

        unsafe {
            noctua_track_ad_revenue(source.as_ptr(), 1.5, currency.as_ptr(), payload.as_ptr());
            noctua_track_custom_event(event.as_ptr(), bad.as_ptr());
            noctua_track_custom_event_with_revenue(
                event.as_ptr(),
                2.0,
                currency.as_ptr(),
                std::ptr::null(),
            );
        }

        let ads = engine.ad_revenue.lock().expect("lock");
        let ad = ads
            .iter()
            .find(|e| e.source == "ffi_admob")
            .expect("ad revenue forwarded");
        assert_eq!(ad.revenue, 1.5);
        assert_eq!(ad.payload.get("placement"), Some(&json!("banner")));

        let custom = engine.custom.lock().expect("lock");
        let mine: Vec<_> = custom.iter().filter(|e| e.name == "ffi_level_up").collect();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|e| e.payload.is_empty()));
        assert!(mine.iter().any(|e| e.revenue.is_some()));
    }

    #[test]
    fn null_strings_read_as_empty() {
        let engine = installed();
        let marker = CString::new("ffi_null_currency").expect("cstring");
        unsafe {
            noctua_track_purchase(marker.as_ptr(), 3.0, std::ptr::null(), std::ptr::null());
        }
        let purchases = engine.purchases.lock().expect("lock");
        let p = purchases
            .iter()
            .find(|p| p.order_id == "ffi_null_currency")
            .expect("forwarded");
        assert_eq!(p.currency, "");
        assert!(p.payload.is_empty());
    }

    #[test]
    fn purchase_success_delivered_once() {
        assert_eq!(purchase("sku_gold"), vec![(true, "purchase verified".to_string())]);
    }

    #[test]
    fn purchase_rejection_delivered_once() {
        assert_eq!(
            purchase("sku_invalid"),
            vec![(false, "product sku_invalid not found".to_string())]
        );
    }

    #[test]
    fn missing_completion_is_rejected() {
        installed();
        let product_id = CString::new("sku_gold").expect("cstring");
        unsafe { noctua_purchase_item(product_id.as_ptr(), None, std::ptr::null_mut()) };
    }

    extern "C" fn granting_store(product_id: *const c_char, request: *mut PurchaseRequest) {
        let product_id = unsafe { read_str(product_id) };
        let message = to_cstring(&format!("granted {product_id}"));
        let resolved = unsafe { noctua_purchase_resolve(request, true, message.as_ptr()) };
        assert!(resolved);
    }

    #[test]
    fn host_store_resolves_through_request() {
        assert!(noctua_register_store(Some(granting_store as StoreHandlerFn)));
        assert!(!noctua_register_store(Some(granting_store as StoreHandlerFn)));

        let (tx, rx) = mpsc::channel();
        FfiStore.purchase_item(
            "sku_gem",
            Completion::new(move |r| tx.send(r).expect("send")),
        );
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)).expect("resolved"),
            PurchaseResult::success("granted sku_gem")
        );
    }

    #[test]
    fn resolve_rejects_null_request() {
        assert!(!unsafe { noctua_purchase_resolve(std::ptr::null_mut(), true, std::ptr::null()) });
    }

    #[test]
    fn interior_nul_is_dropped() {
        assert_eq!(to_cstring("a\0b").to_str().expect("utf8"), "ab");
    }
}
