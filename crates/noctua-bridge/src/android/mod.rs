// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Exports the native methods of `com.noctuagames.sdk.NoctuaBridge`:
//
// ```kotlin
// object NoctuaBridge {
//     external fun initNoctua(configJson: String, store: NoctuaStore?): Boolean
//     external fun trackAdRevenue(source: String, revenue: Double, currency: String, payloadJson: String?)
//     external fun trackPurchase(orderId: String, amount: Double, currency: String, payloadJson: String?)
//     external fun trackCustomEvent(eventName: String, payloadJson: String?)
//     external fun trackCustomEventWithRevenue(eventName: String, revenue: Double, currency: String, payloadJson: String?)
//     external fun purchaseItem(productId: String, callback: PurchaseCallback)
//     external fun resolvePurchase(handle: Long, success: Boolean, message: String?): Boolean
// }
// ```
//
// ## Architecture notes
//
// Android apps cannot read `noctuagg.json` from the working directory, so
// the host reads it from its assets and passes the document to `initNoctua`.
//
// Purchase callbacks (`PurchaseCallback.onComplete(boolean, String)`) are
// invoked on whichever thread the store completes on, after attaching it to
// the JVM. Hosts that need the main thread post from `onComplete` to the
// main `Looper`.
//
// A Kotlin `NoctuaStore` (Play Billing) receives `purchaseItem(String, long)`
// with an opaque handle and must pass it back exactly once to
// `resolvePurchase`. A store method that throws must not also resolve the
// handle; the bridge reclaims it and fails the purchase.

#![cfg(target_os = "android")]

use std::sync::Arc;

use jni::JNIEnv;
use jni::JavaVM;
use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jdouble, jlong};

use noctua_core::config::NoctuaConfig;
use noctua_core::types::PurchaseResult;
use noctua_engine::{Completion, IapService};

use crate::logging;

/// Copy a Java string. `null` and conversion failures read as empty.
fn read_jstring(env: &mut JNIEnv, s: &JString) -> String {
    if s.is_null() {
        return String::new();
    }
    match env.get_string(s) {
        Ok(java_str) => java_str.into(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read Java string");
            String::new()
        }
    }
}

/// Clear a pending Java exception so later JNI calls stay valid.
fn clear_exception(env: &mut JNIEnv) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}

// ---------------------------------------------------------------------------
// Store backed by a Kotlin object
// ---------------------------------------------------------------------------

/// [`IapService`] that forwards purchases to a Java `NoctuaStore`.
struct JniStore {
    vm: JavaVM,
    store: GlobalRef,
}

impl JniStore {
    fn dispatch(&self, product_id: &str, handle: jlong) -> jni::errors::Result<()> {
        let mut env = self.vm.attach_current_thread()?;
        let j_product_id = env.new_string(product_id)?;
        let result = env.call_method(
            self.store.as_obj(),
            "purchaseItem",
            "(Ljava/lang/String;J)V",
            &[JValue::Object(&j_product_id), JValue::Long(handle)],
        );
        if result.is_err() {
            clear_exception(&mut env);
        }
        result.map(|_| ())
    }
}

impl IapService for JniStore {
    fn name(&self) -> &str {
        "jni"
    }

    fn purchase_item(&self, product_id: &str, completion: Completion) {
        let handle = Box::into_raw(Box::new(completion)) as jlong;
        if let Err(e) = self.dispatch(product_id, handle) {
            tracing::error!(product_id, error = %e, "NoctuaStore.purchaseItem failed");
            // SAFETY: the store threw, so per the contract it never resolved
            // `handle`; ownership is still ours.
            let completion = unsafe { Box::from_raw(handle as *mut Completion) };
            completion.fail(format!("store error: {e}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Purchase callback
// ---------------------------------------------------------------------------

fn call_on_complete(
    vm: &JavaVM,
    callback: &GlobalRef,
    result: &PurchaseResult,
) -> jni::errors::Result<()> {
    let mut env = vm.attach_current_thread()?;
    let message = env.new_string(&result.message)?;
    let outcome = env.call_method(
        callback.as_obj(),
        "onComplete",
        "(ZLjava/lang/String;)V",
        &[
            JValue::Bool(u8::from(result.success)),
            JValue::Object(&message),
        ],
    );
    if outcome.is_err() {
        clear_exception(&mut env);
    }
    outcome.map(|_| ())
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_noctuagames_sdk_NoctuaBridge_initNoctua<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    config_json: JString<'local>,
    store: JObject<'local>,
) -> jboolean {
    logging::init_logging();

    let json = read_jstring(&mut env, &config_json);
    let config = match NoctuaConfig::from_json_str(&json) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Noctua initialization failed");
            return JNI_FALSE;
        }
    };

    let store: Option<Arc<dyn IapService>> = if store.is_null() {
        None
    } else {
        match (env.get_java_vm(), env.new_global_ref(&store)) {
            (Ok(vm), Ok(store)) => Some(Arc::new(JniStore { vm, store })),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error = %e, "failed to retain NoctuaStore");
                return JNI_FALSE;
            }
        }
    };

    match crate::initialize_with_store(config, store) {
        Ok(()) => JNI_TRUE,
        Err(e) => {
            tracing::error!(error = %e, "Noctua initialization failed");
            JNI_FALSE
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_noctuagames_sdk_NoctuaBridge_trackAdRevenue<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    source: JString<'local>,
    revenue: jdouble,
    currency: JString<'local>,
    payload_json: JString<'local>,
) {
    let source = read_jstring(&mut env, &source);
    let currency = read_jstring(&mut env, &currency);
    let payload = read_jstring(&mut env, &payload_json);
    crate::track_ad_revenue(&source, revenue, &currency, &payload);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_noctuagames_sdk_NoctuaBridge_trackPurchase<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    order_id: JString<'local>,
    amount: jdouble,
    currency: JString<'local>,
    payload_json: JString<'local>,
) {
    let order_id = read_jstring(&mut env, &order_id);
    let currency = read_jstring(&mut env, &currency);
    let payload = read_jstring(&mut env, &payload_json);
    crate::track_purchase(&order_id, amount, &currency, &payload);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_noctuagames_sdk_NoctuaBridge_trackCustomEvent<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    event_name: JString<'local>,
    payload_json: JString<'local>,
) {
    let event_name = read_jstring(&mut env, &event_name);
    let payload = read_jstring(&mut env, &payload_json);
    crate::track_custom_event(&event_name, &payload);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_noctuagames_sdk_NoctuaBridge_trackCustomEventWithRevenue<
    'local,
>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    event_name: JString<'local>,
    revenue: jdouble,
    currency: JString<'local>,
    payload_json: JString<'local>,
) {
    let event_name = read_jstring(&mut env, &event_name);
    let currency = read_jstring(&mut env, &currency);
    let payload = read_jstring(&mut env, &payload_json);
    crate::track_custom_event_with_revenue(&event_name, revenue, &currency, &payload);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_noctuagames_sdk_NoctuaBridge_purchaseItem<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    product_id: JString<'local>,
    callback: JObject<'local>,
) {
    let product_id = read_jstring(&mut env, &product_id);
    if callback.is_null() {
        tracing::error!(product_id = %product_id, "purchaseItem called without a callback");
        return;
    }

    let (vm, callback) = match (env.get_java_vm(), env.new_global_ref(&callback)) {
        (Ok(vm), Ok(callback)) => (vm, callback),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(product_id = %product_id, error = %e, "failed to retain purchase callback");
            return;
        }
    };

    crate::purchase_item(&product_id, move |result| {
        if let Err(e) = call_on_complete(&vm, &callback, &result) {
            tracing::error!(error = %e, "PurchaseCallback.onComplete failed");
        }
    });
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_noctuagames_sdk_NoctuaBridge_resolvePurchase<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    handle: jlong,
    success: jboolean,
    message: JString<'local>,
) -> jboolean {
    if handle == 0 {
        return JNI_FALSE;
    }
    let message = read_jstring(&mut env, &message);
    // SAFETY: `handle` was produced by `Box::into_raw` in `JniStore` and the
    // store contract allows resolving it once.
    let completion = unsafe { Box::from_raw(handle as *mut Completion) };
    completion.complete(PurchaseResult {
        success: success != JNI_FALSE,
        message,
    });
    JNI_TRUE
}
