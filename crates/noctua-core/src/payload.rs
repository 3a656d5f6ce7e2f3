// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event payload normalization.
//
// Hosts hand payloads over either as a serialized JSON string or as a native
// key-value mapping. Both collapse into a single `Payload` before anything
// reaches the engine. Malformed strings become an empty payload; they are
// never forwarded half-parsed.
//
// Parsing is lossless for any valid document: numbers keep their exact
// source text (no rounding of big integers, no rejection of exponents beyond
// `f64`), and nesting depth is bounded by memory rather than a fixed limit.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{NoctuaError, Result};

/// Canonical payload representation: string keys to arbitrary JSON values.
pub type Payload = Map<String, Value>;

/// A payload as received from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadInput<'a> {
    /// Serialized JSON object.
    Json(&'a str),
    /// Already-structured mapping.
    Map(Payload),
}

impl<'a> From<&'a str> for PayloadInput<'a> {
    fn from(json: &'a str) -> Self {
        Self::Json(json)
    }
}

impl<'a> From<&'a String> for PayloadInput<'a> {
    fn from(json: &'a String) -> Self {
        Self::Json(json.as_str())
    }
}

impl From<Payload> for PayloadInput<'_> {
    fn from(map: Payload) -> Self {
        Self::Map(map)
    }
}

impl Default for PayloadInput<'_> {
    fn default() -> Self {
        Self::Map(Payload::new())
    }
}

/// Normalize a host payload into the canonical mapping.
///
/// A mapping passes through untouched. A string is parsed as a JSON object;
/// blank strings, malformed JSON and non-object documents all yield an empty
/// payload. This function never fails.
pub fn normalize<'a>(input: impl Into<PayloadInput<'a>>) -> Payload {
    match input.into() {
        PayloadInput::Map(map) => map,
        PayloadInput::Json(json) if json.trim().is_empty() => Payload::new(),
        PayloadInput::Json(json) => match parse_payload(json) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed payload");
                Payload::new()
            }
        },
    }
}

/// Strict parse of a JSON payload string.
///
/// Unlike [`normalize`] this reports why the document was rejected.
pub fn parse_payload(json: &str) -> Result<Payload> {
    match parse_document(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(NoctuaError::MalformedPayload(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(NoctuaError::MalformedPayload(e.to_string())),
    }
}

/// Parse one JSON document with no recursion limit. Deep documents grow the
/// stack in heap-allocated segments instead of overflowing it.
fn parse_document(json: &str) -> serde_json::Result<Value> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
