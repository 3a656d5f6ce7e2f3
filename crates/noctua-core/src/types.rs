// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Noctua bridge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::NoctuaError;
use crate::payload::Payload;

/// Unique identifier attached to every event handed to a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Revenue earned from an ad impression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRevenueEvent {
    /// Ad network or mediation source (e.g. "admob").
    pub source: String,
    pub revenue: f64,
    /// ISO-4217 style code. Forwarded as given.
    pub currency: String,
    pub payload: Payload,
}

/// A completed real-world purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEvent {
    pub order_id: String,
    pub amount: f64,
    pub currency: String,
    pub payload: Payload,
}

/// Monetary value attached to a custom event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    pub amount: f64,
    pub currency: String,
}

/// An arbitrary named event, optionally carrying revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEvent {
    pub name: String,
    pub revenue: Option<Revenue>,
    pub payload: Payload,
}

impl CustomEvent {
    pub fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            revenue: None,
            payload,
        }
    }

    pub fn with_revenue(mut self, amount: f64, currency: impl Into<String>) -> Self {
        self.revenue = Some(Revenue {
            amount,
            currency: currency.into(),
        });
        self
    }
}

/// Outcome of a single purchase attempt.
///
/// Produced once per attempt and delivered once to the caller's completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseResult {
    pub success: bool,
    pub message: String,
}

impl PurchaseResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<&NoctuaError> for PurchaseResult {
    fn from(err: &NoctuaError) -> Self {
        Self::failure(err.to_string())
    }
}

impl From<NoctuaError> for PurchaseResult {
    fn from(err: NoctuaError) -> Self {
        Self::from(&err)
    }
}

/// The record an event collector receives.
///
/// The payload is flattened into the top-level object; `event_name`,
/// `event_id` and `timestamp` are written last and win over payload keys of
/// the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    pub id: EventId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
    pub fields: Payload,
}

impl EventEnvelope {
    /// Envelope with a fresh id and the current time.
    pub fn new(name: impl Into<String>, fields: Payload) -> Self {
        Self {
            id: EventId::new(),
            name: name.into(),
            occurred_at: Utc::now(),
            fields,
        }
    }

    /// Collector envelope for an ad-revenue event (`AdRevenue`).
    pub fn ad_revenue(event: &AdRevenueEvent) -> Self {
        let mut fields = event.payload.clone();
        fields.insert("source".into(), json!(event.source));
        fields.insert("revenue".into(), json!(event.revenue));
        fields.insert("currency".into(), json!(event.currency));
        Self::new("AdRevenue", fields)
    }

    /// Collector envelope for a purchase event (`Purchase`).
    pub fn purchase(event: &PurchaseEvent) -> Self {
        let mut fields = event.payload.clone();
        fields.insert("orderId".into(), json!(event.order_id));
        fields.insert("amount".into(), json!(event.amount));
        fields.insert("currency".into(), json!(event.currency));
        Self::new("Purchase", fields)
    }

    /// Collector envelope for a custom event, named after the event itself.
    pub fn custom(event: &CustomEvent) -> Self {
        let mut fields = event.payload.clone();
        if let Some(revenue) = &event.revenue {
            fields.insert("revenue".into(), json!(revenue.amount));
            fields.insert("currency".into(), json!(revenue.currency));
        }
        Self::new(event.name.clone(), fields)
    }

    /// Serialize to the JSON body posted to a collector.
    pub fn to_json(&self) -> Value {
        let mut body = self.fields.clone();
        body.insert("event_name".into(), json!(self.name));
        body.insert("event_id".into(), json!(self.id.to_string()));
        body.insert("timestamp".into(), json!(self.occurred_at.to_rfc3339()));
        Value::Object(body)
    }
}
