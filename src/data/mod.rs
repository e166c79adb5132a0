//! Core data models for Pricebook
//!
//! This module contains the data types used throughout the application for
//! representing services, categories and API health information as received
//! from the Pocket Price API.

use serde::{Deserialize, Serialize};

/// A single service/price listing as received from the upstream API
///
/// Instances are immutable snapshots of one fetch; identity is the `id`
/// field, which is stable only because the upstream source guarantees it.
/// Fields the upstream may omit deserialize to the same defaults the API's
/// own clients assume (price 0, currency RUB).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Unique identifier within a fetch
    pub id: String,
    /// Human-readable service name
    #[serde(default)]
    pub name: String,
    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,
    /// Base price
    #[serde(default)]
    pub price: f64,
    /// Upper bound when the service is priced as a range
    #[serde(default)]
    pub price_max: Option<f64>,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Duration in minutes
    #[serde(default)]
    pub duration: Option<u32>,
    /// Category this service belongs to
    #[serde(default)]
    pub category_id: Option<String>,
}

fn default_currency() -> String {
    "RUB".to_string()
}

/// A service category as received from the upstream API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier within a fetch
    pub id: String,
    /// Human-readable category name
    #[serde(default)]
    pub name: String,
    /// URL-safe slug
    #[serde(default)]
    pub slug: String,
}

/// Health payload returned by the upstream API's health endpoint
///
/// Only surfaced to operator-facing callers (the `health` command); the
/// render path never sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthInfo {
    /// Reported status string, e.g. "ok"
    #[serde(default)]
    pub status: String,
    /// Upstream version, when reported
    #[serde(default)]
    pub version: Option<String>,
}
