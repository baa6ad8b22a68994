//! Shared query parameter types for API handlers.
//!
//! Every field is optional at the extractor level so a missing parameter
//! surfaces as a `VALIDATION_ERROR` naming the field instead of a generic
//! axum rejection.

use serde::Deserialize;

/// `?serviceType=&date=` for the availability listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityParams {
    pub service_type: Option<String>,
    pub date: Option<String>,
}

/// `?serviceType=&date=&time=` for the single-slot check.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCheckParams {
    pub service_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// `?date=` for admin views.
#[derive(Debug, Deserialize)]
pub struct DateParams {
    pub date: Option<String>,
}
