//! # Interchain Security Metrics
//!
//! Prometheus metrics for monitoring message verification.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-interchain-security = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `ism_verifications_total` - Counter of successful verifications (by path)
//! - `ism_rejections_total` - Counter of failed verifications (by reason)
//! - `ism_releases_total` - Counter of release side effects fired

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Successful verifications, labeled by path
    pub static ref VERIFICATIONS: IntCounterVec = register_int_counter_vec!(
        "ism_verifications_total",
        "Total number of messages verified",
        &["path"]
    )
    .expect("Failed to create VERIFICATIONS metric");

    /// Failed verifications, labeled by reason
    pub static ref REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "ism_rejections_total",
        "Total number of verifications rejected",
        &["reason"]
    )
    .expect("Failed to create REJECTIONS metric");

    /// Release side effects fired
    pub static ref RELEASES: IntCounter = register_int_counter!(
        "ism_releases_total",
        "Total number of value releases"
    )
    .expect("Failed to create RELEASES metric");
}

/// Record a successful verification
#[cfg(feature = "metrics")]
pub fn record_verification(path: &str) {
    VERIFICATIONS.with_label_values(&[path]).inc();
}

/// Record a rejected verification
#[cfg(feature = "metrics")]
pub fn record_rejection(reason: &str) {
    REJECTIONS.with_label_values(&[reason]).inc();
}

/// Record a release
#[cfg(feature = "metrics")]
pub fn record_release() {
    RELEASES.inc();
}

// No-op fallbacks without the `metrics` feature.

/// Record a successful verification
#[cfg(not(feature = "metrics"))]
pub fn record_verification(_path: &str) {}

/// Record a rejected verification
#[cfg(not(feature = "metrics"))]
pub fn record_rejection(_reason: &str) {}

/// Record a release
#[cfg(not(feature = "metrics"))]
pub fn record_release() {}
