//! Metric names recorded through the `metrics` facade.
//!
//! crewcal never installs a recorder. Until the host application installs one
//! (e.g. a Prometheus exporter), every counter and histogram here is a no-op;
//! the `crewcal` binary runs once and exits, so it leaves them unrecorded.

use crate::model::Unavailability;

// ── Resolver metrics ────────────────────────────────────────────

/// Counter: availability resolutions performed.
pub const RESOLVE_TOTAL: &str = "crewcal_resolve_total";

/// Histogram: resolve latency in seconds, store reads included.
pub const RESOLVE_DURATION_SECONDS: &str = "crewcal_resolve_duration_seconds";

/// Counter: workers reported unavailable. Labels: reason.
pub const WORKERS_UNAVAILABLE_TOTAL: &str = "crewcal_workers_unavailable_total";

// ── Estimator metrics ───────────────────────────────────────────

/// Counter: end-time estimates computed.
pub const ESTIMATES_TOTAL: &str = "crewcal_estimates_total";

/// Counter: estimates that fell back to the default duration.
pub const ESTIMATE_FALLBACK_TOTAL: &str = "crewcal_estimate_fallback_total";

/// Map an Unavailability variant to a short label for metrics.
pub fn reason_label(reason: &Unavailability) -> &'static str {
    match reason {
        Unavailability::DayOff { .. } => "day_off",
        Unavailability::DateBlocked { .. } => "date_blocked",
        Unavailability::Busy { .. } => "busy",
    }
}
