//! Telemetry metric name constants.
//!
//! Centralised metric names for mimir operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `mimir_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `backend` — NLI backend name (e.g. "cross-encoder/nli-deberta-v3-small")
//! - `policy` — scoring policy: "independent" or "exclusive"
//! - `status` — outcome: "ok" or "error"
//! - `reason` — config fallback cause: "missing" or "malformed"

/// Total classification calls.
///
/// Labels: `backend`, `policy`, `status` ("ok" | "error").
pub const CLASSIFY_REQUESTS_TOTAL: &str = "mimir_classify_requests_total";

/// Classification duration in seconds, inference included.
///
/// Labels: `backend`, `policy`.
pub const CLASSIFY_DURATION_SECONDS: &str = "mimir_classify_duration_seconds";

/// Total premise/hypothesis pairs sent to a backend.
///
/// Labels: `backend`.
pub const INFERENCE_CALLS_TOTAL: &str = "mimir_inference_calls_total";

/// Total times model config resolution fell back to defaults.
///
/// Labels: `reason` ("missing" | "malformed").
pub const CONFIG_FALLBACKS_TOTAL: &str = "mimir_config_fallbacks_total";
