//! In-memory analytics and experiment engine.
//!
//! Every public function here is a pure, stateless transform over the event
//! log it is handed (aside from explicit random seeds). The server loads the
//! source tables once and recomputes each report per request.

pub mod cohorts;
pub mod dataset;
pub mod derive;
pub mod experiment;
pub mod funnel;
pub mod kpis;

/// Marker string embedded in engine errors when an aggregation produced no
/// usable rows. The HTTP layer matches on it to return a structured
/// "insufficient data" response instead of a 500.
pub const INSUFFICIENT_DATA_MARKER: &str = "insufficient_metric_data";

/// Additive guard applied to every rate/ratio denominator.
pub const EPSILON: f64 = 1e-9;

pub(crate) const SECONDS_PER_DAY: f64 = 86_400.0;
