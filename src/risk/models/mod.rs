//! models — importance sampling and risk estimators for attribute disclosure.
//!
//! Purpose
//! -------
//! Assemble the `risk::core` primitives into the estimators: the
//! self-normalized importance sampler scoring one guess combination, the
//! per-record estimator producing a probability tensor and its summaries,
//! and the batch driver covering a whole confidential dataset.
//!
//! Key behaviors
//! -------------
//! - [`ImportanceSampler`] turns a guessed record into an unnormalized log
//!   mass, aggregated over posterior draws and synthetic replicates.
//! - [`RecordRiskEstimator`] enumerates a record's guess grid, normalizes,
//!   and builds a [`RiskRecord`] (tensor, marginals, joint, ranks, absolute
//!   differences).
//! - [`estimate_risk`] / [`estimate_risk_with_progress`] run every record
//!   and return a [`RiskSet`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are validated once, when a [`RecordRiskEstimator`] is built.
//! - Estimators only read their inputs; per-record estimates are
//!   independent of each other.
//!
//! Conventions
//! -----------
//! - Errors are reported as `RiskResult`; the first failing record aborts a
//!   batch.
//! - Logging goes through the `log` facade: `warn!` on guess substitution,
//!   `info!` at batch start and end, `debug!` per record from
//!   [`LogProgress`].
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each estimator; the integration tests under
//!   `tests/` run the documented end-to-end scenarios.

pub mod batch;
pub mod record;
pub mod sampler;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::batch::{
    LogProgress, Progress, RiskSet, RiskSummary, estimate_risk, estimate_risk_with_progress,
};
pub use self::record::{RankRow, RecordRiskEstimator, RiskRecord};
pub use self::sampler::ImportanceSampler;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::batch::{RiskSet, RiskSummary, estimate_risk, estimate_risk_with_progress};
    pub use super::record::{RankRow, RecordRiskEstimator, RiskRecord};
}
