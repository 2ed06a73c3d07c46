//! risk — attribute-disclosure risk for sequentially synthesized data.
//!
//! Purpose
//! -------
//! Estimate, for every record of a confidential dataset, how much an
//! intruder holding the synthetic data could learn about the record's
//! synthesized attributes. Each record's candidate values ("guesses") are
//! scored by their posterior-predictive plausibility given the synthetic
//! replicates, averaged over the posterior draws of the synthesis models.
//!
//! Key behaviors
//! -------------
//! - `core` holds datasets, synthesis steps, densities, guess construction,
//!   grid indexing, options, and validation.
//! - `models` holds the importance sampler and the record and batch
//!   estimators.
//! - `errors` defines [`RiskError`] and [`RiskResult`].
//!
//! Downstream usage
//! ----------------
//! - Build a confidential [`Dataset`], one or more synthetic replicates,
//!   the ordered [`SynthesisStep`]s with their [`PosteriorDraws`], and a
//!   [`RiskOptions`]; call [`estimate_risk`] and read the [`RiskSet`].

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------
//
// These are the "everyday" types most users need. Guess-construction
// internals, indexing, and validation stay under `core`.

pub use self::core::{
    Column, Dataset, DesignRow, Family, GuessRange, GuessSet, PosteriorDraws, PredictorSpec,
    ProbabilityTensor, RiskOptions, StepValues, SynthesisStep, Term,
};

pub use self::errors::{RiskError, RiskResult};

pub use self::models::{
    LogProgress, Progress, RankRow, RecordRiskEstimator, RiskRecord, RiskSet, RiskSummary,
    estimate_risk, estimate_risk_with_progress,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use attribute_risk::risk::prelude::*;
//
// to import the main estimation surface in a single line.

pub mod prelude {
    pub use super::{
        Column, Dataset, DesignRow, Family, GuessRange, PosteriorDraws, PredictorSpec, RiskError,
        RiskOptions, RiskRecord, RiskResult, RiskSet, StepValues, SynthesisStep, Term,
        estimate_risk,
    };
}
