//! core — data, models, guesses, and grid plumbing for attribute risk.
//!
//! Purpose
//! -------
//! Collect the building blocks of attribute-disclosure risk estimation:
//! validated datasets, design transforms, distribution families, posterior
//! draws, synthesis steps, guess construction, mixed-radix indexing,
//! probability tensors, options, and cross-input validation. The estimators
//! in `risk::models` are assembled from these primitives.
//!
//! Key behaviors
//! -------------
//! - Hold inputs in validated containers ([`Dataset`], [`Column`],
//!   [`PosteriorDraws`], [`SynthesisStep`]).
//! - Evaluate per-draw densities ([`Family`], [`DesignRow`],
//!   [`SynthesisStep::log_densities`]).
//! - Build each record's guess grid ([`GuessGridBuilder`], [`GuessSet`]) and
//!   address its cells ([`MixedRadix`], [`ProbabilityTensor`]).
//! - Configure and check an estimate ([`RiskOptions`], [`validate_inputs`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Datasets are non-empty with finite values; categorical values are
//!   valid level codes.
//! - After [`validate_inputs`] succeeds, steps, draws, and options are
//!   mutually consistent and downstream code indexes without re-checking.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based throughout (records, steps, draws, guesses).
//! - Guess combinations are enumerated with the first step varying fastest.
//! - Densities are handled in log space; only normalized probabilities are
//!   exponentiated.
//!
//! Downstream usage
//! ----------------
//! - Prefer the re-exports below or the [`prelude`] over reaching into
//!   submodules.

pub mod data;
pub mod design;
pub mod draws;
pub mod family;
pub mod guesses;
pub mod indexer;
pub mod options;
pub mod step;
pub mod tensor;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::{Column, Dataset};
pub use self::design::{DesignRow, PredictorSpec, Term};
pub use self::draws::PosteriorDraws;
pub use self::family::Family;
pub use self::guesses::{GuessGridBuilder, GuessSet, evenly_spaced};
pub use self::indexer::MixedRadix;
pub use self::options::{Bounds, GuessCounts, GuessRange, RiskOptions, StepValues};
pub use self::step::SynthesisStep;
pub use self::tensor::ProbabilityTensor;
pub use self::validation::validate_inputs;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::data::{Column, Dataset};
    pub use super::design::{DesignRow, PredictorSpec, Term};
    pub use super::draws::PosteriorDraws;
    pub use super::family::Family;
    pub use super::guesses::GuessSet;
    pub use super::options::{GuessRange, RiskOptions, StepValues};
    pub use super::step::SynthesisStep;
    pub use super::tensor::ProbabilityTensor;
}
