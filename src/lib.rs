//! attribute_risk — attribute-disclosure risk estimation for sequentially
//! synthesized data.
//!
//! Purpose
//! -------
//! Serve as the crate root. Synthetic data released in place of a
//! confidential table can still reveal confidential attribute values; this
//! crate quantifies that risk record by record, using the posterior draws of
//! the models that generated the synthetic data.
//!
//! Key behaviors
//! -------------
//! - `risk` implements the estimator: guess grids per record,
//!   self-normalized importance sampling over posterior draws, normalized
//!   joint probability tensors, and per-record risk summaries.
//! - `numerical_stability` holds the log-domain helpers (softplus,
//!   logistic, log-sum-exp, softmax) the estimator relies on.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based throughout the public API.
//! - Errors are rich enums ([`risk::RiskError`]) propagated with `?`; the
//!   library never panics on user input.
//! - Diagnostics are emitted through the `log` facade; installing a logger
//!   is left to the application.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each module; `tests/` holds end-to-end
//!   pipeline scenarios.

pub mod numerical_stability;
pub mod risk;
