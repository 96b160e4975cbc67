//! Cleaning stages: imputation, duplicate resolution, normalization.

mod dedupe;
mod impute;
mod normalize;

pub use dedupe::{ConflictResolver, DuplicateResolver};
pub use impute::Imputer;
pub use normalize::{CaseRule, Normalizer};
