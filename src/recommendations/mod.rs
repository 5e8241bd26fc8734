//! Field Recommendation Engine
//!
//! Turns aggregated statistics from past calculations into form hints:
//!
//! - **Text suggestions**: most common values, then recent ones
//! - **Numeric suggestions**: backend default with average/max tooltip
//! - **Smart combinations**: correlated lookups such as motor efficiency by
//!   motor classification
//! - **Auto-fill**: bulk suggestions for empty, non-calculated fields
//!
//! Sets are fetched through a [`RecommendationSource`] and cached per
//! [`RequestContext`] by the [`RecommendationEngine`].

pub mod engine;
pub mod source;
pub mod suggestions;
pub mod types;

pub use engine::{CacheStatus, RecommendationEngine};
pub use source::{RecommendationSource, SourceError};
pub use suggestions::{NumericSuggestion, TextSuggestion};
pub use types::{
    CombinationEntry, NumericFieldStats, RecommendationSet, RequestContext, SetContext,
    SmartCombination, TextFieldStats, ValueCount, MOTOR_EFFICIENCY_COMBINATION,
};
