//! Where recommendation sets come from

use super::types::{RecommendationSet, RequestContext};
use crate::client::ClientError;
use async_trait::async_trait;
use thiserror::Error;

/// Failure to obtain a recommendation set.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("backend request failed: {0}")]
    Client(#[from] ClientError),

    #[error("recommendation source unavailable: {0}")]
    Unavailable(String),
}

/// Provider of aggregated historical statistics.
///
/// Implemented by the HTTP client; tests substitute in-memory sources.
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Fetch statistics for records matching `ctx`.
    async fn fetch_recommendations(
        &self,
        ctx: &RequestContext,
    ) -> Result<RecommendationSet, SourceError>;

    /// Name used in log lines
    fn source_name(&self) -> &str;
}
