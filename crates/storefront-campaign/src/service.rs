use std::future::Future;
use std::sync::Arc;

use crate::error::RecommendationError;
use crate::types::{RecommendationBatch, RecommendationResponse};

/// Upstream recommendation engine.
pub trait RecommendationService {
    /// Loads every placement in `batch` with one upstream call.
    ///
    /// # Errors
    ///
    /// Implementations return [`RecommendationError`] when the call fails.
    fn load(
        &self,
        batch: RecommendationBatch,
    ) -> impl Future<Output = Result<RecommendationResponse, RecommendationError>> + Send;
}

impl<T> RecommendationService for Arc<T>
where
    T: RecommendationService + Send + Sync,
{
    fn load(
        &self,
        batch: RecommendationBatch,
    ) -> impl Future<Output = Result<RecommendationResponse, RecommendationError>> + Send {
        (**self).load(batch)
    }
}
