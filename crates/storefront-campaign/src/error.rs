use std::sync::Arc;

use thiserror::Error;

/// Errors returned by a [`crate::RecommendationService`].
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by recommendation service (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("recommendation service error: {0}")]
    Service(String),
}

/// Outcome delivered to a single [`crate::CampaignOrchestrator::add_request`] caller.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// The batched upstream call for this request's group failed. Every member
    /// of the group receives the same shared error.
    #[error("recommendation request failed: {0}")]
    Upstream(#[source] Arc<RecommendationError>),

    /// The batch was dropped before settling this request.
    #[error("campaign request abandoned before completion")]
    Abandoned,

    /// `add_request` was called outside a tokio runtime, so no flush could be
    /// scheduled. The request was not queued.
    #[error("no tokio runtime available to schedule the campaign flush")]
    NoRuntime,
}
