//! Batched campaign recommendation fetching.

pub mod client;
pub mod error;
pub mod orchestrator;
pub mod service;
pub mod types;

pub use client::HttpRecommendationClient;
pub use error::{CampaignError, RecommendationError};
pub use orchestrator::{CampaignOrchestrator, DEFAULT_BATCH_DELAY};
pub use service::RecommendationService;
pub use types::{
    CampaignRequest, GroupKey, ProductContext, RecommendationBatch, RecommendationResponse,
    ResponseMode,
};
