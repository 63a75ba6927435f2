//! HTTP client for the recommendation endpoint.
//!
//! Every batch is a single `POST {base}/v1/recommendations` with a JSON body:
//!
//! ```json
//! {"account": "shopify-123", "responseMode": "HTML", "elements": ["p1", "p2"],
//!  "products": [{"productId": "42"}]}
//! ```
//!
//! and the response maps placements to payloads:
//!
//! ```json
//! {"recommendations": {"p1": {...}, "p2": {...}}}
//! ```

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::error::RecommendationError;
use crate::service::RecommendationService;
use crate::types::{RecommendationBatch, RecommendationResponse};

/// Retry-After fallback when a 429 carries no usable header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    account: &'a str,
    #[serde(flatten)]
    batch: &'a RecommendationBatch,
}

/// Reqwest-backed [`RecommendationService`].
pub struct HttpRecommendationClient {
    client: Client,
    endpoint: Url,
    account_id: String,
}

impl HttpRecommendationClient {
    /// Creates a client for the endpoint under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendationError::InvalidBaseUrl`] if `base_url` does not
    /// parse, or [`RecommendationError::Http`] if the `reqwest::Client` cannot
    /// be constructed.
    pub fn new(
        base_url: &str,
        account_id: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, RecommendationError> {
        let invalid = |reason: String| RecommendationError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason,
        };

        // Exactly one trailing slash so `join` appends rather than replacing
        // the last path segment.
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| invalid(e.to_string()))?;
        let endpoint = base
            .join("v1/recommendations")
            .map_err(|e| invalid(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            account_id: account_id.to_owned(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl RecommendationService for HttpRecommendationClient {
    async fn load(
        &self,
        batch: RecommendationBatch,
    ) -> Result<RecommendationResponse, RecommendationError> {
        let body = RequestBody {
            account: &self.account_id,
            batch: &batch,
        };

        tracing::debug!(
            elements = ?batch.elements,
            response_mode = %batch.response_mode,
            "requesting recommendations"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(RecommendationError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(RecommendationError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|source| RecommendationError::Deserialize {
            context: format!("recommendations(elements={})", batch.elements.join(",")),
            source,
        })
    }
}
