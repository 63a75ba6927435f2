//! Request and response shapes for campaign recommendations.
//!
//! Placements are named recommendation slots on a page, e.g.
//! `"frontpage-nosto-1"`. A batch asks for several placements at once and the
//! response maps each placement to an opaque, mode-dependent payload (rendered
//! HTML or product JSON).

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Shape of the payload returned per placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseMode {
    /// Server-rendered HTML.
    #[default]
    Html,
    /// Raw product data as stored by the platform.
    JsonOriginal,
}

impl std::fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseMode::Html => write!(f, "HTML"),
            ResponseMode::JsonOriginal => write!(f, "JSON_ORIGINAL"),
        }
    }
}

impl FromStr for ResponseMode {
    type Err = String;

    /// Accepts the wire names (`HTML`, `JSON_ORIGINAL`) case-insensitively,
    /// with `-` or `_` as separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "HTML" => Ok(ResponseMode::Html),
            "JSON_ORIGINAL" => Ok(ResponseMode::JsonOriginal),
            other => Err(format!("unknown response mode \"{other}\"")),
        }
    }
}

/// One caller's request for a single placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignRequest {
    pub placement: String,
    pub response_mode: ResponseMode,
    /// Product the placement is shown for, e.g. on a product page.
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
}

impl CampaignRequest {
    pub fn new(placement: impl Into<String>, response_mode: ResponseMode) -> Self {
        Self {
            placement: placement.into(),
            response_mode,
            product_id: None,
            variant_id: None,
        }
    }

    #[must_use]
    pub fn for_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    #[must_use]
    pub fn for_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    /// Requests sharing a key can be served by one upstream call.
    #[must_use]
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            response_mode: self.response_mode,
            product_id: self.product_id.clone(),
            variant_id: self.variant_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub response_mode: ResponseMode,
    pub product_id: Option<String>,
    pub variant_id: Option<String>,
}

/// Product context sent with a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductContext {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

/// One upstream call covering several placements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBatch {
    pub response_mode: ResponseMode,
    pub elements: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<ProductContext>,
}

impl RecommendationBatch {
    #[must_use]
    pub fn new(response_mode: ResponseMode) -> Self {
        Self {
            response_mode,
            elements: Vec::new(),
            products: Vec::new(),
        }
    }

    /// Sets the placements to fetch. Repeated placements are kept once, in
    /// first-seen order.
    #[must_use]
    pub fn with_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements.clear();
        for element in elements {
            let element = element.into();
            if !self.elements.contains(&element) {
                self.elements.push(element);
            }
        }
        self
    }

    #[must_use]
    pub fn with_product(
        mut self,
        product_id: impl Into<String>,
        variant_id: Option<String>,
    ) -> Self {
        self.products.push(ProductContext {
            product_id: product_id.into(),
            variant_id,
        });
        self
    }
}

/// Result of one batch: payload per placement.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecommendationResponse {
    #[serde(default)]
    pub recommendations: HashMap<String, serde_json::Value>,
}
