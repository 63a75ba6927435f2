//! Cart collaborators.
//!
//! [`ShopifyCartClient`] posts to the storefront's Ajax cart endpoint
//! (`/cart/add.js`). The recommendation slot is passed as a private line-item
//! property so the storefront can attribute the addition.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::CartError;

/// Identifies one SKU of one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuRef {
    pub product_id: String,
    pub sku_id: String,
}

/// Adds SKUs to the shopper's cart.
pub trait CartService {
    /// # Errors
    ///
    /// Implementations return [`CartError`] when the cart mutation fails.
    fn add_sku_to_cart(
        &self,
        sku: &SkuRef,
        slot_id: Option<&str>,
        quantity: u32,
    ) -> impl Future<Output = Result<(), CartError>> + Send;
}

#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    items: [AddItem<'a>; 1],
}

#[derive(Debug, Serialize)]
struct AddItem<'a> {
    id: &'a str,
    quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<ItemProperties<'a>>,
}

#[derive(Debug, Serialize)]
struct ItemProperties<'a> {
    #[serde(rename = "_slot")]
    slot: &'a str,
}

/// Cart client for a Shopify storefront's Ajax API.
pub struct ShopifyCartClient {
    client: Client,
    add_url: Url,
}

impl ShopifyCartClient {
    /// Creates a client for the storefront at `shop_url`, e.g. `"https://shop.example.com"`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidShopUrl`] if `shop_url` is not an absolute
    /// http(s) URL, or [`CartError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(shop_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, CartError> {
        let invalid = |reason: String| CartError::InvalidShopUrl {
            shop_url: shop_url.to_owned(),
            reason,
        };

        let base = Url::parse(&format!("{}/", shop_url.trim_end_matches('/')))
            .map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme \"{}\"", base.scheme())));
        }
        let add_url = base
            .join("cart/add.js")
            .map_err(|e| invalid(e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, add_url })
    }

    #[must_use]
    pub fn add_url(&self) -> &Url {
        &self.add_url
    }
}

impl CartService for ShopifyCartClient {
    async fn add_sku_to_cart(
        &self,
        sku: &SkuRef,
        slot_id: Option<&str>,
        quantity: u32,
    ) -> Result<(), CartError> {
        let body = AddRequest {
            items: [AddItem {
                id: &sku.sku_id,
                quantity,
                properties: slot_id.map(|slot| ItemProperties { slot }),
            }],
        };

        let response = self
            .client
            .post(self.add_url.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CartError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.add_url.to_string(),
            });
        }

        tracing::info!(
            product_id = %sku.product_id,
            sku_id = %sku.sku_id,
            quantity,
            "sku added to cart"
        );
        Ok(())
    }
}
