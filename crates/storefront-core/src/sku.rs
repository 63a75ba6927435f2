//! SKU lookup records supplied inline by the host page.
//!
//! The host page embeds a JSON array like:
//!
//! ```json
//! [{"id": "11", "price": "$10.00", "listPrice": "$12.00", "image": "https://cdn/red.jpg"}]
//! ```
//!
//! Prices are display strings, already formatted by the storefront. They are
//! compared verbatim and never parsed.

use serde::{Deserialize, Serialize};

/// One purchasable variant in the inline lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sku {
    pub id: String,
    #[serde(default)]
    pub price: Option<String>,
    /// Pre-sale comparison price.
    #[serde(default)]
    pub list_price: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Secondary image, typically shown on hover.
    #[serde(default)]
    pub alt_image: Option<String>,
}

/// The attribute snapshot currently displayed for a product.
///
/// An unset field means "no single value applies" and the UI shows nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuFields {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub alt_image: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub list_price: Option<String>,
}

impl From<&Sku> for SkuFields {
    fn from(sku: &Sku) -> Self {
        Self {
            image: sku.image.clone(),
            alt_image: sku.alt_image.clone(),
            price: sku.price.clone(),
            list_price: sku.list_price.clone(),
        }
    }
}

impl SkuFields {
    /// Pools the fields of several SKUs: a field is kept only when every SKU
    /// carries the same value for it.
    ///
    /// An empty slice pools to all-unset fields.
    #[must_use]
    pub fn pooled(skus: &[&Sku]) -> Self {
        Self {
            image: agreed(skus, |s| s.image.as_ref()),
            alt_image: agreed(skus, |s| s.alt_image.as_ref()),
            price: agreed(skus, |s| s.price.as_ref()),
            list_price: agreed(skus, |s| s.list_price.as_ref()),
        }
    }

    /// Returns `true` when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
            && self.alt_image.is_none()
            && self.price.is_none()
            && self.list_price.is_none()
    }
}

fn agreed<F>(skus: &[&Sku], field: F) -> Option<String>
where
    F: Fn(&Sku) -> Option<&String>,
{
    let (first, rest) = skus.split_first()?;
    let value = field(first)?;
    rest.iter()
        .all(|s| field(s) == Some(value))
        .then(|| value.clone())
}
