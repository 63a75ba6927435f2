//! `select` subcommand: drive a selection store from the command line.

use std::collections::BTreeMap;

use serde::Serialize;
use storefront_core::{AppConfig, Environment, Sku, SkuFields};
use storefront_selection::{AddToCartOutcome, SelectionStore, ShopifyCartClient};

/// One `--option GROUP=ID,ID` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionArg {
    pub group: String,
    pub sku_ids: Vec<String>,
}

pub(crate) fn parse_option_arg(raw: &str) -> Result<OptionArg, String> {
    let (group, ids) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected GROUP=ID,ID but got \"{raw}\""))?;
    let group = group.trim();
    if group.is_empty() {
        return Err(format!("missing option group name in \"{raw}\""));
    }
    let sku_ids = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect();
    Ok(OptionArg {
        group: group.to_owned(),
        sku_ids,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SelectionReport {
    pub selected_sku_id: Option<String>,
    pub sku_fields: Option<SkuFields>,
    pub sku_options: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_to_cart: Option<String>,
}

/// Builds the cart client for `--add-to-cart` from the storefront origin.
///
/// Outside development and test the origin must be `https`.
pub(crate) fn cart_client(config: &AppConfig) -> anyhow::Result<ShopifyCartClient> {
    let shop_url = config
        .shop_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("STOREFRONT_SHOP_URL is not set; cannot add to cart"))?;

    let env = config.env;
    let insecure_allowed = matches!(env, Environment::Development | Environment::Test);
    if !insecure_allowed && !shop_url.starts_with("https://") {
        anyhow::bail!("STOREFRONT_SHOP_URL must use https in {env} (got \"{shop_url}\")");
    }

    ShopifyCartClient::new(shop_url, config.request_timeout_secs, &config.user_agent)
        .map_err(|e| anyhow::anyhow!("failed to build cart client: {e}"))
}

/// Registers one option group per distinct `--option` group, applies every
/// choice in order and reports the resulting state. With `cart`, the resolved
/// SKU is then added to the cart.
pub(crate) async fn run(
    skus_json: &str,
    options: &[OptionArg],
    cart: Option<&ShopifyCartClient>,
) -> anyhow::Result<SelectionReport> {
    let skus: Vec<Sku> = serde_json::from_str(skus_json)?;

    let mut store = SelectionStore::new("cli");
    let mut groups: Vec<&str> = options.iter().map(|o| o.group.as_str()).collect();
    groups.sort_unstable();
    groups.dedup();
    for _ in &groups {
        store.register_option_group();
    }
    store.set_skus(skus);

    for option in options {
        store.select_sku_option(&option.group, option.sku_ids.iter().cloned());
    }

    tracing::info!(
        selected = ?store.selected_sku_id(),
        groups = groups.len(),
        "selection resolved"
    );

    let added_to_cart = match cart {
        Some(cart) => match store.add_to_cart(cart).await? {
            AddToCartOutcome::Added { sku_id } => Some(sku_id),
            AddToCartOutcome::NoSkuSelected => {
                anyhow::bail!("options do not resolve to a single SKU; nothing added to cart")
            }
        },
        None => None,
    };

    Ok(SelectionReport {
        selected_sku_id: store.selected_sku_id().map(str::to_owned),
        sku_fields: store.sku_fields().cloned(),
        sku_options: store.sku_options().clone(),
        added_to_cart,
    })
}
