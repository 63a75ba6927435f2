//! Selection state for one product instance.
//!
//! Each option group contributes a named set of candidate SKU ids. The store
//! intersects all contributed sets and, once every registered group has made a
//! selection and exactly one SKU remains, resolves that SKU as selected.
//! Partial selections still drive the displayed fields: a single remaining
//! candidate shows its own fields, several candidates show only the fields
//! they agree on.

use std::collections::{BTreeMap, HashSet};

use storefront_core::{Sku, SkuFields};

use crate::cart::{CartService, SkuRef};
use crate::error::CartError;

/// State slice a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    SelectedSkuId,
    SkuOptions,
    SkuFields,
    SkuData,
    /// Add-to-cart outcomes. Carries no state, so nothing is replayed on subscribe.
    Cart,
}

/// Notification delivered to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    SelectedSkuId(String),
    SkuOptions(BTreeMap<String, Vec<String>>),
    SkuFields(SkuFields),
    SkuData(Vec<Sku>),
    AddedToCart { sku_id: String },
    NoSkuSelected,
}

impl StoreEvent {
    #[must_use]
    pub fn key(&self) -> StoreKey {
        match self {
            StoreEvent::SelectedSkuId(_) => StoreKey::SelectedSkuId,
            StoreEvent::SkuOptions(_) => StoreKey::SkuOptions,
            StoreEvent::SkuFields(_) => StoreKey::SkuFields,
            StoreEvent::SkuData(_) => StoreKey::SkuData,
            StoreEvent::AddedToCart { .. } | StoreEvent::NoSkuSelected => StoreKey::Cart,
        }
    }
}

/// Handle returned by [`SelectionStore::listen`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Result of [`SelectionStore::add_to_cart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddToCartOutcome {
    Added { sku_id: String },
    NoSkuSelected,
}

type Listener = Box<dyn FnMut(&StoreEvent) + Send>;

struct Subscription {
    id: ListenerId,
    key: StoreKey,
    callback: Listener,
}

pub struct SelectionStore {
    product_id: String,
    slot_id: Option<String>,
    selected_sku_id: Option<String>,
    sku_options: BTreeMap<String, Vec<String>>,
    option_group_count: usize,
    sku_data: Option<Vec<Sku>>,
    sku_fields: Option<SkuFields>,
    subscriptions: Vec<Subscription>,
    next_listener: u64,
}

impl std::fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionStore")
            .field("product_id", &self.product_id)
            .field("slot_id", &self.slot_id)
            .field("selected_sku_id", &self.selected_sku_id)
            .field("sku_options", &self.sku_options)
            .field("option_group_count", &self.option_group_count)
            .field("sku_data", &self.sku_data.as_ref().map(Vec::len))
            .field("sku_fields", &self.sku_fields)
            .field("listeners", &self.subscriptions.len())
            .finish()
    }
}

impl SelectionStore {
    #[must_use]
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            slot_id: None,
            selected_sku_id: None,
            sku_options: BTreeMap::new(),
            option_group_count: 0,
            sku_data: None,
            sku_fields: None,
            subscriptions: Vec::new(),
            next_listener: 0,
        }
    }

    /// Attributes cart additions to the recommendation slot the product was shown in.
    #[must_use]
    pub fn with_slot(mut self, slot_id: impl Into<String>) -> Self {
        self.slot_id = Some(slot_id.into());
        self
    }

    #[must_use]
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    #[must_use]
    pub fn selected_sku_id(&self) -> Option<&str> {
        self.selected_sku_id.as_deref()
    }

    #[must_use]
    pub fn sku_options(&self) -> &BTreeMap<String, Vec<String>> {
        &self.sku_options
    }

    #[must_use]
    pub fn sku_fields(&self) -> Option<&SkuFields> {
        self.sku_fields.as_ref()
    }

    #[must_use]
    pub fn option_group_count(&self) -> usize {
        self.option_group_count
    }

    /// Counts one more option group that must report before a selection is complete.
    pub fn register_option_group(&mut self) {
        self.option_group_count += 1;
        tracing::trace!(
            product_id = %self.product_id,
            option_group_count = self.option_group_count,
            "option group registered"
        );
    }

    /// Selects a concrete SKU directly.
    pub fn select_sku_id(&mut self, sku_id: impl Into<String>) {
        let sku_id = sku_id.into();
        tracing::debug!(product_id = %self.product_id, sku_id = %sku_id, "sku selected");
        self.selected_sku_id = Some(sku_id.clone());
        self.emit(&StoreEvent::SelectedSkuId(sku_id.clone()));

        let fields = self.find_sku(&sku_id).map(SkuFields::from);
        if let Some(fields) = fields {
            self.set_sku_fields(fields);
        }
    }

    /// Records `group`'s candidate SKU ids and recomputes the selection.
    ///
    /// An empty candidate list withdraws the group's constraint.
    pub fn select_sku_option<I, S>(&mut self, group: &str, sku_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let candidates: Vec<String> = sku_ids
            .into_iter()
            .map(Into::into)
            .filter(|id| seen.insert(id.clone()))
            .collect();

        if candidates.is_empty() {
            self.sku_options.remove(group);
        } else {
            self.sku_options.insert(group.to_owned(), candidates);
        }

        let matching = self.intersect_options();
        tracing::debug!(
            product_id = %self.product_id,
            group,
            matching = matching.len(),
            reported = self.sku_options.len(),
            registered = self.option_group_count,
            "sku option selected"
        );

        match matching.as_slice() {
            [single] => {
                if self.sku_options.len() == self.option_group_count {
                    self.select_sku_id(single.clone());
                } else if let Some(fields) = self.find_sku(single).map(SkuFields::from) {
                    self.set_sku_fields(fields);
                }
            }
            [_, _, ..] => {
                if let Some(data) = &self.sku_data {
                    let matched: Vec<&Sku> = data
                        .iter()
                        .filter(|sku| matching.contains(&sku.id))
                        .collect();
                    let pooled = SkuFields::pooled(&matched);
                    self.set_sku_fields(pooled);
                }
            }
            [] => {}
        }

        self.emit(&StoreEvent::SkuOptions(self.sku_options.clone()));
    }

    /// Seeds the inline SKU lookup table.
    pub fn set_skus(&mut self, data: Vec<Sku>) {
        self.sku_data = Some(data.clone());
        self.emit(&StoreEvent::SkuData(data));
    }

    /// Pushes a displayed-fields snapshot computed outside the lookup table.
    pub fn set_sku_fields(&mut self, fields: SkuFields) {
        self.sku_fields = Some(fields.clone());
        self.emit(&StoreEvent::SkuFields(fields));
    }

    /// Adds the selected SKU to the cart, or signals that nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns the cart service's error unchanged; no event is emitted in that case.
    pub async fn add_to_cart<C>(&mut self, cart: &C) -> Result<AddToCartOutcome, CartError>
    where
        C: CartService + ?Sized,
    {
        let Some(sku_id) = self.selected_sku_id.clone() else {
            tracing::info!(product_id = %self.product_id, "add to cart without a selected sku");
            self.emit(&StoreEvent::NoSkuSelected);
            return Ok(AddToCartOutcome::NoSkuSelected);
        };

        let sku = SkuRef {
            product_id: self.product_id.clone(),
            sku_id: sku_id.clone(),
        };
        cart.add_sku_to_cart(&sku, self.slot_id.as_deref(), 1).await?;

        self.emit(&StoreEvent::AddedToCart {
            sku_id: sku_id.clone(),
        });
        Ok(AddToCartOutcome::Added { sku_id })
    }

    /// Subscribes `callback` to `key`.
    ///
    /// When the slice already holds a value the callback runs once with it
    /// before this returns.
    pub fn listen<F>(&mut self, key: StoreKey, callback: F) -> ListenerId
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;

        let mut callback: Listener = Box::new(callback);
        if let Some(current) = self.current(key) {
            callback(&current);
        }
        self.subscriptions.push(Subscription { id, key, callback });
        id
    }

    /// Removes one listener. Returns `false` if it was already gone.
    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Drops every listener, e.g. when the product root leaves the page.
    pub fn clear_listeners(&mut self) {
        self.subscriptions.clear();
    }

    fn current(&self, key: StoreKey) -> Option<StoreEvent> {
        match key {
            StoreKey::SelectedSkuId => self.selected_sku_id.clone().map(StoreEvent::SelectedSkuId),
            StoreKey::SkuOptions => Some(StoreEvent::SkuOptions(self.sku_options.clone())),
            StoreKey::SkuFields => self.sku_fields.clone().map(StoreEvent::SkuFields),
            StoreKey::SkuData => self.sku_data.clone().map(StoreEvent::SkuData),
            StoreKey::Cart => None,
        }
    }

    fn emit(&mut self, event: &StoreEvent) {
        let key = event.key();
        for sub in self.subscriptions.iter_mut().filter(|s| s.key == key) {
            (sub.callback)(event);
        }
    }

    fn find_sku(&self, sku_id: &str) -> Option<&Sku> {
        self.sku_data.as_ref()?.iter().find(|sku| sku.id == sku_id)
    }

    /// Ids present in every group's candidate set, in the first group's order.
    fn intersect_options(&self) -> Vec<String> {
        let mut groups = self.sku_options.values();
        let Some(first) = groups.next() else {
            return Vec::new();
        };
        let rest: Vec<HashSet<&str>> = groups
            .map(|ids| ids.iter().map(String::as_str).collect())
            .collect();
        first
            .iter()
            .filter(|id| rest.iter().all(|set| set.contains(id.as_str())))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
