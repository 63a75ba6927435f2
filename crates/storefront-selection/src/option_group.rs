//! One selectable product dimension (e.g. "Color") bound to a [`SelectionStore`].
//!
//! A group pushes the candidate SKU ids of its chosen option into the store and
//! pulls back every other group's choices to decide which of its own options
//! are still reachable. Groups never reference each other directly.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::SelectionError;
use crate::scope::{NodeId, NodeTree, ScopeRegistry, ScopeToken};
use crate::store::{ListenerId, SelectionStore, StoreEvent, StoreKey};

/// One option control within a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkuOption {
    pub value: String,
    /// SKUs matching this option that are in stock.
    pub sku_ids: Vec<String>,
    /// SKUs matching this option that are out of stock. Disjoint from `sku_ids`.
    pub unavailable_sku_ids: Vec<String>,
    pub preselected: bool,
}

impl SkuOption {
    pub fn new<I, S>(value: impl Into<String>, sku_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value: value.into(),
            sku_ids: sku_ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_unavailable<I, S>(mut self, sku_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unavailable_sku_ids = sku_ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn preselected(mut self) -> Self {
        self.preselected = true;
        self
    }

    /// In-stock and out-of-stock ids together.
    #[must_use]
    pub fn all_sku_ids(&self) -> Vec<String> {
        self.sku_ids
            .iter()
            .chain(&self.unavailable_sku_ids)
            .cloned()
            .collect()
    }
}

/// Visual state of one option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionState {
    pub selected: bool,
    /// No SKU, in stock or not, matches the other groups' choices.
    pub disabled: bool,
    /// Only out-of-stock SKUs match the other groups' choices.
    pub unavailable: bool,
}

#[derive(Debug)]
struct Entry {
    option: SkuOption,
    state: OptionState,
}

type Entries = Arc<Mutex<Vec<Entry>>>;

#[derive(Debug)]
pub struct OptionGroup {
    name: String,
    entries: Entries,
    listener: ListenerId,
}

impl OptionGroup {
    /// Registers the group with `store`, applies any preselection and starts
    /// tracking the other groups' choices.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::MissingOptionGroupName`] if `name` is blank.
    pub fn connect(
        name: &str,
        options: Vec<SkuOption>,
        store: &mut SelectionStore,
    ) -> Result<Self, SelectionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SelectionError::MissingOptionGroupName);
        }

        store.register_option_group();

        let preselected = options.iter().position(|o| o.preselected);
        let entries: Vec<Entry> = options
            .into_iter()
            .enumerate()
            .map(|(i, option)| Entry {
                option,
                state: OptionState {
                    selected: Some(i) == preselected,
                    ..OptionState::default()
                },
            })
            .collect();
        let preselected_ids = preselected.map(|i| entries[i].option.all_sku_ids());
        let entries = Arc::new(Mutex::new(entries));

        if let Some(ids) = preselected_ids {
            store.select_sku_option(name, ids);
        }

        let tracked = Arc::clone(&entries);
        let own_name = name.to_owned();
        let listener = store.listen(StoreKey::SkuOptions, move |event| {
            if let StoreEvent::SkuOptions(options) = event {
                refresh(&own_name, &mut tracked.lock(), options);
            }
        });

        tracing::debug!(group = name, product_id = %store.product_id(), "option group connected");
        Ok(Self {
            name: name.to_owned(),
            entries,
            listener,
        })
    }

    /// Like [`OptionGroup::connect`], locating the store provided nearest above `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::StoreNotFound`] if no ancestor provides a store,
    /// or [`SelectionError::MissingOptionGroupName`] if `name` is blank.
    pub fn connect_in_scope(
        name: &str,
        options: Vec<SkuOption>,
        tree: &NodeTree,
        registry: &mut ScopeRegistry,
        node: NodeId,
        token: &ScopeToken<SelectionStore>,
    ) -> Result<Self, SelectionError> {
        let store = registry
            .resolve_mut(tree, node, token)
            .ok_or_else(|| SelectionError::StoreNotFound {
                group: name.to_owned(),
            })?;
        Self::connect(name, options, store)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state of every option, in declaration order.
    #[must_use]
    pub fn states(&self) -> Vec<OptionState> {
        self.entries.lock().iter().map(|e| e.state).collect()
    }

    /// Value of the selected option, if any.
    #[must_use]
    pub fn selected_value(&self) -> Option<String> {
        self.entries
            .lock()
            .iter()
            .find(|e| e.state.selected)
            .map(|e| e.option.value.clone())
    }

    /// Handles a click on the option at `index`.
    ///
    /// Returns `Ok(false)` without touching the store when the option is
    /// disabled or unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownOption`] if `index` is out of range.
    pub fn click(&self, index: usize, store: &mut SelectionStore) -> Result<bool, SelectionError> {
        let ids = {
            let mut entries = self.entries.lock();
            let Some(entry) = entries.get(index) else {
                return Err(SelectionError::UnknownOption {
                    group: self.name.clone(),
                    index,
                });
            };
            if entry.state.disabled || entry.state.unavailable {
                return Ok(false);
            }
            for (i, e) in entries.iter_mut().enumerate() {
                e.state.selected = i == index;
            }
            entries[index].option.all_sku_ids()
        };

        store.select_sku_option(&self.name, ids);
        Ok(true)
    }

    /// Stops tracking the store, e.g. when the group leaves the page.
    pub fn disconnect(self, store: &mut SelectionStore) {
        store.unlisten(self.listener);
    }
}

/// Recomputes availability of `name`'s options against every other group's choice.
fn refresh(name: &str, entries: &mut [Entry], options: &BTreeMap<String, Vec<String>>) {
    let others: Vec<HashSet<&str>> = options
        .iter()
        .filter(|(group, _)| group.as_str() != name)
        .map(|(_, ids)| ids.iter().map(String::as_str).collect())
        .collect();

    for entry in entries {
        let option = &entry.option;
        let available = meets_all(&others, option.sku_ids.iter());
        let exists = meets_all(
            &others,
            option.sku_ids.iter().chain(&option.unavailable_sku_ids),
        );
        entry.state.disabled = !available && !exists;
        entry.state.unavailable = !available && exists;
    }
}

/// `true` when `ids` shares at least one id with every set in `others`.
fn meets_all<'a>(others: &[HashSet<&str>], ids: impl Iterator<Item = &'a String>) -> bool {
    let ids: Vec<&str> = ids.map(String::as_str).collect();
    others
        .iter()
        .all(|set| ids.iter().any(|id| set.contains(id)))
}

#[cfg(test)]
#[path = "option_group_test.rs"]
mod tests;
