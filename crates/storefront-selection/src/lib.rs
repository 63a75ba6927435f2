//! Per-product SKU selection state shared by independent option-group UIs.

pub mod cart;
pub mod error;
pub mod option_group;
pub mod scope;
pub mod store;

pub use cart::{CartService, ShopifyCartClient, SkuRef};
pub use error::{CartError, SelectionError};
pub use option_group::{OptionGroup, OptionState, SkuOption};
pub use scope::{NodeId, NodeTree, ScopeRegistry, ScopeToken};
pub use store::{AddToCartOutcome, ListenerId, SelectionStore, StoreEvent, StoreKey};
