use thiserror::Error;

/// Misconfiguration detected while wiring an option group to its store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("option group is missing a name")]
    MissingOptionGroupName,

    #[error("no selection store found above option group \"{group}\"")]
    StoreNotFound { group: String },

    #[error("option group \"{group}\" has no option at index {index}")]
    UnknownOption { group: String, index: usize },
}

/// Errors returned by a [`crate::CartService`].
#[derive(Debug, Error)]
pub enum CartError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid shop URL \"{shop_url}\": {reason}")]
    InvalidShopUrl { shop_url: String, reason: String },
}
