//! Implements a struct that holds the state of the REST server.

use std::path::{Path, PathBuf};

use crate::{
    pagination::PaginationConfig,
    stores::{CampaignStore, TransactionStore},
};

/// The state of the REST server.
///
/// The stores are injected rather than held as ambient process state, so
/// tests can build a state over an in-memory database.
#[derive(Debug, Clone)]
pub struct AppState<T, C>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    ///
    /// Used for rendering record timestamps in responses.
    pub local_timezone: String,

    /// The directory uploaded campaign images are written to.
    pub uploads_dir: PathBuf,

    /// The config that controls how to page listings.
    pub pagination_config: PaginationConfig,

    /// The store for transactions, which also serves the dashboard's
    /// aggregation queries.
    pub transaction_store: T,

    /// The store for campaigns.
    pub campaign_store: C,
}

impl<T, C> AppState<T, C>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g.
    /// "Asia/Jakarta".
    pub fn new(
        local_timezone: &str,
        uploads_dir: &Path,
        pagination_config: PaginationConfig,
        transaction_store: T,
        campaign_store: C,
    ) -> Self {
        Self {
            local_timezone: local_timezone.to_owned(),
            uploads_dir: uploads_dir.to_owned(),
            pagination_config,
            transaction_store,
            campaign_store,
        }
    }
}
