//! Contains traits and implementations for objects that store the domain
//! [models](crate::models).

mod campaign;
mod transaction;

pub mod sqlite;

pub use campaign::CampaignStore;
pub use transaction::{
    FanoutRow, SortOrder, TransactionFilter, TransactionQuery, TransactionStore,
};
