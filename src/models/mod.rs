//! Contains the domain models for the application.

mod campaign;
mod category;
mod summary;
mod transaction;

pub use campaign::{Campaign, CampaignDraft};
pub use category::{Categories, CategoryName, MAX_CATEGORIES};
pub use summary::{
    CategoryTotal, DashboardSummary, MonthYear, MonthlyBalance, MonthlyCategoryGroup, month_label,
};
pub use transaction::{Transaction, TransactionBuilder, TransactionType};

/// Alias for the integer type used for the IDs of database rows.
pub type DatabaseID = i64;
