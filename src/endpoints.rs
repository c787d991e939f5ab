//! The API endpoint URIs.

/// The route to create and list transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the largest transactions.
pub const TOP_TRANSACTIONS: &str = "/api/transactions/top5";
/// The route for the dashboard summary.
pub const DASHBOARD: &str = "/api/dashboard";
/// The route for the flat expense-per-category breakdown (bar chart).
pub const DASHBOARD_BAR: &str = "/api/dashboard/bar";
/// The route for the flat income-per-category breakdown (donut chart).
pub const DASHBOARD_DONUT: &str = "/api/dashboard/donut";
/// The route for the monthly expense-per-category matrix.
pub const DASHBOARD_MONTHLY_BAR: &str = "/api/dashboard/monthly-bar";
/// The route to upload a new campaign.
pub const CAMPAIGNS_API: &str = "/api/campaigns";
/// The route for the currently active campaign.
pub const ACTIVE_CAMPAIGN: &str = "/api/campaigns/active";
/// The route uploaded campaign images are served from.
pub const UPLOADS: &str = "/uploads";
