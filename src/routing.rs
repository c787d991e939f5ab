//! Application router configuration.

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    campaign::{create_campaign_endpoint, get_active_campaign_endpoint},
    dashboard::{get_bar_chart, get_dashboard, get_donut_chart, get_monthly_bar_chart},
    endpoints,
    stores::{CampaignStore, TransactionStore},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_top_transactions_endpoint,
        get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Uploaded campaign banners are served as static files from the uploads
/// directory configured in `state`.
pub fn build_router<T, C>(state: AppState<T, C>) -> Router
where
    T: TransactionStore + Clone + Send + Sync + 'static,
    C: CampaignStore + Clone + Send + Sync + 'static,
{
    let uploads_dir = state.uploads_dir.clone();

    Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(
            endpoints::TOP_TRANSACTIONS,
            get(get_top_transactions_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard))
        .route(endpoints::DASHBOARD_BAR, get(get_bar_chart))
        .route(endpoints::DASHBOARD_DONUT, get(get_donut_chart))
        .route(
            endpoints::DASHBOARD_MONTHLY_BAR,
            get(get_monthly_bar_chart),
        )
        .route(endpoints::CAMPAIGNS_API, post(create_campaign_endpoint))
        .route(
            endpoints::ACTIVE_CAMPAIGN,
            get(get_active_campaign_endpoint),
        )
        .nest_service(endpoints::UPLOADS, ServeDir::new(uploads_dir))
        .with_state(state)
}
