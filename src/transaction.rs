//! Transaction route handlers: creation, paginated/filtered listing,
//! deletion, and the largest-transactions listing.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, format_description::FormatItem, macros::format_description};

use crate::{
    AppState, Error,
    models::{
        Categories, CategoryName, DatabaseID, Transaction, TransactionBuilder, TransactionType,
    },
    stores::{CampaignStore, TransactionFilter, TransactionQuery, TransactionStore},
    timezone,
};

use crate::stores::SortOrder;

/// How many transactions the top-transactions endpoint reports.
const TOP_TRANSACTION_COUNT: u64 = 5;

const DATE_FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// The request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct NewTransactionPayload {
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The non-negative amount of money spent or earned.
    pub amount: f64,
    /// Up to three category labels.
    #[serde(default)]
    pub categories: Vec<String>,
    /// A text description of what the transaction was for.
    #[serde(default)]
    pub description: String,
    /// The logical date of the transaction. Defaults to today.
    pub transaction_at: Option<Date>,
    /// The record timestamp. Defaults to the current time when not sent by
    /// the client.
    pub created_at: Option<OffsetDateTime>,
}

/// A transaction as rendered in responses.
///
/// The same as the domain model except that `created_at` is formatted in
/// the server's configured local timezone for display.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// The ID of the transaction.
    pub id: DatabaseID,
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// The category labels of the transaction.
    pub categories: Categories,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The logical date of the transaction.
    pub transaction_at: Date,
    /// The insertion timestamp, formatted in the server's local timezone.
    pub created_at: String,
}

impl TransactionResponse {
    fn new(transaction: Transaction, local_timezone: &str) -> Self {
        Self {
            id: transaction.id,
            transaction_type: transaction.transaction_type,
            amount: transaction.amount,
            categories: transaction.categories,
            description: transaction.description,
            transaction_at: transaction.transaction_at,
            created_at: timezone::format_local(transaction.created_at, local_timezone),
        }
    }
}

/// Handle the creation of a transaction.
///
/// Validation (non-negative amount, at most three non-empty categories)
/// happens while building the transaction, before anything is written to
/// the store.
pub async fn create_transaction_endpoint<T, C>(
    State(mut state): State<AppState<T, C>>,
    Json(payload): Json<NewTransactionPayload>,
) -> Result<(StatusCode, Json<TransactionResponse>), Error>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    let mut builder = TransactionBuilder::new(payload.transaction_type, payload.amount)?
        .categories(payload.categories)?
        .description(&payload.description);

    if let Some(transaction_at) = payload.transaction_at {
        builder = builder.transaction_at(transaction_at);
    }

    if let Some(created_at) = payload.created_at {
        builder = builder.created_at(created_at);
    }

    let transaction = state.transaction_store.create(builder)?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse::new(transaction, &state.local_timezone)),
    ))
}

/// The query parameters accepted by the transaction listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListParams {
    /// The 1-based page number.
    pub page: Option<u64>,
    /// The number of transactions per page.
    pub limit: Option<u64>,
    /// Only include transactions of this type.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Only include transactions carrying this category label.
    pub category: Option<String>,
    /// Only include transactions on or after this date (YYYY-MM-DD).
    pub start_date: Option<String>,
    /// Only include transactions on or before this date (YYYY-MM-DD).
    pub end_date: Option<String>,
    /// Only include transactions whose description contains this text.
    pub note: Option<String>,
    /// Only include transactions with at least this amount.
    pub min_amount: Option<f64>,
    /// Only include transactions with at most this amount.
    pub max_amount: Option<f64>,
}

impl TransactionListParams {
    /// Convert the raw request parameters into a store filter.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidTransactionType] if the type filter is not a known
    ///   type marker,
    /// - [Error::InvalidDate] if a date filter is not a YYYY-MM-DD date.
    fn to_filter(&self) -> Result<TransactionFilter, Error> {
        let transaction_type = self
            .transaction_type
            .as_deref()
            .map(TransactionType::parse)
            .transpose()?;

        let parse_date = |value: &str| {
            Date::parse(value, DATE_FORMAT).map_err(|_| Error::InvalidDate(value.to_string()))
        };

        let start_date = self.start_date.as_deref().map(parse_date).transpose()?;
        let end_date = self.end_date.as_deref().map(parse_date).transpose()?;
        let date_range = match (start_date, end_date) {
            (None, None) => None,
            (start, end) => {
                Some(start.unwrap_or(Date::MIN)..=end.unwrap_or(Date::MAX))
            }
        };

        Ok(TransactionFilter {
            transaction_type,
            category: self
                .category
                .as_deref()
                .map(CategoryName::new)
                .transpose()?,
            date_range,
            note: self.note.clone(),
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        })
    }
}

/// The transaction listing response: one page of data plus totals over the
/// full filtered set.
#[derive(Debug, Serialize)]
pub struct TransactionListResponse {
    /// The requested page of transactions, newest first.
    pub data: Vec<TransactionResponse>,
    /// The number of transactions matching the filters, ignoring
    /// pagination.
    pub total_count: u64,
    /// The summed amount of the transactions matching the filters,
    /// ignoring pagination.
    pub total_amount: f64,
    /// The 1-based page number served.
    pub page: u64,
    /// The page size served.
    pub limit: u64,
}

/// Handle the paginated, filtered transaction listing.
pub async fn get_transactions_endpoint<T, C>(
    State(state): State<AppState<T, C>>,
    Query(params): Query<TransactionListParams>,
) -> Result<Json<TransactionListResponse>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    let filter = params.to_filter()?;
    let page_request = state
        .pagination_config
        .resolve(params.page, params.limit);

    let total_count = state.transaction_store.count(&filter)?;
    let total_amount = state.transaction_store.sum_filtered(&filter)?;

    let transactions = state.transaction_store.get_query(TransactionQuery {
        filter,
        limit: Some(page_request.limit),
        offset: page_request.offset(),
        sort_created: Some(SortOrder::Descending),
    })?;

    let data = transactions
        .into_iter()
        .map(|transaction| TransactionResponse::new(transaction, &state.local_timezone))
        .collect();

    Ok(Json(TransactionListResponse {
        data,
        total_count,
        total_amount,
        page: page_request.page,
        limit: page_request.limit,
    }))
}

/// Handle the deletion of a transaction by its ID.
///
/// Deleting an unknown ID reports not-found, distinct from a retrieval
/// failure.
pub async fn delete_transaction_endpoint<T, C>(
    State(mut state): State<AppState<T, C>>,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<Json<serde_json::Value>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    state.transaction_store.delete(transaction_id)?;

    Ok(Json(serde_json::json!({
        "message": "transaction deleted"
    })))
}

/// Handle the listing of the five largest transactions by amount.
pub async fn get_top_transactions_endpoint<T, C>(
    State(state): State<AppState<T, C>>,
) -> Result<Json<Vec<TransactionResponse>>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    let transactions = state.transaction_store.top_by_amount(TOP_TRANSACTION_COUNT)?;

    let data = transactions
        .into_iter()
        .map(|transaction| TransactionResponse::new(transaction, &state.local_timezone))
        .collect();

    Ok(Json(data))
}
