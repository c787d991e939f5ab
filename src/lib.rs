//! Cashflow is a backend for tracking personal income and expenses.
//!
//! This library provides a JSON REST API for recording transactions,
//! serving paginated listings, deriving dashboard aggregates (monthly
//! balances with a running saldo and per-category breakdowns), and
//! managing a single active promotional campaign banner.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod campaign;
mod dashboard;
mod db;
mod endpoints;
mod models;
mod pagination;
mod routing;
mod state;
pub mod stores;
mod timezone;
mod transaction;

pub use db::initialize as initialize_db;
pub use models::{
    Campaign, Categories, CategoryName, CategoryTotal, DashboardSummary, MonthlyBalance,
    MonthlyCategoryGroup, Transaction, TransactionBuilder, TransactionType,
};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use state::AppState;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction was created with more categories than allowed.
    #[error(
        "a transaction may have at most {max} categories, got {0}",
        max = models::MAX_CATEGORIES
    )]
    TooManyCategories(usize),

    /// An empty string was used as a category label.
    #[error("category labels cannot be empty")]
    EmptyCategoryName,

    /// A negative amount was used to create a transaction.
    ///
    /// Amounts are non-negative; whether money came in or went out is
    /// carried by the transaction type, not the sign of the amount.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(f64),

    /// A string that is neither an income nor an expense marker was used as
    /// a transaction type.
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionType(String),

    /// A date or date-time string could not be parsed.
    ///
    /// Callers should pass in the string that caused the error.
    #[error("could not parse \"{0}\" as a date")]
    InvalidDate(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// No campaign is currently active, or the active one is outside its
    /// display window.
    #[error("no active campaign")]
    NoActiveCampaign,

    /// The multipart form for a campaign upload could not be parsed.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The campaign upload form did not contain an image file.
    #[error("image is required")]
    MissingImage,

    /// The uploaded campaign file is not a supported image format.
    #[error("campaign images must be JPEG or PNG files")]
    NotAnImage,

    /// The uploaded campaign image could not be written to disk.
    #[error("could not save uploaded file: {0}")]
    FileSaveError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::TooManyCategories(_)
            | Error::EmptyCategoryName
            | Error::NegativeAmount(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidDate(_)
            | Error::MultipartError(_)
            | Error::MissingImage
            | Error::NotAnImage => StatusCode::BAD_REQUEST,
            Error::NotFound | Error::DeleteMissingTransaction | Error::NoActiveCampaign => {
                StatusCode::NOT_FOUND
            }
            error => {
                // Retrieval failures are logged server-side and not detailed
                // to the client.
                tracing::error!("An unexpected error occurred: {}", error);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "internal server error"})),
                )
                    .into_response();
            }
        };

        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
