//! FinTrack is a web app for tracking personal spending across bank accounts.
//!
//! Users register with an email and password, link simulated bank accounts,
//! sync synthetic transactions from a mock bank feed, and view their monthly
//! spending on a dashboard. Transactions are auto-categorized by matching
//! merchant keywords in their descriptions.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod auth;
mod bank;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod log_in;
mod log_out;
mod logging;
mod month;
mod navigation;
mod not_found;
mod password;
mod register_user;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserId, get_user_by_id};

use crate::{
    alert::Alert,
    category::CategoryId,
    internal_server_error::render_internal_server_error,
    not_found::get_404_not_found_response,
};

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
    /// The user provided an invalid email/password combination.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email used to register an account is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The email used to register an account already belongs to a user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An empty string was used for an account name or nickname.
    #[error("account name cannot be empty")]
    EmptyAccountName,

    /// A transaction was given a negative amount.
    ///
    /// Amounts are absolute values, with the direction of the money flow
    /// recorded separately as a debit/credit kind.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(f64),

    /// The category ID used for a transaction did not match a stored category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// The caller tried to modify an account or transaction that belongs to
    /// another user.
    #[error("the resource belongs to another user")]
    Unauthorized,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,

    /// Tried to delete an account that does not exist
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
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
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => render_internal_server_error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                ),
            ),
            Error::DatabaseLockError => render_internal_server_error(
                "Sorry, something went wrong.",
                "Try again later or check the server logs",
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs",
                )
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::Unauthorized => (
                StatusCode::FORBIDDEN,
                Alert::error(
                    "Not allowed",
                    "The account or transaction belongs to another user.",
                )
                .into_html(),
            )
                .into_response(),
            Error::EmptyAccountName => (
                StatusCode::BAD_REQUEST,
                Alert::error("Invalid account name", "The account name cannot be empty.").into_html(),
            )
                .into_response(),
            Error::InvalidCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                Alert::error(
                    "Invalid category",
                    &format!("Could not find a category with the ID {category_id:?}"),
                )
                .into_html(),
            )
                .into_response(),
            Error::UpdateMissingAccount => (
                StatusCode::NOT_FOUND,
                Alert::error("Could not update account", "The account could not be found.")
                    .into_html(),
            )
                .into_response(),
            Error::DeleteMissingAccount => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Could not delete account",
                    "The account could not be found. \
                    Try refreshing the page to see if the account has already been deleted.",
                )
                .into_html(),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::error("Not found", "The requested resource could not be found.").into_html(),
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::error(
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    )
                    .into_html(),
                )
                    .into_response()
            }
        }
    }
}
