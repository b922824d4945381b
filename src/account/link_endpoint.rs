//! Defines the endpoint for linking a new bank account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::core::create_linked_account,
    alert::Alert,
    endpoints,
    user::UserId,
};

/// The state needed to link an account.
#[derive(Debug, Clone)]
pub struct LinkAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LinkAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for linking an account.
#[derive(Debug, Deserialize)]
pub struct LinkAccountForm {
    /// The name of the bank the account is held with.
    pub bank_name: String,
    /// The user-chosen nickname for the account.
    pub account_nickname: String,
}

/// A route handler for linking a new account, redirects to the accounts view
/// on success.
pub async fn link_account_endpoint(
    State(state): State<LinkAccountState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<LinkAccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_linked_account(user_id, &form.bank_name, &form.account_nickname, &connection) {
        Ok(account) => {
            tracing::info!(
                "linked account {:?} ({:?}) for user {user_id}",
                account.nickname,
                account.bank_name
            );

            (
                HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::EmptyAccountName) => (
            StatusCode::BAD_REQUEST,
            Alert::error(
                "Missing details",
                "Bank name and account nickname are required.",
            )
            .into_html(),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not link account with {form:?}: {error}");
            error.into_alert_response()
        }
    }
}
