//! The endpoint for manually setting or clearing a transaction's category.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    category::CategoryId,
    transaction::core::{TransactionId, get_transaction, set_transaction_category},
    user::UserId,
};

/// The state needed to categorize a transaction.
#[derive(Debug, Clone)]
pub struct CategorizeState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategorizeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for a manual categorization.
#[derive(Debug, Deserialize)]
pub struct SetCategoryForm {
    /// The category ID as a string; empty or "null" clears the category.
    #[serde(default)]
    pub category_id: String,
}

impl SetCategoryForm {
    /// Parse the raw category field.
    ///
    /// Returns `Ok(None)` for an empty or "null" value, `Ok(Some(id))` for
    /// an integer, and `Err` for anything else.
    fn parse_category_id(&self) -> Result<Option<CategoryId>, ()> {
        let raw = self.category_id.trim();

        if raw.is_empty() || raw == "null" {
            return Ok(None);
        }

        raw.parse().map(Some).map_err(|_| ())
    }
}

/// A route handler for manually setting or clearing a transaction's
/// category.
///
/// Changing another user's transaction is an explicit unauthorized error.
pub async fn set_transaction_category_endpoint(
    State(state): State<CategorizeState>,
    Extension(user_id): Extension<UserId>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<SetCategoryForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let Ok(category_id) = form.parse_category_id() else {
        return (
            StatusCode::BAD_REQUEST,
            Alert::error(
                "Invalid category",
                &format!("\"{}\" is not a category ID.", form.category_id),
            )
            .into_html(),
        )
            .into_response();
    };

    match apply_category(transaction_id, user_id, category_id, &connection) {
        Ok(()) => {
            let message = if category_id.is_some() {
                "Category updated"
            } else {
                "Category cleared"
            };

            Alert::success(message, "").into_response()
        }
        Err(error) => {
            tracing::error!("could not categorize transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn apply_category(
    transaction_id: TransactionId,
    user_id: UserId,
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = get_transaction(transaction_id, connection)?;

    if transaction.user_id != user_id {
        return Err(Error::Unauthorized);
    }

    set_transaction_category(transaction_id, category_id, connection)
}
