//! The endpoint for syncing a linked account against the mock bank feed.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rand::thread_rng;
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{AccountId, AccountRef, get_linked_account, touch_linked_account_sync},
    alert::Alert,
    bank::{statement::generate_monthly_statement, sync::ingest_statement},
    category::{CATEGORY_KEYWORDS, CategoryLookup},
    timezone::local_date_today,
    user::UserId,
};

/// The state needed to sync a linked account.
#[derive(Debug, Clone)]
pub struct SyncState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for SyncState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for a sync request.
#[derive(Debug, Deserialize)]
pub struct SyncForm {
    /// The linked account to sync.
    pub account_id: AccountId,
}

/// A route handler that pulls the current month's statement from the mock
/// bank feed into one linked account.
///
/// Ownership is checked explicitly: syncing another user's account is an
/// unauthorized error, unlike the read paths which silently fall back.
pub async fn sync_linked_account_endpoint(
    State(state): State<SyncState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<SyncForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let Some(today) = local_date_today(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone.clone()).into_alert_response();
    };

    match sync_account(user_id, form.account_id, today, &connection) {
        Ok((inserted, nickname)) => {
            tracing::info!("synced {inserted} new transactions for account {nickname:?}");

            Alert::success(
                "Sync complete",
                &format!("Synced {inserted} new transactions for {nickname}."),
            )
            .into_response()
        }
        Err(error) => {
            tracing::error!("could not sync account {}: {error}", form.account_id);
            error.into_alert_response()
        }
    }
}

/// Generate and ingest the current month's statement for one owned linked
/// account, inside a single SQL transaction.
fn sync_account(
    user_id: UserId,
    account_id: AccountId,
    today: time::Date,
    connection: &Connection,
) -> Result<(usize, String), Error> {
    let account = get_linked_account(account_id, connection)?;

    if account.user_id != user_id {
        return Err(Error::Unauthorized);
    }

    let sql_transaction = connection.unchecked_transaction()?;

    let lookup = CategoryLookup::load(&sql_transaction)?;
    let entries = generate_monthly_statement(today.year(), today.month(), &mut thread_rng());

    let inserted = ingest_statement(
        user_id,
        AccountRef::Linked(account.id),
        &entries,
        CATEGORY_KEYWORDS,
        &lookup,
        &sql_transaction,
    )?;

    touch_linked_account_sync(account.id, OffsetDateTime::now_utc(), &sql_transaction)?;

    sql_transaction.commit()?;

    Ok((inserted, account.nickname))
}
