//! Endpoints for renaming, toggling, and deleting accounts.
//!
//! Unlike the read paths, these are state-mutating operations, so operating
//! on another user's account is an explicit unauthorized error rather than a
//! silent fallback.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::core::{
        AccountId, AccountRef, get_bank_account, get_linked_account, rename_bank_account,
        toggle_bank_account_active,
    },
    alert::Alert,
    transaction::delete_account_transactions,
    user::UserId,
};

/// The state needed to manage accounts.
#[derive(Debug, Clone)]
pub struct ManageAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ManageAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for renaming an account.
#[derive(Debug, Deserialize)]
pub struct RenameAccountForm {
    /// The new display name.
    pub account_name: String,
}

/// A route handler for renaming a legacy account, responds with an alert.
pub async fn rename_account_endpoint(
    State(state): State<ManageAccountState>,
    Extension(user_id): Extension<UserId>,
    Path(account_id): Path<AccountId>,
    Form(form): Form<RenameAccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = assert_bank_account_owner(account_id, user_id, &connection)
        .and_then(|_| rename_bank_account(account_id, &form.account_name, &connection));

    match result {
        Ok(()) => Alert::success("Account renamed", "").into_response(),
        Err(error) => {
            tracing::error!("could not rename account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for toggling a legacy account's active flag, responds
/// with an alert.
pub async fn toggle_account_endpoint(
    State(state): State<ManageAccountState>,
    Extension(user_id): Extension<UserId>,
    Path(account_id): Path<AccountId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = assert_bank_account_owner(account_id, user_id, &connection)
        .and_then(|_| toggle_bank_account_active(account_id, &connection));

    match result {
        Ok(is_active) => {
            let message = if is_active {
                "Account activated"
            } else {
                "Account deactivated"
            };

            Alert::success(message, "").into_response()
        }
        Err(error) => {
            tracing::error!("could not toggle account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a linked account along with its
/// transactions, responds with an alert.
pub async fn delete_linked_account_endpoint(
    State(state): State<ManageAccountState>,
    Extension(user_id): Extension<UserId>,
    Path(account_id): Path<AccountId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_linked_account_with_transactions(account_id, user_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(nickname) => Alert::success(
            "Account deleted",
            &format!("Deleted {nickname} and its transactions."),
        )
        .into_response(),
        Err(error) => {
            tracing::error!("could not delete linked account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

/// Check that the legacy account exists and belongs to `user_id`.
fn assert_bank_account_owner(
    account_id: AccountId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let account = get_bank_account(account_id, connection)?;

    if account.user_id != user_id {
        return Err(Error::Unauthorized);
    }

    Ok(())
}

/// Delete a linked account and its transactions in one SQL transaction.
fn delete_linked_account_with_transactions(
    account_id: AccountId,
    user_id: UserId,
    connection: &Connection,
) -> Result<String, Error> {
    let account = get_linked_account(account_id, connection)?;

    if account.user_id != user_id {
        return Err(Error::Unauthorized);
    }

    let sql_transaction = connection.unchecked_transaction()?;

    delete_account_transactions(AccountRef::Linked(account_id), &sql_transaction)?;
    super::core::delete_linked_account(account_id, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(account.nickname)
}

#[cfg(test)]
mod manage_account_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        account::{
            AccountRef, create_bank_account, create_linked_account, get_linked_account,
        },
        db::initialize,
        transaction::{Transaction, count_transactions, create_transaction},
        user::{UserId, create_user},
    };

    use super::{assert_bank_account_owner, delete_linked_account_with_transactions};

    fn get_test_connection() -> (Connection, UserId, UserId) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user("test@test.com", PasswordHash::new_unchecked("hunter2"), &conn)
            .unwrap();
        let other = create_user(
            "other@test.com",
            PasswordHash::new_unchecked("hunter3"),
            &conn,
        )
        .unwrap();

        (conn, user.id, other.id)
    }

    #[test]
    fn owner_check_accepts_own_account() {
        let (conn, user_id, _) = get_test_connection();
        let account = create_bank_account(user_id, "Primary", &conn).unwrap();

        assert_eq!(assert_bank_account_owner(account.id, user_id, &conn), Ok(()));
    }

    #[test]
    fn owner_check_rejects_other_users_account() {
        let (conn, user_id, other_id) = get_test_connection();
        let account = create_bank_account(other_id, "Theirs", &conn).unwrap();

        assert_eq!(
            assert_bank_account_owner(account.id, user_id, &conn),
            Err(Error::Unauthorized)
        );
    }

    #[test]
    fn owner_check_rejects_unknown_account() {
        let (conn, user_id, _) = get_test_connection();

        assert_eq!(
            assert_bank_account_owner(1337, user_id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_removes_account_and_its_transactions() {
        let (conn, user_id, _) = get_test_connection();
        let account = create_linked_account(user_id, "HDFC Bank", "Salary", &conn).unwrap();
        let keep = create_linked_account(user_id, "ICICI Bank", "Spending", &conn).unwrap();
        create_transaction(
            Transaction::build(user_id, 100.0, date!(2025 - 03 - 05), "Payment to Zomato")
                .account(Some(AccountRef::Linked(account.id))),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(user_id, 200.0, date!(2025 - 03 - 06), "Payment to Uber")
                .account(Some(AccountRef::Linked(keep.id))),
            &conn,
        )
        .unwrap();

        let nickname =
            delete_linked_account_with_transactions(account.id, user_id, &conn).unwrap();

        assert_eq!(nickname, "Salary");
        assert_eq!(get_linked_account(account.id, &conn), Err(Error::NotFound));
        assert_eq!(count_transactions(&conn).unwrap(), 1);
    }

    #[test]
    fn delete_rejects_other_users_account() {
        let (conn, user_id, other_id) = get_test_connection();
        let account = create_linked_account(other_id, "HDFC Bank", "Theirs", &conn).unwrap();

        let result = delete_linked_account_with_transactions(account.id, user_id, &conn);

        assert_eq!(result, Err(Error::Unauthorized));
        assert!(get_linked_account(account.id, &conn).is_ok());
    }
}
