//! Scope-filtered transaction queries shared by the pages, the aggregator,
//! and the sync endpoints.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    account::{AccountRef, TransactionScope},
    month::CalendarMonth,
    transaction::core::{Transaction, map_transaction_row},
    user::UserId,
};

/// Retrieve the scope's transactions within `month`, most recent first.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_for_month(
    scope: &TransactionScope,
    month: CalendarMonth,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (column, owner_id) = scope.sql_filter();
    let query = format!(
        "SELECT id, user_id, bank_account_id, linked_account_id, date, description, amount, category_id, kind
         FROM \"transaction\"
         WHERE {column} = :owner AND strftime('%Y-%m', date) = :month
         ORDER BY date DESC, id DESC"
    );

    connection
        .prepare(&query)?
        .query_map(
            &[
                (":owner", &owner_id as &dyn rusqlite::ToSql),
                (":month", &month.to_string()),
            ],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// The distinct months the scope has transactions in, most recent first.
///
/// Rows whose date does not yield a parseable `YYYY-MM` value are skipped.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an SQL error.
pub fn get_scope_months(
    scope: &TransactionScope,
    connection: &Connection,
) -> Result<Vec<CalendarMonth>, Error> {
    let (column, owner_id) = scope.sql_filter();
    let query = format!(
        "SELECT DISTINCT strftime('%Y-%m', date) AS month
         FROM \"transaction\"
         WHERE {column} = :owner
         ORDER BY month DESC"
    );

    let months = connection
        .prepare(&query)?
        .query_map(&[(":owner", &owner_id)], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(months
        .iter()
        .filter_map(|month| CalendarMonth::parse(month))
        .collect())
}

/// Check whether an ingested statement entry is already stored for `account`.
///
/// A candidate is a duplicate only when the account, date, description, and
/// amount all match exactly; any difference creates a new transaction.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an SQL error.
pub fn statement_entry_exists(
    account: AccountRef,
    date: Date,
    description: &str,
    amount: f64,
    connection: &Connection,
) -> Result<bool, Error> {
    let (column, account_id) = match account {
        AccountRef::Legacy(id) => ("bank_account_id", id),
        AccountRef::Linked(id) => ("linked_account_id", id),
    };
    let query = format!(
        "SELECT EXISTS(
            SELECT 1 FROM \"transaction\"
            WHERE {column} = :account AND date = :date
              AND description = :description AND amount = :amount
         )"
    );

    connection
        .prepare(&query)?
        .query_row(
            &[
                (":account", &account_id as &dyn rusqlite::ToSql),
                (":date", &date),
                (":description", &description),
                (":amount", &amount),
            ],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Delete every transaction owned by `user_id` and return how many were removed.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an SQL error.
pub fn delete_user_transactions(user_id: UserId, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE user_id = ?1",
            (user_id.as_i64(),),
        )
        .map_err(|error| error.into())
}

/// Delete every transaction belonging to `account` and return how many were removed.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an SQL error.
pub fn delete_account_transactions(
    account: AccountRef,
    connection: &Connection,
) -> Result<usize, Error> {
    let (column, account_id) = match account {
        AccountRef::Legacy(id) => ("bank_account_id", id),
        AccountRef::Linked(id) => ("linked_account_id", id),
    };
    let query = format!("DELETE FROM \"transaction\" WHERE {column} = ?1");

    connection
        .execute(&query, (account_id,))
        .map_err(|error| error.into())
}

#[cfg(test)]
mod query_tests {
    use rusqlite::Connection;
    use time::{Month, macros::date};

    use crate::{
        PasswordHash,
        account::{AccountRef, TransactionScope, create_bank_account, create_linked_account},
        db::initialize,
        month::CalendarMonth,
        transaction::{Transaction, create_transaction},
        user::{UserId, create_user},
    };

    use super::{
        delete_account_transactions, delete_user_transactions, get_scope_months,
        get_transactions_for_month, statement_entry_exists,
    };

    fn get_test_connection() -> (Connection, UserId) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user("test@test.com", PasswordHash::new_unchecked("hunter2"), &conn)
            .expect("Could not create test user");

        (conn, user.id)
    }

    #[test]
    fn month_filter_uses_calendar_boundaries() {
        let (conn, user_id) = get_test_connection();
        let in_month = create_transaction(
            Transaction::build(user_id, 100.0, date!(2025 - 03 - 31), "Payment to Zomato"),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(user_id, 200.0, date!(2025 - 04 - 01), "Payment to Uber"),
            &conn,
        )
        .unwrap();

        let scope = TransactionScope::Combined(user_id);
        let month = CalendarMonth::new(2025, Month::March);

        let transactions = get_transactions_for_month(&scope, month, &conn).unwrap();

        assert_eq!(transactions, vec![in_month]);
    }

    #[test]
    fn transactions_are_ordered_most_recent_first() {
        let (conn, user_id) = get_test_connection();
        let earlier = create_transaction(
            Transaction::build(user_id, 100.0, date!(2025 - 03 - 05), "Payment to Zomato"),
            &conn,
        )
        .unwrap();
        let later = create_transaction(
            Transaction::build(user_id, 200.0, date!(2025 - 03 - 20), "Payment to Uber"),
            &conn,
        )
        .unwrap();

        let scope = TransactionScope::Combined(user_id);
        let month = CalendarMonth::new(2025, Month::March);

        let transactions = get_transactions_for_month(&scope, month, &conn).unwrap();

        assert_eq!(transactions, vec![later, earlier]);
    }

    #[test]
    fn individual_scope_only_sees_its_account() {
        let (conn, user_id) = get_test_connection();
        let legacy = create_bank_account(user_id, "Primary", &conn).unwrap();
        let linked = create_linked_account(user_id, "HDFC Bank", "Salary", &conn).unwrap();

        let legacy_transaction = create_transaction(
            Transaction::build(user_id, 100.0, date!(2025 - 03 - 05), "Payment to Zomato")
                .account(Some(AccountRef::Legacy(legacy.id))),
            &conn,
        )
        .unwrap();
        let linked_transaction = create_transaction(
            Transaction::build(user_id, 200.0, date!(2025 - 03 - 20), "Payment to Uber")
                .account(Some(AccountRef::Linked(linked.id))),
            &conn,
        )
        .unwrap();

        let month = CalendarMonth::new(2025, Month::March);

        let legacy_rows =
            get_transactions_for_month(&TransactionScope::Legacy(legacy.id), month, &conn).unwrap();
        assert_eq!(legacy_rows, vec![legacy_transaction.clone()]);

        let linked_rows =
            get_transactions_for_month(&TransactionScope::Linked(linked.id), month, &conn).unwrap();
        assert_eq!(linked_rows, vec![linked_transaction.clone()]);

        let combined_rows =
            get_transactions_for_month(&TransactionScope::Combined(user_id), month, &conn).unwrap();
        assert_eq!(combined_rows, vec![linked_transaction, legacy_transaction]);
    }

    #[test]
    fn scope_months_are_distinct_and_descending() {
        let (conn, user_id) = get_test_connection();
        for (amount, date) in [
            (100.0, date!(2025 - 01 - 10)),
            (150.0, date!(2025 - 01 - 25)),
            (200.0, date!(2025 - 03 - 20)),
        ] {
            create_transaction(
                Transaction::build(user_id, amount, date, "Payment to Zomato"),
                &conn,
            )
            .unwrap();
        }

        let months = get_scope_months(&TransactionScope::Combined(user_id), &conn).unwrap();

        assert_eq!(
            months,
            vec![
                CalendarMonth::new(2025, Month::March),
                CalendarMonth::new(2025, Month::January),
            ]
        );
    }

    #[test]
    fn statement_entry_exists_requires_exact_match() {
        let (conn, user_id) = get_test_connection();
        let linked = create_linked_account(user_id, "HDFC Bank", "Salary", &conn).unwrap();
        let account = AccountRef::Linked(linked.id);
        create_transaction(
            Transaction::build(user_id, 450.0, date!(2025 - 03 - 05), "Payment to Swiggy")
                .account(Some(account)),
            &conn,
        )
        .unwrap();

        assert!(
            statement_entry_exists(account, date!(2025 - 03 - 05), "Payment to Swiggy", 450.0, &conn)
                .unwrap()
        );
        // One paisa difference is a new transaction, not a duplicate.
        assert!(
            !statement_entry_exists(account, date!(2025 - 03 - 05), "Payment to Swiggy", 450.01, &conn)
                .unwrap()
        );
        assert!(
            !statement_entry_exists(account, date!(2025 - 03 - 06), "Payment to Swiggy", 450.0, &conn)
                .unwrap()
        );
    }

    #[test]
    fn delete_user_transactions_only_touches_that_user() {
        let (conn, user_id) = get_test_connection();
        let other_user = create_user(
            "other@test.com",
            PasswordHash::new_unchecked("hunter3"),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(user_id, 100.0, date!(2025 - 03 - 05), "Payment to Zomato"),
            &conn,
        )
        .unwrap();
        let theirs = create_transaction(
            Transaction::build(other_user.id, 200.0, date!(2025 - 03 - 05), "Payment to Uber"),
            &conn,
        )
        .unwrap();

        let deleted = delete_user_transactions(user_id, &conn).unwrap();

        assert_eq!(deleted, 1);
        let remaining = get_transactions_for_month(
            &TransactionScope::Combined(other_user.id),
            CalendarMonth::new(2025, Month::March),
            &conn,
        )
        .unwrap();
        assert_eq!(remaining, vec![theirs]);
    }

    #[test]
    fn delete_account_transactions_leaves_other_accounts() {
        let (conn, user_id) = get_test_connection();
        let keep = create_linked_account(user_id, "HDFC Bank", "Salary", &conn).unwrap();
        let remove = create_linked_account(user_id, "ICICI Bank", "Spending", &conn).unwrap();
        let kept = create_transaction(
            Transaction::build(user_id, 100.0, date!(2025 - 03 - 05), "Payment to Zomato")
                .account(Some(AccountRef::Linked(keep.id))),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(user_id, 200.0, date!(2025 - 03 - 06), "Payment to Uber")
                .account(Some(AccountRef::Linked(remove.id))),
            &conn,
        )
        .unwrap();

        let deleted = delete_account_transactions(AccountRef::Linked(remove.id), &conn).unwrap();

        assert_eq!(deleted, 1);
        let remaining = get_transactions_for_month(
            &TransactionScope::Combined(user_id),
            CalendarMonth::new(2025, Month::March),
            &conn,
        )
        .unwrap();
        assert_eq!(remaining, vec![kept]);
    }
}
