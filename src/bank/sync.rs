//! Ingesting statement entries into the transaction table.

use rusqlite::Connection;

use crate::{
    Error,
    account::AccountRef,
    bank::statement::StatementEntry,
    category::{CategoryLookup, KeywordTable, categorize_transaction},
    transaction::{Transaction, create_transaction, statement_entry_exists},
    user::UserId,
};

/// Insert the statement entries that are not already stored for `account`,
/// auto-categorizing each new transaction. Returns how many transactions
/// were inserted.
///
/// A candidate is a duplicate of an existing transaction only when the
/// account, date, description, and amount all match exactly.
///
/// **Note**: callers wanting all-or-nothing behaviour should run this inside
/// an SQL transaction.
///
/// # Errors
/// Returns a [Error::SqlError] if an insert or query fails.
pub fn ingest_statement(
    user_id: UserId,
    account: AccountRef,
    entries: &[StatementEntry],
    keywords: KeywordTable,
    lookup: &CategoryLookup,
    connection: &Connection,
) -> Result<usize, Error> {
    let mut inserted = 0;

    for entry in entries {
        if statement_entry_exists(account, entry.date, &entry.description, entry.amount, connection)?
        {
            continue;
        }

        let transaction = create_transaction(
            Transaction::build(user_id, entry.amount.abs(), entry.date, &entry.description)
                .account(Some(account)),
            connection,
        )?;

        categorize_transaction(&transaction, keywords, lookup, connection)?;
        inserted += 1;
    }

    Ok(inserted)
}

#[cfg(test)]
mod ingest_statement_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        PasswordHash,
        account::{AccountRef, TransactionScope, create_linked_account},
        bank::statement::StatementEntry,
        category::{CATEGORY_KEYWORDS, CategoryLookup},
        db::initialize,
        month::CalendarMonth,
        transaction::{count_transactions, get_transactions_for_month},
        user::{UserId, create_user},
    };

    use super::ingest_statement;

    fn get_test_connection() -> (Connection, UserId, AccountRef) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user("test@test.com", PasswordHash::new_unchecked("hunter2"), &conn)
            .expect("Could not create test user");
        let account = create_linked_account(user.id, "HDFC Bank", "Salary", &conn)
            .expect("Could not create test account");

        (conn, user.id, AccountRef::Linked(account.id))
    }

    fn swiggy_entry() -> StatementEntry {
        StatementEntry {
            date: date!(2025 - 03 - 05),
            description: "Payment to Swiggy".to_string(),
            amount: 450.0,
        }
    }

    #[test]
    fn inserts_and_categorizes_new_entries() {
        let (conn, user_id, account) = get_test_connection();
        let lookup = CategoryLookup::load(&conn).unwrap();

        let inserted = ingest_statement(
            user_id,
            account,
            &[swiggy_entry()],
            CATEGORY_KEYWORDS,
            &lookup,
            &conn,
        )
        .unwrap();

        assert_eq!(inserted, 1);

        let transactions = get_transactions_for_month(
            &TransactionScope::Combined(user_id),
            CalendarMonth::from_date(date!(2025 - 03 - 05)),
            &conn,
        )
        .unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].account, Some(account));
        assert_eq!(
            transactions[0].category_id,
            lookup.get("Food & Drink"),
            "swiggy payment should be categorized as Food & Drink"
        );
    }

    #[test]
    fn ingesting_the_same_entry_twice_stores_one_transaction() {
        let (conn, user_id, account) = get_test_connection();
        let lookup = CategoryLookup::load(&conn).unwrap();
        let entries = [swiggy_entry()];

        let first = ingest_statement(
            user_id,
            account,
            &entries,
            CATEGORY_KEYWORDS,
            &lookup,
            &conn,
        )
        .unwrap();
        let second = ingest_statement(
            user_id,
            account,
            &entries,
            CATEGORY_KEYWORDS,
            &lookup,
            &conn,
        )
        .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 0);
        assert_eq!(count_transactions(&conn).unwrap(), 1);
    }

    #[test]
    fn different_amount_is_not_a_duplicate() {
        let (conn, user_id, account) = get_test_connection();
        let lookup = CategoryLookup::load(&conn).unwrap();

        let mut changed = swiggy_entry();
        changed.amount += 0.01;

        ingest_statement(
            user_id,
            account,
            &[swiggy_entry()],
            CATEGORY_KEYWORDS,
            &lookup,
            &conn,
        )
        .unwrap();
        let inserted = ingest_statement(
            user_id,
            account,
            &[changed],
            CATEGORY_KEYWORDS,
            &lookup,
            &conn,
        )
        .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(count_transactions(&conn).unwrap(), 2);
    }

    #[test]
    fn same_entry_on_another_account_is_not_a_duplicate() {
        let (conn, user_id, account) = get_test_connection();
        let lookup = CategoryLookup::load(&conn).unwrap();
        let other = create_linked_account(user_id, "ICICI Bank", "Spending", &conn).unwrap();

        ingest_statement(
            user_id,
            account,
            &[swiggy_entry()],
            CATEGORY_KEYWORDS,
            &lookup,
            &conn,
        )
        .unwrap();
        let inserted = ingest_statement(
            user_id,
            AccountRef::Linked(other.id),
            &[swiggy_entry()],
            CATEGORY_KEYWORDS,
            &lookup,
            &conn,
        )
        .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(count_transactions(&conn).unwrap(), 2);
    }
}
