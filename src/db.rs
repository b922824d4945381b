//! Database initialization: creates the application tables and seeds the
//! static category list.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    account::{create_bank_account_table, create_linked_account_table},
    category::{create_category_table, seed_categories},
    transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the application tables and seed the default categories.
///
/// Safe to call on every startup: tables are created with `IF NOT EXISTS`
/// and category seeding is idempotent. Everything runs in one exclusive SQL
/// transaction so a failure leaves the database untouched.
///
/// # Errors
/// Returns a [Error::SqlError] if a table cannot be created or the seed
/// data cannot be inserted.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_bank_account_table(&transaction)?;
    create_linked_account_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    seed_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use crate::category::get_all_categories;

    use super::initialize;

    #[test]
    fn initialize_creates_tables_and_seeds_categories() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let categories = get_all_categories(&connection).expect("Could not get categories");
        assert!(!categories.is_empty());
    }

    #[test]
    fn initialize_twice_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");
        let first = get_all_categories(&connection).unwrap();

        initialize(&connection).expect("Could not initialize database twice");
        let second = get_all_categories(&connection).unwrap();

        assert_eq!(first, second);
    }
}
