//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    account::AccountRef,
    category::CategoryId,
    user::UserId,
};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Whether money left or entered the account.
///
/// The mock bank feed only produces debits, but manually recorded income is
/// stored as a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money spent.
    #[default]
    Debit,
    /// Money received.
    Credit,
}

impl TransactionKind {
    fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Debit => "debit",
            TransactionKind::Credit => "credit",
        }
    }

    fn from_sql_text(raw: &str) -> Self {
        match raw {
            "credit" => TransactionKind::Credit,
            _ => TransactionKind::Debit,
        }
    }
}

// ============================================================================
// MODELS
// ============================================================================

/// An event where money was spent or received.
///
/// A transaction is immutable once synced, except for its category
/// assignment. To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserId,
    /// The account the transaction belongs to, if any. Transactions from
    /// before account linking carry no reference.
    pub account: Option<AccountRef>,
    /// When the transaction happened. Calendar day only, no time of day.
    pub date: Date,
    /// A text description of what the transaction was for, typically the
    /// bank feed's merchant line.
    pub description: String,
    /// The absolute amount of money moved. Never negative; the direction is
    /// recorded in `kind`.
    pub amount: f64,
    /// The ID of the category the transaction belongs to, or `None` while
    /// the transaction is uncategorized.
    pub category_id: Option<CategoryId>,
    /// Whether the amount was spent or received.
    pub kind: TransactionKind,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        user_id: UserId,
        amount: f64,
        date: Date,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            amount,
            date,
            description: description.to_owned(),
            account: None,
            category_id: None,
            kind: TransactionKind::default(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Optional fields default to an unscoped, uncategorized debit. Pass the
/// finished builder to [create_transaction] to persist it.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The user that will own the transaction.
    pub user_id: UserId,
    /// The absolute amount of money moved.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// A human-readable description, e.g. "Payment to Zomato".
    pub description: String,
    /// The account the transaction belongs to, if any.
    pub account: Option<AccountRef>,
    /// The category of the transaction, if already known.
    pub category_id: Option<CategoryId>,
    /// Whether the amount was spent or received.
    pub kind: TransactionKind,
}

impl TransactionBuilder {
    /// Set the account the transaction belongs to.
    pub fn account(mut self, account: Option<AccountRef>) -> Self {
        self.account = account;
        self
    }

    /// Set the category for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the debit/credit kind for the transaction.
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] if the builder's amount is negative,
/// - [Error::InvalidCategory] if the category ID does not refer to a stored category,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if builder.amount < 0.0 {
        return Err(Error::NegativeAmount(builder.amount));
    }

    let (bank_account_id, linked_account_id) = split_account_ref(builder.account);

    connection
        .execute(
            "INSERT INTO \"transaction\"
             (user_id, bank_account_id, linked_account_id, date, description, amount, category_id, kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (
                builder.user_id.as_i64(),
                bank_account_id,
                linked_account_id,
                builder.date,
                &builder.description,
                builder.amount,
                builder.category_id,
                builder.kind.as_str(),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(builder.category_id),
            error => error.into(),
        })?;

    Ok(Transaction {
        id: connection.last_insert_rowid(),
        user_id: builder.user_id,
        account: builder.account,
        date: builder.date,
        description: builder.description,
        amount: builder.amount,
        category_id: builder.category_id,
        kind: builder.kind,
    })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, bank_account_id, linked_account_id, date, description, amount, category_id, kind
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| error.into())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Set the transaction's category only if it is currently unset.
///
/// Returns whether the update was applied. A `false` return means another
/// writer assigned a category first, preserving sticky assignment.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if `category_id` does not refer to a stored category,
/// - [Error::SqlError] if there is some other SQL error.
pub fn assign_category_if_unset(
    id: TransactionId,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<bool, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\" SET category_id = ?2 WHERE id = ?1 AND category_id IS NULL",
            (id, category_id),
        )
        .map_err(|error| map_category_constraint_error(error, Some(category_id)))?;

    Ok(rows_affected > 0)
}

/// Set or clear the transaction's category, overwriting any existing value.
///
/// Used by the manual categorization endpoint; the automatic path goes
/// through [assign_category_if_unset].
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a stored transaction,
/// - [Error::InvalidCategory] if `category_id` does not refer to a stored category,
/// - [Error::SqlError] if there is some other SQL error.
pub fn set_transaction_category(
    id: TransactionId,
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\" SET category_id = ?2 WHERE id = ?1",
            (id, category_id),
        )
        .map_err(|error| map_category_constraint_error(error, category_id))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_category_constraint_error(
    error: rusqlite::Error,
    category_id: Option<CategoryId>,
) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidCategory(category_id),
        error => error.into(),
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                bank_account_id INTEGER,
                linked_account_id INTEGER,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                category_id INTEGER,
                kind TEXT NOT NULL DEFAULT 'debit',
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(bank_account_id) REFERENCES bank_account(id) ON UPDATE CASCADE ON DELETE SET NULL,
                FOREIGN KEY(linked_account_id) REFERENCES linked_account(id) ON UPDATE CASCADE ON DELETE SET NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Composite indexes used by the dashboard and transactions pages.
    connection.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
         CREATE INDEX IF NOT EXISTS idx_transaction_bank_account ON \"transaction\"(bank_account_id);
         CREATE INDEX IF NOT EXISTS idx_transaction_linked_account ON \"transaction\"(linked_account_id);",
    )?;

    Ok(())
}

fn split_account_ref(account: Option<AccountRef>) -> (Option<i64>, Option<i64>) {
    match account {
        Some(AccountRef::Legacy(id)) => (Some(id), None),
        Some(AccountRef::Linked(id)) => (None, Some(id)),
        None => (None, None),
    }
}

/// Map a database row to a Transaction.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let bank_account_id: Option<i64> = row.get(2)?;
    let linked_account_id: Option<i64> = row.get(3)?;

    let account = match (bank_account_id, linked_account_id) {
        (Some(id), None) => Some(AccountRef::Legacy(id)),
        (None, Some(id)) => Some(AccountRef::Linked(id)),
        // Both set should be impossible; treat it like the older of the two
        // schemes so the row still renders.
        (Some(id), Some(_)) => Some(AccountRef::Legacy(id)),
        (None, None) => None,
    };

    let kind: String = row.get(8)?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        account,
        date: row.get(4)?,
        description: row.get(5)?,
        amount: row.get(6)?,
        category_id: row.get(7)?,
        kind: TransactionKind::from_sql_text(&kind),
    })
}

// ============================================================================
// TESTS
// ============================================================================
