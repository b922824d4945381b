//! Defines the two historical bank account variants and their database queries.
//!
//! The app has gone through two generations of bank account schema: the
//! original `bank_account` table ("legacy") and the newer `linked_account`
//! table created when multi-account support landed. Both variants behave the
//! same for aggregation purposes and are unified by [AccountRef].

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, user::UserId};

/// Database identifier for either account variant.
pub type AccountId = i64;

/// A reference to the bank account a transaction belongs to.
///
/// Exactly one variant applies; transactions that predate account linking
/// carry no reference at all (`Option<AccountRef>::None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum AccountRef {
    /// A row in the legacy `bank_account` table.
    Legacy(AccountId),
    /// A row in the `linked_account` table.
    Linked(AccountId),
}

/// A legacy bank account.
#[derive(Debug, Clone, PartialEq)]
pub struct BankAccount {
    /// The id for the account.
    pub id: AccountId,
    /// The user that owns the account.
    pub user_id: UserId,
    /// The display name of the account.
    pub name: String,
    /// Whether the account is included when syncing.
    pub is_active: bool,
    /// When the account last had transactions synced, if ever.
    pub last_synced: Option<OffsetDateTime>,
    /// When the account was created.
    pub created_at: OffsetDateTime,
}

/// A bank account added through the multi-account linking flow.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedAccount {
    /// The id for the account.
    pub id: AccountId,
    /// The user that owns the account.
    pub user_id: UserId,
    /// The name of the bank the account is held with.
    pub bank_name: String,
    /// The user-chosen nickname for the account.
    pub nickname: String,
    /// Whether the account is included when syncing.
    pub is_active: bool,
    /// When the account last had transactions synced, if ever.
    pub last_synced: Option<OffsetDateTime>,
    /// When the account was linked.
    pub created_at: OffsetDateTime,
}

/// Create the legacy bank account table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_bank_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS bank_account (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            last_synced TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
            )",
        (),
    )?;

    Ok(())
}

/// Create the linked account table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_linked_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS linked_account (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            bank_name TEXT NOT NULL,
            nickname TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            last_synced TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
            )",
        (),
    )?;

    Ok(())
}

/// Create a legacy bank account for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyAccountName] if `name` is empty after trimming,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_bank_account(
    user_id: UserId,
    name: &str,
    connection: &Connection,
) -> Result<BankAccount, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyAccountName);
    }

    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO bank_account (user_id, name, is_active, created_at) VALUES (?1, ?2, 1, ?3)",
        (user_id.as_i64(), name, created_at),
    )?;

    Ok(BankAccount {
        id: connection.last_insert_rowid(),
        user_id,
        name: name.to_string(),
        is_active: true,
        last_synced: None,
        created_at,
    })
}

/// Link a new account for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyAccountName] if the bank name or nickname is empty after trimming,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_linked_account(
    user_id: UserId,
    bank_name: &str,
    nickname: &str,
    connection: &Connection,
) -> Result<LinkedAccount, Error> {
    let bank_name = bank_name.trim();
    let nickname = nickname.trim();

    if bank_name.is_empty() || nickname.is_empty() {
        return Err(Error::EmptyAccountName);
    }

    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO linked_account (user_id, bank_name, nickname, is_active, created_at)
         VALUES (?1, ?2, ?3, 1, ?4)",
        (user_id.as_i64(), bank_name, nickname, created_at),
    )?;

    Ok(LinkedAccount {
        id: connection.last_insert_rowid(),
        user_id,
        bank_name: bank_name.to_string(),
        nickname: nickname.to_string(),
        is_active: true,
        last_synced: None,
        created_at,
    })
}

/// Retrieve a legacy account by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a stored account,
/// - [Error::SqlError] if there is some other SQL error.
pub fn get_bank_account(id: AccountId, connection: &Connection) -> Result<BankAccount, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, is_active, last_synced, created_at
             FROM bank_account WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_bank_account_row)
        .map_err(|error| error.into())
}

/// Retrieve a linked account by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a stored account,
/// - [Error::SqlError] if there is some other SQL error.
pub fn get_linked_account(id: AccountId, connection: &Connection) -> Result<LinkedAccount, Error> {
    connection
        .prepare(
            "SELECT id, user_id, bank_name, nickname, is_active, last_synced, created_at
             FROM linked_account WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_linked_account_row)
        .map_err(|error| error.into())
}

/// Retrieve the legacy accounts owned by `user_id`, oldest first.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an SQL error.
pub fn get_bank_accounts(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<BankAccount>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, is_active, last_synced, created_at
             FROM bank_account WHERE user_id = :user_id ORDER BY created_at ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_bank_account_row)?
        .map(|maybe_account| maybe_account.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the linked accounts owned by `user_id`, oldest first.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an SQL error.
pub fn get_linked_accounts(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<LinkedAccount>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, bank_name, nickname, is_active, last_synced, created_at
             FROM linked_account WHERE user_id = :user_id ORDER BY created_at ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_linked_account_row)?
        .map(|maybe_account| maybe_account.map_err(|error| error.into()))
        .collect()
}

/// Rename a legacy account. Returns an error if the account doesn't exist.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyAccountName] if `new_name` is empty after trimming,
/// - [Error::UpdateMissingAccount] if `id` does not refer to a stored account,
/// - [Error::SqlError] if there is some other SQL error.
pub fn rename_bank_account(
    id: AccountId,
    new_name: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let new_name = new_name.trim();

    if new_name.is_empty() {
        return Err(Error::EmptyAccountName);
    }

    let rows_affected = connection.execute(
        "UPDATE bank_account SET name = ?1 WHERE id = ?2",
        (new_name, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    Ok(())
}

/// Flip a legacy account's active flag and return the new value.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingAccount] if `id` does not refer to a stored account,
/// - [Error::SqlError] if there is some other SQL error.
pub fn toggle_bank_account_active(id: AccountId, connection: &Connection) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "UPDATE bank_account SET is_active = NOT is_active WHERE id = ?1",
        (id,),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    connection
        .query_row(
            "SELECT is_active FROM bank_account WHERE id = ?1",
            (id,),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Record that a linked account was synced at `synced_at`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingAccount] if `id` does not refer to a stored account,
/// - [Error::SqlError] if there is some other SQL error.
pub fn touch_linked_account_sync(
    id: AccountId,
    synced_at: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE linked_account SET last_synced = ?1 WHERE id = ?2",
        (synced_at, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    Ok(())
}

/// Delete a linked account. The caller is responsible for deleting the
/// account's transactions in the same SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingAccount] if `id` does not refer to a stored account,
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_linked_account(id: AccountId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM linked_account WHERE id = ?1", (id,))?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingAccount);
    }

    Ok(())
}

fn map_bank_account_row(row: &Row) -> Result<BankAccount, rusqlite::Error> {
    Ok(BankAccount {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        name: row.get(2)?,
        is_active: row.get(3)?,
        last_synced: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn map_linked_account_row(row: &Row) -> Result<LinkedAccount, rusqlite::Error> {
    Ok(LinkedAccount {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        bank_name: row.get(2)?,
        nickname: row.get(3)?,
        is_active: row.get(4)?,
        last_synced: row.get(5)?,
        created_at: row.get(6)?,
    })
}
