//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's email address, unique across all users.
    pub email: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// When the user registered.
    pub created_at: OffsetDateTime,
}

/// Check that `email` looks like an email address.
///
/// This is deliberately loose: the address is only ever used as a log-in
/// handle, so anything non-empty with an '@' somewhere in the middle passes.
///
/// # Errors
///
/// Returns an [Error::InvalidEmail] describing the rejected input.
pub fn validate_email(email: &str) -> Result<&str, Error> {
    let email = email.trim();

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(Error::InvalidEmail(email.to_string())),
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// This function will return a:
/// - [Error::InvalidEmail] if `email` is not a valid email address,
/// - [Error::DuplicateEmail] if `email` already belongs to a registered user,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_user(
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let email = validate_email(email)?;
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO user (email, password, created_at) VALUES (?1, ?2, ?3)",
        (email, password_hash.as_ref(), created_at),
    )?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        email: email.to_string(),
        password_hash,
        created_at,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if `user_id` does not belong to a registered user,
/// - [Error::SqlError] if there was an error trying to access the database.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password, created_at FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an email equal to `email`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if `email` does not belong to a registered user,
/// - [Error::SqlError] if there was an error trying to access the database.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, password, created_at FROM user WHERE email = :email")?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| {
            row.get::<_, i64>(0).map(|count| count as usize)
        })
        .map_err(|error| error.into())
}

fn map_user_row(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let email = row.get(1)?;
    let raw_password_hash: String = row.get(2)?;
    let created_at = row.get(3)?;

    Ok(User {
        id: UserId::new(raw_id),
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at,
    })
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        user::{UserId, count_users, create_user, get_user_by_email, get_user_by_id},
    };

    use super::{create_user_table, validate_email};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    #[test]
    fn validate_email_accepts_addresses() {
        assert_eq!(validate_email("foo@bar.baz"), Ok("foo@bar.baz"));
        assert_eq!(validate_email("  foo@bar.baz "), Ok("foo@bar.baz"));
    }

    #[test]
    fn validate_email_rejects_garbage() {
        assert!(matches!(validate_email(""), Err(Error::InvalidEmail(_))));
        assert!(matches!(
            validate_email("no-at-sign"),
            Err(Error::InvalidEmail(_))
        ));
        assert!(matches!(validate_email("@"), Err(Error::InvalidEmail(_))));
        assert!(matches!(
            validate_email("foo@"),
            Err(Error::InvalidEmail(_))
        ));
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user =
            create_user("foo@bar.baz", password_hash.clone(), &db_connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email, "foo@bar.baz");
        assert_eq!(inserted_user.password_hash, password_hash);
    }

    #[test]
    fn insert_user_fails_on_duplicate_email() {
        let db_connection = get_db_connection();
        create_user(
            "foo@bar.baz",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let duplicate = create_user(
            "foo@bar.baz",
            PasswordHash::new_unchecked("hunter3"),
            &db_connection,
        );

        assert_eq!(duplicate, Err(Error::DuplicateEmail));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserId::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_by_email_succeeds_with_existing_user() {
        let db_connection = get_db_connection();
        let test_user = create_user(
            "foo@bar.baz",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let retrieved_user = get_user_by_email("foo@bar.baz", &db_connection).unwrap();

        assert_eq!(retrieved_user, test_user);
    }

    #[test]
    fn get_user_by_email_fails_with_unknown_email() {
        let db_connection = get_db_connection();

        let result = get_user_by_email("who@dis.com", &db_connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn returns_correct_count() {
        let db_connection = get_db_connection();

        let count = count_users(&db_connection).expect("Could not get user count");
        assert_eq!(0, count, "Want zero users before insertion, got {count}");

        create_user(
            "foo@bar.baz",
            PasswordHash::new_unchecked("hunter2"),
            &db_connection,
        )
        .unwrap();

        let count = count_users(&db_connection).expect("Could not get user count");
        assert_eq!(1, count, "Want one user after insertion, got {count}");
    }
}
