//! The category model, its table, and the queries used by the categorizer
//! and the manual-categorization endpoint.

use std::collections::HashMap;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, category::keywords::CATEGORY_KEYWORDS};

/// Database identifier for a category.
pub type CategoryId = i64;

/// A fixed, named spending bucket, e.g. "Groceries" or "Rent/EMI".
///
/// Categories are created once at startup from the static keyword table and
/// are read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The unique display name of the category.
    pub name: String,
}

/// Extra categories seeded alongside the keyword table's categories.
///
/// These have no keywords, so they are only ever assigned manually.
const MANUAL_CATEGORIES: &[&str] = &["Uncategorized", "Other", "Income"];

/// Create the category table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        CREATE INDEX IF NOT EXISTS idx_category_name ON category(name);",
    )?;

    Ok(())
}

/// Insert the default categories if they are not already in the database.
///
/// Safe to call on every startup.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an SQL error.
pub fn seed_categories(connection: &Connection) -> Result<(), Error> {
    let mut statement = connection.prepare("INSERT OR IGNORE INTO category (name) VALUES (?1)")?;

    for (name, _) in CATEGORY_KEYWORDS {
        statement.execute((name,))?;
    }

    for name in MANUAL_CATEGORIES {
        statement.execute((name,))?;
    }

    Ok(())
}

/// Retrieve all categories ordered alphabetically by name.
///
/// # Errors
/// Returns a [Error::SqlError] if there is an SQL error.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name FROM category ORDER BY name ASC;")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single category by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `category_id` does not refer to a stored category,
/// - [Error::SqlError] if there is some other SQL error.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_category_row)
        .map_err(|error| error.into())
}

/// A read-only mapping from category name to its database ID.
///
/// Loaded once per categorization pass so the keyword loop does not query
/// the database for every keyword hit.
#[derive(Debug, Clone, Default)]
pub struct CategoryLookup(HashMap<String, CategoryId>);

impl CategoryLookup {
    /// Load the name-to-ID mapping for all stored categories.
    ///
    /// # Errors
    /// Returns a [Error::SqlError] if there is an SQL error.
    pub fn load(connection: &Connection) -> Result<Self, Error> {
        let entries = connection
            .prepare("SELECT name, id FROM category;")?
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<HashMap<String, CategoryId>, _>>()?;

        Ok(Self(entries))
    }

    /// Build a lookup from name and ID pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, CategoryId)>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Get the ID for a category name, or `None` if the name is not stored.
    pub fn get(&self, name: &str) -> Option<CategoryId> {
        self.0.get(name).copied()
    }
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
