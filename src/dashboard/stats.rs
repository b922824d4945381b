//! Monthly spending aggregation for the dashboard and chart API.
//!
//! All functions aggregate over one transaction scope and one calendar month
//! (calendar year+month extraction, not a rolling window). Callers at the
//! HTTP boundary degrade any error to an empty result so the dashboard never
//! crashes on a store fault.

use rusqlite::{Connection, OptionalExtension};

use crate::{Error, account::TransactionScope, month::CalendarMonth};

/// The label used for the bucket of transactions without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The placeholder shown when no categorized spending exists for the month.
pub const NO_TOP_CATEGORY_LABEL: &str = "N/A";

/// Headline figures for one scope and month.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlySummary {
    /// The sum of all matching transaction amounts. Zero when the month is
    /// empty, never null.
    pub total_spending: f64,
    /// The number of matching transactions.
    pub transaction_count: u32,
    /// The category with the largest summed amount among categorized
    /// transactions, or `None` when there are none. Ties break
    /// alphabetically (the smallest name wins).
    pub top_category: Option<String>,
}

impl MonthlySummary {
    /// The top category name, or "N/A" when the month has no categorized
    /// spending.
    pub fn top_category_label(&self) -> &str {
        self.top_category.as_deref().unwrap_or(NO_TOP_CATEGORY_LABEL)
    }
}

/// One entry of the category breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownEntry {
    /// The category name, or [UNCATEGORIZED_LABEL] for the trailing bucket.
    pub name: String,
    /// The summed amount for the category.
    pub amount: f64,
}

/// Compute the headline figures for `scope` and `month`.
///
/// # Errors
/// Returns a [Error::SqlError] if a query fails. Callers rendering the
/// dashboard should fall back to [MonthlySummary::default] instead of
/// propagating.
pub fn monthly_summary(
    scope: &TransactionScope,
    month: CalendarMonth,
    connection: &Connection,
) -> Result<MonthlySummary, Error> {
    let (column, owner_id) = scope.sql_filter();
    let month = month.to_string();

    let totals_query = format!(
        "SELECT COALESCE(SUM(amount), 0), COUNT(id)
         FROM \"transaction\"
         WHERE {column} = :owner AND strftime('%Y-%m', date) = :month"
    );
    let (total_spending, transaction_count) = connection.prepare(&totals_query)?.query_row(
        &[
            (":owner", &owner_id as &dyn rusqlite::ToSql),
            (":month", &month),
        ],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let top_category_query = format!(
        "SELECT c.name, SUM(t.amount) AS total
         FROM \"transaction\" t
         INNER JOIN category c ON t.category_id = c.id
         WHERE t.{column} = :owner AND strftime('%Y-%m', t.date) = :month
         GROUP BY c.name
         ORDER BY total DESC, c.name ASC
         LIMIT 1"
    );
    let top_category = connection
        .prepare(&top_category_query)?
        .query_row(
            &[
                (":owner", &owner_id as &dyn rusqlite::ToSql),
                (":month", &month),
            ],
            |row| row.get(0),
        )
        .optional()?;

    Ok(MonthlySummary {
        total_spending,
        transaction_count,
        top_category,
    })
}

/// Compute the category breakdown for `scope` and `month`.
///
/// Categorized spending is grouped by name and sorted by name ascending. If
/// any uncategorized spending exists, it is appended as the last entry under
/// [UNCATEGORIZED_LABEL], never merged into the sorted portion.
///
/// # Errors
/// Returns a [Error::SqlError] if a query fails. The chart endpoint degrades
/// to an empty breakdown instead of propagating.
pub fn spending_by_category(
    scope: &TransactionScope,
    month: CalendarMonth,
    connection: &Connection,
) -> Result<Vec<BreakdownEntry>, Error> {
    let (column, owner_id) = scope.sql_filter();
    let month = month.to_string();

    let breakdown_query = format!(
        "SELECT c.name, SUM(t.amount) AS total
         FROM \"transaction\" t
         INNER JOIN category c ON t.category_id = c.id
         WHERE t.{column} = :owner AND strftime('%Y-%m', t.date) = :month
         GROUP BY c.name
         ORDER BY c.name ASC"
    );
    let mut entries = connection
        .prepare(&breakdown_query)?
        .query_map(
            &[
                (":owner", &owner_id as &dyn rusqlite::ToSql),
                (":month", &month),
            ],
            |row| {
                Ok(BreakdownEntry {
                    name: row.get(0)?,
                    amount: row.get(1)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let uncategorized_query = format!(
        "SELECT COALESCE(SUM(amount), 0)
         FROM \"transaction\"
         WHERE {column} = :owner AND strftime('%Y-%m', date) = :month
           AND category_id IS NULL"
    );
    let uncategorized: f64 = connection.prepare(&uncategorized_query)?.query_row(
        &[
            (":owner", &owner_id as &dyn rusqlite::ToSql),
            (":month", &month),
        ],
        |row| row.get(0),
    )?;

    if uncategorized > 0.0 {
        entries.push(BreakdownEntry {
            name: UNCATEGORIZED_LABEL.to_string(),
            amount: uncategorized,
        });
    }

    Ok(entries)
}
