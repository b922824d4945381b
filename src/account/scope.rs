//! Resolves the account selector and month query parameters into a
//! transaction scope.
//!
//! The selector grammar is shared by the dashboard, the transactions page,
//! and the chart API: `all` for every account the user owns, a bare account
//! ID for a legacy account, and `linked_<id>` for a linked account. Bad
//! input never fails: unparseable selectors, unknown accounts, and accounts
//! owned by other users all silently fall back to the combined scope so a
//! stale or hand-edited URL still renders a page.

use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    account::core::{AccountId, get_bank_account, get_linked_account},
    month::CalendarMonth,
    transaction::get_scope_months,
    user::UserId,
};

/// The selector value for the combined scope.
pub const COMBINED_SELECTOR: &str = "all";

/// The selector prefix marking a linked account, e.g. `linked_7`.
const LINKED_SELECTOR_PREFIX: &str = "linked_";

/// The raw `account` and `month` query parameters shared by the dashboard,
/// the transactions page, and the chart API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeQuery {
    /// The raw account selector, e.g. "all", "3", or "linked_7".
    pub account: Option<String>,
    /// The raw month, e.g. "2025-03".
    pub month: Option<String>,
}

/// The parsed form of the `account` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSelection {
    /// Every account the user owns.
    All,
    /// A single legacy account.
    Legacy(AccountId),
    /// A single linked account.
    Linked(AccountId),
}

/// Parse the raw `account` query parameter.
///
/// Anything that is not `all`, an integer, or `linked_` followed by an
/// integer parses as [AccountSelection::All].
pub fn parse_account_selector(raw: &str) -> AccountSelection {
    if raw == COMBINED_SELECTOR {
        return AccountSelection::All;
    }

    if let Some(raw_id) = raw.strip_prefix(LINKED_SELECTOR_PREFIX) {
        return match raw_id.parse() {
            Ok(id) => AccountSelection::Linked(id),
            Err(_) => AccountSelection::All,
        };
    }

    match raw.parse() {
        Ok(id) => AccountSelection::Legacy(id),
        Err(_) => AccountSelection::All,
    }
}

/// The set of transactions a query should cover.
///
/// Unlike [AccountSelection] this is ownership-checked: an individual scope
/// is only ever produced for an account the requesting user owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionScope {
    /// All transactions belonging to the user, across every account.
    Combined(UserId),
    /// Transactions of one legacy account.
    Legacy(AccountId),
    /// Transactions of one linked account.
    Linked(AccountId),
}

impl TransactionScope {
    /// The transaction table column and ID that select this scope's rows.
    pub(crate) fn sql_filter(&self) -> (&'static str, i64) {
        match self {
            TransactionScope::Combined(user_id) => ("user_id", user_id.as_i64()),
            TransactionScope::Legacy(account_id) => ("bank_account_id", *account_id),
            TransactionScope::Linked(account_id) => ("linked_account_id", *account_id),
        }
    }

    /// The selector string that round-trips back to this scope, for links
    /// and form values.
    pub fn selector_string(&self) -> String {
        match self {
            TransactionScope::Combined(_) => COMBINED_SELECTOR.to_string(),
            TransactionScope::Legacy(account_id) => account_id.to_string(),
            TransactionScope::Linked(account_id) => format!("{LINKED_SELECTOR_PREFIX}{account_id}"),
        }
    }
}

/// The outcome of resolving the account and month query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedScope {
    /// The ownership-checked transaction scope.
    pub scope: TransactionScope,
    /// The month queries should cover.
    pub month: CalendarMonth,
    /// Every month the scope has transactions in, most recent first. Always
    /// contains `month`, so the month selector can render the current
    /// selection even when it has no transactions.
    pub available_months: Vec<CalendarMonth>,
}

/// Resolve the `account` and `month` query parameters for `user_id`.
///
/// A selector naming an account that does not exist or belongs to another
/// user degrades to the combined scope; explicit authorization errors are
/// reserved for the mutation endpoints. A missing or unparseable month
/// degrades to the month containing `today`.
///
/// # Errors
/// Returns a [Error::SqlError] if a database query fails. Input-shape
/// problems never produce an error.
pub fn resolve_scope(
    user_id: UserId,
    account_param: Option<&str>,
    month_param: Option<&str>,
    today: Date,
    connection: &Connection,
) -> Result<ResolvedScope, Error> {
    let selection = parse_account_selector(account_param.unwrap_or(COMBINED_SELECTOR));

    let scope = match selection {
        AccountSelection::All => TransactionScope::Combined(user_id),
        AccountSelection::Legacy(account_id) => match get_bank_account(account_id, connection) {
            Ok(account) if account.user_id == user_id => TransactionScope::Legacy(account_id),
            Ok(_) | Err(Error::NotFound) => TransactionScope::Combined(user_id),
            Err(error) => return Err(error),
        },
        AccountSelection::Linked(account_id) => match get_linked_account(account_id, connection) {
            Ok(account) if account.user_id == user_id => TransactionScope::Linked(account_id),
            Ok(_) | Err(Error::NotFound) => TransactionScope::Combined(user_id),
            Err(error) => return Err(error),
        },
    };

    let month = month_param
        .and_then(CalendarMonth::parse)
        .unwrap_or_else(|| CalendarMonth::from_date(today));

    let mut available_months = get_scope_months(&scope, connection)?;

    if available_months.is_empty() {
        available_months.push(month);
    } else if !available_months.contains(&month) {
        available_months.push(month);
        available_months.sort_unstable_by(|left, right| right.cmp(left));
    }

    Ok(ResolvedScope {
        scope,
        month,
        available_months,
    })
}

#[cfg(test)]
mod parse_account_selector_tests {
    use super::{AccountSelection, parse_account_selector};

    #[test]
    fn parses_all() {
        assert_eq!(parse_account_selector("all"), AccountSelection::All);
    }

    #[test]
    fn parses_bare_integer_as_legacy() {
        assert_eq!(parse_account_selector("42"), AccountSelection::Legacy(42));
    }

    #[test]
    fn parses_linked_prefix() {
        assert_eq!(
            parse_account_selector("linked_7"),
            AccountSelection::Linked(7)
        );
    }

    #[test]
    fn garbage_falls_back_to_all() {
        assert_eq!(parse_account_selector(""), AccountSelection::All);
        assert_eq!(parse_account_selector("savings"), AccountSelection::All);
        assert_eq!(parse_account_selector("linked_"), AccountSelection::All);
        assert_eq!(
            parse_account_selector("linked_seven"),
            AccountSelection::All
        );
        assert_eq!(parse_account_selector("12.5"), AccountSelection::All);
    }
}
