//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/accounts/{account_id}/rename',
//! use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for managing bank accounts.
pub const ACCOUNTS_VIEW: &str = "/accounts";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to link a new bank account.
pub const LINK_ACCOUNT: &str = "/api/bank/link";
/// The route to sync transactions for a linked account.
pub const SYNC_ACCOUNT: &str = "/api/bank/sync";
/// The route to rename a legacy bank account.
pub const RENAME_ACCOUNT: &str = "/api/accounts/{account_id}/rename";
/// The route to toggle a legacy bank account's active flag.
pub const TOGGLE_ACCOUNT: &str = "/api/accounts/{account_id}/toggle";
/// The route to delete a linked account and its transactions.
pub const DELETE_LINKED_ACCOUNT: &str = "/api/linked-accounts/{account_id}";
/// The route to manually set or clear a transaction's category.
pub const SET_TRANSACTION_CATEGORY: &str = "/api/transactions/{transaction_id}/category";
/// The route serving chart data as JSON.
pub const SPENDING_BY_CATEGORY: &str = "/api/spending-by-category";
/// The route to generate demo transactions for every account.
pub const DEMO_DATA: &str = "/api/demo/generate-data";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/accounts/{account_id}/rename',
/// '{account_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
