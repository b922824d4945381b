//! Displays the resolved scope's transactions for the selected month.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{
        AccountRef, ResolvedScope, ScopeQuery, TransactionScope, get_bank_accounts,
        get_linked_accounts, resolve_scope,
    },
    category::{Category, get_all_categories},
    endpoints::{self, format_endpoint},
    html::{
        FORM_SELECT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
    timezone::local_date_today,
    transaction::{core::Transaction, query::get_transactions_for_month},
    user::UserId,
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// An option in the account selector.
pub(crate) struct AccountOption {
    selector: String,
    label: String,
}

/// Display the scope's transactions for the selected month.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<ScopeQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let today = local_date_today(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let resolved = resolve_scope(
        user_id,
        query.account.as_deref(),
        query.month.as_deref(),
        today,
        &connection,
    )
    .inspect_err(|error| tracing::error!("could not resolve scope: {error}"))?;

    let transactions = get_transactions_for_month(&resolved.scope, resolved.month, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let account_options = get_account_options(user_id, &connection)?;
    let account_names = get_account_names(user_id, &connection)?;

    Ok(transactions_view(
        &resolved,
        &transactions,
        &categories,
        &account_options,
        &account_names,
    )
    .into_response())
}

pub(crate) fn get_account_options(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<AccountOption>, Error> {
    let mut options = vec![AccountOption {
        selector: TransactionScope::Combined(user_id).selector_string(),
        label: "All accounts".to_string(),
    }];

    for account in get_bank_accounts(user_id, connection)? {
        options.push(AccountOption {
            selector: TransactionScope::Legacy(account.id).selector_string(),
            label: account.name,
        });
    }

    for account in get_linked_accounts(user_id, connection)? {
        options.push(AccountOption {
            selector: TransactionScope::Linked(account.id).selector_string(),
            label: account.nickname,
        });
    }

    Ok(options)
}

fn get_account_names(
    user_id: UserId,
    connection: &Connection,
) -> Result<HashMap<AccountRef, String>, Error> {
    let mut names = HashMap::new();

    for account in get_bank_accounts(user_id, connection)? {
        names.insert(AccountRef::Legacy(account.id), account.name);
    }

    for account in get_linked_accounts(user_id, connection)? {
        names.insert(AccountRef::Linked(account.id), account.nickname);
    }

    Ok(names)
}

fn transactions_view(
    resolved: &ResolvedScope,
    transactions: &[Transaction],
    categories: &[Category],
    account_options: &[AccountOption],
    account_names: &HashMap<AccountRef, String>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    (scope_selector_form(
                        endpoints::TRANSACTIONS_VIEW,
                        resolved,
                        account_options,
                    ))
                }

                section class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction, categories, account_names))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions for " (resolved.month) "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

/// The account and month selector form shared with the dashboard.
pub(crate) fn scope_selector_form(
    action: &str,
    resolved: &ResolvedScope,
    account_options: &[AccountOption],
) -> Markup {
    let selected_account = resolved.scope.selector_string();

    html!(
        form method="get" action=(action) class="flex gap-2" data-autosubmit="true"
        {
            select name="account" class=(FORM_SELECT_STYLE)
            {
                @for option in account_options {
                    option
                        value=(option.selector)
                        selected[option.selector == selected_account]
                    {
                        (option.label)
                    }
                }
            }

            select name="month" class=(FORM_SELECT_STYLE)
            {
                @for month in &resolved.available_months {
                    option value=(month) selected[*month == resolved.month] { (month) }
                }
            }
        }
    )
}

fn transaction_row(
    transaction: &Transaction,
    categories: &[Category],
    account_names: &HashMap<AccountRef, String>,
) -> Markup {
    let account_label = transaction
        .account
        .and_then(|account| account_names.get(&account).cloned())
        .unwrap_or_else(|| "—".to_string());
    let categorize_url = format_endpoint(endpoints::SET_TRANSACTION_CATEGORY, transaction.id);

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }

            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (transaction.description)
            }

            td class=(TABLE_CELL_STYLE) { (account_label) }

            td class="px-6 py-4 text-right" { (format_currency(transaction.amount)) }

            td class=(TABLE_CELL_STYLE)
            {
                select
                    name="category_id"
                    class=(FORM_SELECT_STYLE)
                    hx-post=(categorize_url)
                    hx-trigger="change"
                    hx-target="#alert-container"
                    hx-swap="innerHTML"
                {
                    option value="" selected[transaction.category_id.is_none()]
                    {
                        "Uncategorized"
                    }

                    @for category in categories {
                        option
                            value=(category.id)
                            selected[transaction.category_id == Some(category.id)]
                        {
                            (category.name)
                        }
                    }
                }
            }
        }
    )
}
