//! Displays the user's accounts and the account management forms.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::core::{BankAccount, LinkedAccount, get_bank_accounts, get_linked_accounts},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, STAT_CARD_STYLE, base, format_currency,
    },
    navigation::NavBar,
    user::UserId,
};

/// The state needed for the accounts page.
#[derive(Debug, Clone)]
pub struct AccountsPageState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A legacy account with its transaction statistics.
#[derive(Debug, PartialEq)]
struct BankAccountRow {
    account: BankAccount,
    transaction_count: u32,
    total_spending: f64,
}

/// A linked account with its transaction count.
#[derive(Debug, PartialEq)]
struct LinkedAccountRow {
    account: LinkedAccount,
    transaction_count: u32,
}

/// Renders the accounts page showing all accounts.
pub async fn get_accounts_page(
    State(state): State<AccountsPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let legacy_accounts = get_bank_account_rows(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get legacy accounts: {error}"))?;
    let linked_accounts = get_linked_account_rows(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get linked accounts: {error}"))?;

    Ok(accounts_view(&legacy_accounts, &linked_accounts).into_response())
}

fn get_bank_account_rows(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<BankAccountRow>, Error> {
    get_bank_accounts(user_id, connection)?
        .into_iter()
        .map(|account| {
            let (transaction_count, total_spending) = connection.query_row(
                "SELECT COUNT(id), COALESCE(SUM(amount), 0)
                 FROM \"transaction\" WHERE bank_account_id = ?1",
                (account.id,),
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            Ok(BankAccountRow {
                account,
                transaction_count,
                total_spending,
            })
        })
        .collect()
}

fn get_linked_account_rows(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<LinkedAccountRow>, Error> {
    get_linked_accounts(user_id, connection)?
        .into_iter()
        .map(|account| {
            let transaction_count = connection.query_row(
                "SELECT COUNT(id) FROM \"transaction\" WHERE linked_account_id = ?1",
                (account.id,),
                |row| row.get(0),
            )?;

            Ok(LinkedAccountRow {
                account,
                transaction_count,
            })
        })
        .collect()
}

fn accounts_view(legacy_accounts: &[BankAccountRow], linked_accounts: &[LinkedAccountRow]) -> Markup {
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full max-w-3xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Accounts" }

                    button
                        class=(LINK_STYLE)
                        hx-post=(endpoints::DEMO_DATA)
                        hx-target="#alert-container"
                        hx-swap="innerHTML"
                    {
                        "Generate demo data"
                    }
                }

                (link_account_form())

                section class="space-y-4"
                {
                    h2 class="text-lg font-semibold" { "Linked accounts" }

                    @if linked_accounts.is_empty() {
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            "No linked accounts yet. Use the form above to link one."
                        }
                    }

                    ul class="space-y-4"
                    {
                        @for row in linked_accounts {
                            (linked_account_card(row))
                        }
                    }
                }

                section class="space-y-4"
                {
                    h2 class="text-lg font-semibold" { "Legacy accounts" }

                    @if legacy_accounts.is_empty() {
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            "No accounts from the old schema."
                        }
                    }

                    ul class="space-y-4"
                    {
                        @for row in legacy_accounts {
                            (legacy_account_card(row))
                        }
                    }
                }
            }
        }
    );

    base("Accounts", &[], &content)
}

fn link_account_form() -> Markup {
    html!(
        form
            class=(STAT_CARD_STYLE)
            hx-post=(endpoints::LINK_ACCOUNT)
            hx-target="#alert-container"
            hx-swap="innerHTML"
        {
            h2 class="text-lg font-semibold mb-3" { "Link a bank account" }

            div class="flex flex-col gap-3 sm:flex-row sm:items-end"
            {
                div class="flex-1"
                {
                    label for="bank_name" class=(FORM_LABEL_STYLE) { "Bank name" }
                    input
                        type="text"
                        name="bank_name"
                        id="bank_name"
                        placeholder="HDFC Bank"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required;
                }

                div class="flex-1"
                {
                    label for="account_nickname" class=(FORM_LABEL_STYLE) { "Nickname" }
                    input
                        type="text"
                        name="account_nickname"
                        id="account_nickname"
                        placeholder="Salary account"
                        class=(FORM_TEXT_INPUT_STYLE)
                        required;
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Link account" }
            }
        }
    )
}

fn linked_account_card(row: &LinkedAccountRow) -> Markup {
    let account = &row.account;
    let sync_label = match &account.last_synced {
        Some(last_synced) => format!("Last synced {}", last_synced.date()),
        None => "Never synced".to_string(),
    };
    let delete_url = format_endpoint(endpoints::DELETE_LINKED_ACCOUNT, account.id);

    html!(
        li class=(STAT_CARD_STYLE) data-account-card="true"
        {
            div class="flex items-start justify-between gap-3"
            {
                div
                {
                    div class="text-sm font-semibold text-gray-900 dark:text-white"
                    { (account.nickname) }
                    div class="text-xs text-gray-500 dark:text-gray-400"
                    { (account.bank_name) " · " (row.transaction_count) " transactions" }
                    div class="text-xs text-gray-500 dark:text-gray-400" { (sync_label) }
                }

                div class="flex items-center gap-4 text-sm"
                {
                    form
                        hx-post=(endpoints::SYNC_ACCOUNT)
                        hx-target="#alert-container"
                        hx-swap="innerHTML"
                    {
                        input type="hidden" name="account_id" value=(account.id);
                        button type="submit" class=(LINK_STYLE) { "Sync" }
                    }

                    button
                        class=(BUTTON_DELETE_STYLE)
                        hx-delete=(delete_url)
                        hx-target="#alert-container"
                        hx-swap="innerHTML"
                        hx-confirm=(format!(
                            "Are you sure you want to delete the account '{}' and its transactions? This cannot be undone.",
                            account.nickname
                        ))
                    {
                        "Delete"
                    }
                }
            }
        }
    )
}

fn legacy_account_card(row: &BankAccountRow) -> Markup {
    let account = &row.account;
    let rename_url = format_endpoint(endpoints::RENAME_ACCOUNT, account.id);
    let toggle_url = format_endpoint(endpoints::TOGGLE_ACCOUNT, account.id);
    let status = if account.is_active { "Active" } else { "Inactive" };
    let toggle_label = if account.is_active { "Deactivate" } else { "Activate" };

    html!(
        li class=(STAT_CARD_STYLE) data-account-card="true"
        {
            div class="flex items-start justify-between gap-3"
            {
                div
                {
                    div class="text-sm font-semibold text-gray-900 dark:text-white"
                    { (account.name) }
                    div class="text-xs text-gray-500 dark:text-gray-400"
                    {
                        (status) " · " (row.transaction_count) " transactions · "
                        (format_currency(row.total_spending))
                    }
                }

                div class="flex items-center gap-4 text-sm"
                {
                    form
                        class="flex items-center gap-2"
                        hx-post=(rename_url)
                        hx-target="#alert-container"
                        hx-swap="innerHTML"
                    {
                        input
                            type="text"
                            name="account_name"
                            value=(account.name)
                            class=(FORM_TEXT_INPUT_STYLE);
                        button type="submit" class=(LINK_STYLE) { "Rename" }
                    }

                    button
                        class=(LINK_STYLE)
                        hx-post=(toggle_url)
                        hx-target="#alert-container"
                        hx-swap="innerHTML"
                    {
                        (toggle_label)
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod accounts_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        PasswordHash,
        account::{AccountRef, create_bank_account, create_linked_account},
        db::initialize,
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
        transaction::{Transaction, create_transaction},
        user::{UserId, create_user},
    };

    use super::{AccountsPageState, get_accounts_page};

    fn get_test_state() -> (AccountsPageState, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "test@test.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            AccountsPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn page_lists_both_account_kinds() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let legacy = create_bank_account(user_id, "Primary Account", &connection).unwrap();
            create_linked_account(user_id, "HDFC Bank", "Salary Account", &connection).unwrap();
            create_transaction(
                Transaction::build(user_id, 100.0, date!(2025 - 03 - 05), "Payment to Zomato")
                    .account(Some(AccountRef::Legacy(legacy.id))),
                &connection,
            )
            .unwrap();
        }

        let response = get_accounts_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let card_selector = Selector::parse("li[data-account-card='true']").unwrap();
        let cards: Vec<String> = html
            .select(&card_selector)
            .map(|card| card.text().collect())
            .collect();

        assert_eq!(cards.len(), 2);
        assert!(cards.iter().any(|text| text.contains("Salary Account")));
        assert!(cards.iter().any(|text| text.contains("Primary Account")));
    }

    #[tokio::test]
    async fn page_has_link_account_form() {
        let (state, user_id) = get_test_state();

        let response = get_accounts_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form_selector =
            Selector::parse(&format!("form[hx-post='{}']", endpoints::LINK_ACCOUNT)).unwrap();
        assert!(
            html.select(&form_selector).next().is_some(),
            "could not find link-account form"
        );
    }
}
