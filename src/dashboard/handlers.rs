//! Dashboard HTTP handlers and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{ResolvedScope, ScopeQuery, TransactionScope, resolve_scope},
    dashboard::stats::{MonthlySummary, monthly_summary},
    endpoints,
    html::{HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, STAT_CARD_STYLE, base, format_currency},
    month::CalendarMonth,
    navigation::NavBar,
    timezone::local_date_today,
    transaction::{AccountOption, get_account_options, scope_selector_form},
    user::UserId,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's monthly spending.
///
/// A store fault never surfaces as an error page here: the dashboard falls
/// back to zeroed figures so the page always renders.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
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

    let account_options = get_account_options(user_id, &connection).unwrap_or_else(|error| {
        tracing::error!("could not get account options: {error}");
        Vec::new()
    });

    // The first option is always "All accounts"; anything beyond it is a
    // real account.
    if account_options.len() <= 1 {
        return Ok(dashboard_no_accounts_view().into_response());
    }

    let resolved = resolve_scope(
        user_id,
        query.account.as_deref(),
        query.month.as_deref(),
        today,
        &connection,
    )
    .unwrap_or_else(|error| {
        tracing::error!("could not resolve scope, falling back to empty dashboard: {error}");
        let month = CalendarMonth::from_date(today);

        ResolvedScope {
            scope: TransactionScope::Combined(user_id),
            month,
            available_months: vec![month],
        }
    });

    let summary = monthly_summary(&resolved.scope, resolved.month, &connection).unwrap_or_else(
        |error| {
            tracing::error!("could not aggregate monthly summary, showing zeroes: {error}");
            MonthlySummary::default()
        },
    );

    Ok(dashboard_view(&resolved, &summary, &account_options).into_response())
}

fn dashboard_view(
    resolved: &ResolvedScope,
    summary: &MonthlySummary,
    account_options: &[AccountOption],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Dashboard" }

                    (scope_selector_form(endpoints::DASHBOARD_VIEW, resolved, account_options))
                }

                section class="grid grid-cols-1 sm:grid-cols-3 gap-4"
                {
                    (stat_card("Total spending", &format_currency(summary.total_spending)))
                    (stat_card("Transactions", &summary.transaction_count.to_string()))
                    (stat_card("Top category", summary.top_category_label()))
                }

                section class=(STAT_CARD_STYLE)
                {
                    h2 class="text-lg font-semibold mb-3" { "Spending by category" }

                    div id="spending-chart" class="space-y-2 min-h-[120px]"
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "Loading…" }
                    }
                }
            }
        }
    );

    base(
        "Dashboard",
        &[spending_chart_script(resolved)],
        &content,
    )
}

fn stat_card(label: &str, value: &str) -> Markup {
    html!(
        div class=(STAT_CARD_STYLE)
        {
            div class="text-xs uppercase text-gray-500 dark:text-gray-400" { (label) }
            div class="text-2xl font-bold text-gray-900 dark:text-white" { (value) }
        }
    )
}

/// JavaScript that loads the chart data from the JSON API and renders it as
/// a bar list inside `#spending-chart`.
fn spending_chart_script(resolved: &ResolvedScope) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const container = document.getElementById('spending-chart');
            const params = new URLSearchParams({{
                account: '{account}',
                month: '{month}',
            }});

            fetch('{endpoint}?' + params)
                .then((response) => response.json())
                .then((chart) => {{
                    container.replaceChildren();

                    if (chart.labels.length === 0) {{
                        const empty = document.createElement('p');
                        empty.className = 'text-sm text-gray-500 dark:text-gray-400';
                        empty.textContent = 'No categorized spending this month.';
                        container.appendChild(empty);
                        return;
                    }}

                    const max = Math.max(...chart.data);

                    chart.labels.forEach((label, i) => {{
                        const row = document.createElement('div');
                        row.className = 'flex items-center gap-2 text-sm';

                        const name = document.createElement('span');
                        name.className = 'w-32 shrink-0 truncate';
                        name.textContent = label;

                        const track = document.createElement('div');
                        track.className = 'flex-1 bg-gray-100 dark:bg-gray-700 rounded h-4';

                        const bar = document.createElement('div');
                        bar.className = 'bg-blue-500 dark:bg-blue-600 rounded h-4';
                        bar.style.width = (chart.data[i] / max * 100).toFixed(1) + '%';
                        track.appendChild(bar);

                        const amount = document.createElement('span');
                        amount.className = 'w-24 shrink-0 text-right tabular-nums';
                        amount.textContent = '₹' + chart.data[i].toFixed(2);

                        row.append(name, track, amount);
                        container.appendChild(row);
                    }});
                }})
                .catch(() => {{
                    container.textContent = 'Could not load chart data.';
                }});
        }});"#,
        account = resolved.scope.selector_string(),
        month = resolved.month,
        endpoint = endpoints::SPENDING_BY_CATEGORY,
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

fn dashboard_no_accounts_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 text-center max-w-md"
            {
                h1 class="text-xl font-bold" { "Welcome to FinTrack" }

                p class="text-gray-500 dark:text-gray-400"
                {
                    "No bank accounts linked yet. Link an account to start
                    tracking your spending."
                }

                a href=(endpoints::ACCOUNTS_VIEW) class=(LINK_STYLE) { "Link an account" }
            }
        }
    );

    base("Dashboard", &[], &content)
}
