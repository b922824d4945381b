//! The endpoint for generating demo data across every account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rand::thread_rng;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{AccountRef, get_bank_accounts, get_linked_accounts},
    alert::Alert,
    bank::{statement::generate_monthly_statement, sync::ingest_statement},
    category::{CATEGORY_KEYWORDS, CategoryLookup},
    month::CalendarMonth,
    timezone::local_date_today,
    transaction::delete_user_transactions,
    user::UserId,
};

/// How many months of history the demo data covers, including the current month.
const DEMO_MONTHS: u32 = 3;

/// The state needed to generate demo data.
#[derive(Debug, Clone)]
pub struct DemoDataState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for DemoDataState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler that replaces the user's transactions with three months
/// of generated statements for every account, both legacy and linked.
pub async fn generate_demo_data_endpoint(
    State(state): State<DemoDataState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let Some(today) = local_date_today(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone.clone()).into_alert_response();
    };

    match generate_demo_data(user_id, CalendarMonth::from_date(today), &connection) {
        Ok(DemoData {
            transactions,
            accounts,
        }) => {
            tracing::info!("generated {transactions} demo transactions across {accounts} accounts");

            Alert::success(
                "Demo data ready",
                &format!("Generated {transactions} transactions across {accounts} accounts."),
            )
            .into_response()
        }
        Err(Error::NotFound) => (
            StatusCode::BAD_REQUEST,
            Alert::error(
                "No bank accounts linked",
                "Link an account before generating demo data.",
            )
            .into_html(),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not generate demo data: {error}");
            error.into_alert_response()
        }
    }
}

struct DemoData {
    transactions: usize,
    accounts: usize,
}

/// Wipe the user's transactions and regenerate [DEMO_MONTHS] months of
/// statements for every account, inside a single SQL transaction.
///
/// # Errors
/// Returns a [Error::NotFound] when the user has no accounts at all, and a
/// [Error::SqlError] if a query fails. A failure rolls back the wipe.
fn generate_demo_data(
    user_id: UserId,
    current_month: CalendarMonth,
    connection: &Connection,
) -> Result<DemoData, Error> {
    let legacy_accounts = get_bank_accounts(user_id, connection)?;
    let linked_accounts = get_linked_accounts(user_id, connection)?;

    let accounts: Vec<AccountRef> = legacy_accounts
        .iter()
        .map(|account| AccountRef::Legacy(account.id))
        .chain(
            linked_accounts
                .iter()
                .map(|account| AccountRef::Linked(account.id)),
        )
        .collect();

    if accounts.is_empty() {
        return Err(Error::NotFound);
    }

    let sql_transaction = connection.unchecked_transaction()?;

    delete_user_transactions(user_id, &sql_transaction)?;

    let lookup = CategoryLookup::load(&sql_transaction)?;
    let mut rng = thread_rng();
    let mut transactions = 0;

    for account in &accounts {
        for month_offset in 0..DEMO_MONTHS {
            let month = current_month.minus_months(month_offset);
            let entries = generate_monthly_statement(month.year(), month.month(), &mut rng);

            transactions += ingest_statement(
                user_id,
                *account,
                &entries,
                CATEGORY_KEYWORDS,
                &lookup,
                &sql_transaction,
            )?;
        }
    }

    sql_transaction.commit()?;

    Ok(DemoData {
        transactions,
        accounts: accounts.len(),
    })
}

#[cfg(test)]
mod generate_demo_data_tests {
    use rusqlite::Connection;
    use time::{Month, macros::date};

    use crate::{
        Error, PasswordHash,
        account::{TransactionScope, create_bank_account, create_linked_account},
        db::initialize,
        month::CalendarMonth,
        transaction::{Transaction, create_transaction, get_scope_months},
        user::{UserId, create_user},
    };

    use super::generate_demo_data;

    fn get_test_connection() -> (Connection, UserId) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user("test@test.com", PasswordHash::new_unchecked("hunter2"), &conn)
            .expect("Could not create test user");

        (conn, user.id)
    }

    #[test]
    fn fails_without_accounts() {
        let (conn, user_id) = get_test_connection();

        let result = generate_demo_data(user_id, CalendarMonth::new(2025, Month::March), &conn);

        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[test]
    fn generates_three_months_for_both_account_kinds() {
        let (conn, user_id) = get_test_connection();
        create_bank_account(user_id, "Primary", &conn).unwrap();
        create_linked_account(user_id, "HDFC Bank", "Salary", &conn).unwrap();

        let demo_data =
            generate_demo_data(user_id, CalendarMonth::new(2025, Month::March), &conn).unwrap();

        assert_eq!(demo_data.accounts, 2);
        // 2 accounts x 3 months x 15-25 entries, minus any duplicate collisions.
        assert!(demo_data.transactions >= 60);

        let months = get_scope_months(&TransactionScope::Combined(user_id), &conn).unwrap();
        assert_eq!(
            months,
            vec![
                CalendarMonth::new(2025, Month::March),
                CalendarMonth::new(2025, Month::February),
                CalendarMonth::new(2025, Month::January),
            ]
        );
    }

    #[test]
    fn wipes_existing_transactions_first() {
        let (conn, user_id) = get_test_connection();
        create_bank_account(user_id, "Primary", &conn).unwrap();
        create_transaction(
            Transaction::build(user_id, 100.0, date!(2020 - 01 - 01), "old transaction"),
            &conn,
        )
        .unwrap();

        generate_demo_data(user_id, CalendarMonth::new(2025, Month::March), &conn).unwrap();

        let months = get_scope_months(&TransactionScope::Combined(user_id), &conn).unwrap();
        assert!(
            !months.contains(&CalendarMonth::new(2020, Month::January)),
            "old transactions should have been wiped"
        );
    }
}
