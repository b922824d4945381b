//! The JSON endpoint feeding the spending-by-category chart.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState,
    account::{ScopeQuery, resolve_scope},
    dashboard::stats::spending_by_category,
    timezone::local_date_today,
    user::UserId,
};

/// The state needed for the chart endpoint.
#[derive(Debug, Clone)]
pub struct ChartState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for ChartState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Parallel label and value arrays, ready for chart rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    /// Category names, with "Uncategorized" last when present.
    pub labels: Vec<String>,
    /// The summed amount for each label.
    pub data: Vec<f64>,
}

/// A route handler serving the category breakdown for a scope and month as
/// JSON.
///
/// Always responds 200: bad selectors fall back to the combined scope and
/// current month, and a store fault degrades to empty arrays so the chart
/// simply renders nothing.
pub async fn get_spending_by_category(
    State(state): State<ChartState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<ScopeQuery>,
) -> Json<ChartData> {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Json(ChartData::default());
        }
    };

    let Some(today) = local_date_today(&state.local_timezone) else {
        tracing::error!("invalid timezone {}", state.local_timezone);
        return Json(ChartData::default());
    };

    let resolved = match resolve_scope(
        user_id,
        query.account.as_deref(),
        query.month.as_deref(),
        today,
        &connection,
    ) {
        Ok(resolved) => resolved,
        Err(error) => {
            tracing::error!("could not resolve scope for chart: {error}");
            return Json(ChartData::default());
        }
    };

    match spending_by_category(&resolved.scope, resolved.month, &connection) {
        Ok(breakdown) => {
            let (labels, data) = breakdown
                .into_iter()
                .map(|entry| (entry.name, entry.amount))
                .unzip();

            Json(ChartData { labels, data })
        }
        Err(error) => {
            tracing::error!("could not aggregate chart data: {error}");
            Json(ChartData::default())
        }
    }
}

#[cfg(test)]
mod chart_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Query, State},
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        PasswordHash,
        account::ScopeQuery,
        category::CategoryLookup,
        db::initialize,
        transaction::{Transaction, create_transaction},
        user::{UserId, create_user},
    };

    use super::{ChartState, get_spending_by_category};

    fn get_test_state() -> (ChartState, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            "test@test.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            ChartState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Asia/Kolkata".to_string(),
            },
            user.id,
        )
    }

    #[test]
    fn chart_data_serializes_as_parallel_arrays() {
        let chart = super::ChartData {
            labels: vec!["Food & Drink".to_string(), "Uncategorized".to_string()],
            data: vec![300.0, 50.0],
        };

        let json = serde_json::to_string(&chart).unwrap();

        assert_eq!(
            json,
            r#"{"labels":["Food & Drink","Uncategorized"],"data":[300.0,50.0]}"#
        );
    }

    #[tokio::test]
    async fn returns_labels_and_data_with_uncategorized_last() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let food = CategoryLookup::load(&connection)
                .unwrap()
                .get("Food & Drink")
                .unwrap();

            for (amount, category) in [(100.0, Some(food)), (200.0, Some(food)), (50.0, None)] {
                create_transaction(
                    Transaction::build(user_id, amount, date!(2025 - 03 - 15), "test")
                        .category_id(category),
                    &connection,
                )
                .unwrap();
            }
        }

        let query = ScopeQuery {
            account: Some("all".to_string()),
            month: Some("2025-03".to_string()),
        };

        let Json(chart) = get_spending_by_category(State(state), Extension(user_id), Query(query)).await;

        assert_eq!(chart.labels, vec!["Food & Drink", "Uncategorized"]);
        assert_eq!(chart.data, vec![300.0, 50.0]);
    }

    #[tokio::test]
    async fn empty_month_returns_empty_arrays() {
        let (state, user_id) = get_test_state();

        let query = ScopeQuery {
            account: Some("all".to_string()),
            month: Some("2099-01".to_string()),
        };

        let Json(chart) = get_spending_by_category(State(state), Extension(user_id), Query(query)).await;

        assert!(chart.labels.is_empty());
        assert!(chart.data.is_empty());
    }

    #[tokio::test]
    async fn bad_selector_falls_back_to_combined_scope() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let food = CategoryLookup::load(&connection)
                .unwrap()
                .get("Food & Drink")
                .unwrap();
            create_transaction(
                Transaction::build(user_id, 100.0, date!(2025 - 03 - 15), "test")
                    .category_id(Some(food)),
                &connection,
            )
            .unwrap();
        }

        let query = ScopeQuery {
            account: Some("not-an-account".to_string()),
            month: Some("2025-03".to_string()),
        };

        let Json(chart) = get_spending_by_category(State(state), Extension(user_id), Query(query)).await;

        assert_eq!(chart.labels, vec!["Food & Drink"]);
    }
}
