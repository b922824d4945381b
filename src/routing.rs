//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{
        delete_linked_account_endpoint, get_accounts_page, link_account_endpoint,
        rename_account_endpoint, toggle_account_endpoint,
    },
    auth::{auth_guard, auth_guard_hx},
    bank::{generate_demo_data_endpoint, sync_linked_account_endpoint},
    dashboard::{get_dashboard_page, get_spending_by_category},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    log_in::{get_log_in_page, post_log_in},
    log_out::get_log_out,
    not_found::get_404_not_found,
    register_user::{get_register_page, register_user},
    transaction::{get_transactions_page, set_transaction_category_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These API routes use the HX-REDIRECT header for auth redirects so that
    // HTMX requests and the chart fetch end up at the log-in page.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::LINK_ACCOUNT, post(link_account_endpoint))
            .route(endpoints::SYNC_ACCOUNT, post(sync_linked_account_endpoint))
            .route(endpoints::RENAME_ACCOUNT, post(rename_account_endpoint))
            .route(endpoints::TOGGLE_ACCOUNT, post(toggle_account_endpoint))
            .route(
                endpoints::DELETE_LINKED_ACCOUNT,
                delete(delete_linked_account_endpoint),
            )
            .route(
                endpoints::SET_TRANSACTION_CATEGORY,
                post(set_transaction_category_endpoint),
            )
            .route(
                endpoints::SPENDING_BY_CATEGORY,
                get(get_spending_by_category),
            )
            .route(endpoints::DEMO_DATA, post(generate_demo_data_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
