//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level authentication and cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, LINK_STYLE, base, email_input, log_in_register, password_input},
    user::{User, get_user_by_email},
};

/// The error message shown for a wrong email or password.
///
/// Deliberately the same for both cases so the form does not reveal which
/// emails are registered.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(30);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl LoginState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The email and password are stored as plain strings. There is no need for validation here since
/// they will be compared against the email and password in the database, which have been verified.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,
    /// Password entered during log-in.
    pub password: String,
    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or
    /// is not set. The `Some` variant should be interpreted as `true`
    /// irregardless of the string value, and the `None` variant as `false`.
    pub remember_me: Option<String>,
}

fn log_in_form(email: &str, error_message: Option<&str>) -> Markup {
    let form = html!(
        form hx-post=(endpoints::LOG_IN_API) class="space-y-4 md:space-y-6"
        {
            (email_input(email, None))
            (password_input("password", "Password", error_message))

            div class="flex items-center gap-2"
            {
                input type="checkbox" name="remember_me" id="remember_me";
                label for="remember_me" class="text-sm text-gray-900 dark:text-white"
                {
                    "Remember me"
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account yet? "
                a href=(endpoints::REGISTER_VIEW) class=(LINK_STYLE) { "Register" }
            }
        }
    );

    log_in_register("Log in to your account", &form)
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Markup {
    base("Log In", &[], &log_in_form("", None))
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is
/// redirected to the dashboard page. Otherwise, the form is returned with an
/// error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let email = user_data.email.trim();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return log_in_error_response(email, "An internal error occurred. Please try again later.");
        }
    };

    let user: User = match get_user_by_email(email, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            return log_in_error_response(email, INVALID_CREDENTIALS_ERROR_MSG);
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_error_response(email, "An internal error occurred. Please try again later.");
        }
    };

    let is_password_valid = match user.password_hash.verify(&user_data.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_error_response(email, "An internal error occurred. Please try again later.");
        }
    };

    if !is_password_valid {
        return log_in_error_response(email, INVALID_CREDENTIALS_ERROR_MSG);
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    set_auth_cookie(jar.clone(), user.id, cookie_duration)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}

fn log_in_error_response(email: &str, error_message: &str) -> Response {
    (StatusCode::OK, log_in_form(email, Some(error_message))).into_response()
}


#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form, Router,
        body::Body,
        extract::State,
        http::{Response, StatusCode},
        routing::post,
    };
    use axum_extra::extract::PrivateCookieJar;
    use axum_htmx::HX_REDIRECT;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        PasswordHash, ValidatedPassword,
        auth::{COOKIE_EXPIRY, COOKIE_USER_ID},
        endpoints,
        user::{User, create_user, create_user_table},
    };

    use super::{INVALID_CREDENTIALS_ERROR_MSG, LogInData, LoginState, post_log_in};

    fn get_test_app_config(test_password: Option<&str>) -> LoginState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        if let Some(test_password) = test_password {
            let password_hash =
                PasswordHash::new(ValidatedPassword::new_unchecked(test_password), 4)
                    .expect("Could not hash test password");
            let _user: User = create_user("test@test.com", password_hash, &connection)
                .expect("Could not create test user");
        }

        LoginState::new("foobar", Arc::new(Mutex::new(connection)))
    }

    async fn new_log_in_request(state: LoginState, log_in_form: LogInData) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(State(state), jar, Form(log_in_form)).await
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_app_config(Some("averystrongpassword"));

        let response = new_log_in_request(
            state,
            LogInData {
                email: "test@test.com".to_string(),
                password: "averystrongpassword".to_string(),
                remember_me: None,
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::DASHBOARD_VIEW
        );

        let set_cookies: Vec<_> = response
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_owned())
            .collect();
        assert!(
            set_cookies
                .iter()
                .any(|cookie| cookie.starts_with(COOKIE_USER_ID)),
            "user ID cookie not set: {set_cookies:?}"
        );
        assert!(
            set_cookies
                .iter()
                .any(|cookie| cookie.starts_with(COOKIE_EXPIRY)),
            "expiry cookie not set: {set_cookies:?}"
        );
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_email() {
        let state = get_test_app_config(None);

        let response = new_log_in_request(
            state,
            LogInData {
                email: "wrong@email.com".to_string(),
                password: "test".to_string(),
                remember_me: None,
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_body_contains_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_password() {
        let state = get_test_app_config(Some("averystrongpassword"));

        let response = new_log_in_request(
            state,
            LogInData {
                email: "test@test.com".to_string(),
                password: "wrongpassword".to_string(),
                remember_me: None,
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_body_contains_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn form_deserialises_without_remember_me() {
        let state = get_test_app_config(None);
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);
        let server = TestServer::new(app);
        let form = [("email", "test@test.com"), ("password", "test")];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_ne!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn form_deserialises_with_remember_me() {
        let state = get_test_app_config(None);
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);
        let server = TestServer::new(app);
        let form = [
            ("email", "test@test.com"),
            ("password", "test"),
            ("remember_me", "on"),
        ];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_ne!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    async fn assert_body_contains_message(response: Response<Body>, message: &str) {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();

        let text = String::from_utf8_lossy(&body).to_string();

        assert!(
            text.contains(message),
            "response body should contain the text '{}' but got {}",
            message,
            text
        );
    }
}
