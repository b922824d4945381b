//! The registration page and endpoint.
//!
//! A successful registration logs the new user straight in and sends them to
//! the dashboard.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error, PasswordHash, ValidatedPassword,
    auth::{invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, LINK_STYLE, base, email_input, log_in_register, password_input},
    log_in::LoginState,
    user::create_user,
};

/// The raw data entered by the user in the registration form.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    /// The email to register with.
    pub email: String,
    /// The chosen password.
    pub password: String,
    /// The password a second time, to catch typos.
    pub confirm_password: String,
}

/// Which form field a registration error belongs to.
enum RegisterFormError<'a> {
    Email(&'a str),
    Password(&'a str),
}

fn register_form(email: &str, error: Option<RegisterFormError>) -> Markup {
    let (email_error, password_error) = match error {
        Some(RegisterFormError::Email(message)) => (Some(message), None),
        Some(RegisterFormError::Password(message)) => (None, Some(message)),
        None => (None, None),
    };

    let form = html!(
        form hx-post=(endpoints::USERS) class="space-y-4 md:space-y-6"
        {
            (email_input(email, email_error))
            (password_input("password", "Password", password_error))
            (password_input("confirm_password", "Confirm password", None))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create account" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in" }
            }
        }
    );

    log_in_register("Create an account", &form)
}

/// Display the registration page.
pub async fn get_register_page() -> Markup {
    base("Register", &[], &register_form("", None))
}

/// Handler for registration requests via the POST method.
///
/// On success the user is logged in (auth cookie set) and redirected to the
/// dashboard. Validation failures re-render the form with an error message
/// against the offending field.
pub async fn register_user(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = form.email.trim().to_owned();

    if form.password != form.confirm_password {
        return register_error_response(
            &email,
            RegisterFormError::Password("Passwords do not match."),
        );
    }

    let validated_password = match ValidatedPassword::new(&form.password) {
        Ok(password) => password,
        Err(Error::TooWeak(feedback)) => {
            return register_error_response(&email, RegisterFormError::Password(&feedback));
        }
        Err(error) => {
            tracing::error!("Unhandled error while validating password: {error}");
            return register_error_response(
                &email,
                RegisterFormError::Password("An internal error occurred. Please try again later."),
            );
        }
    };

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return register_error_response(
                &email,
                RegisterFormError::Password("An internal error occurred. Please try again later."),
            );
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return register_error_response(
                    &email,
                    RegisterFormError::Email("An internal error occurred. Please try again later."),
                );
            }
        };

        match create_user(&email, password_hash, &connection) {
            Ok(user) => user,
            Err(Error::InvalidEmail(_)) => {
                return register_error_response(
                    &email,
                    RegisterFormError::Email("Enter a valid email address."),
                );
            }
            Err(Error::DuplicateEmail) => {
                return register_error_response(
                    &email,
                    RegisterFormError::Email(
                        "This email address is already registered. Try logging in instead.",
                    ),
                );
            }
            Err(error) => {
                tracing::error!("Unhandled error while creating user: {error}");
                return register_error_response(
                    &email,
                    RegisterFormError::Email("An internal error occurred. Please try again later."),
                );
            }
        }
    };

    tracing::info!("registered user {}", user.id);

    set_auth_cookie(jar.clone(), user.id, state.cookie_duration)
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

fn register_error_response(email: &str, error: RegisterFormError) -> Response {
    (StatusCode::OK, register_form(email, Some(error))).into_response()
}
