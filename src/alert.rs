//! Alert partials for displaying success and error messages to users.
//!
//! Endpoints triggered from HTMX return these snippets, which the page swaps
//! into the alert container.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A success or error message with optional details.
#[derive(Debug, Clone)]
pub enum Alert {
    /// The operation succeeded.
    Success {
        /// The headline message.
        message: String,
        /// A longer explanation, may be empty.
        details: String,
    },
    /// The operation failed.
    Error {
        /// The headline message.
        message: String,
        /// A longer explanation, may be empty.
        details: String,
    },
}

impl Alert {
    /// Create a new success alert.
    pub fn success(message: &str, details: &str) -> Self {
        Self::Success {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Create a new error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self::Error {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    /// Render the alert as markup.
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (
                "flex flex-col gap-1 p-4 mb-4 text-sm rounded-lg shadow \
                 text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400",
                message,
                details,
            ),
            Alert::Error { message, details } => (
                "flex flex-col gap-1 p-4 mb-4 text-sm rounded-lg shadow \
                 text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400",
                message,
                details,
            ),
        };

        html!(
            div role="alert" class=(container_style)
            {
                span class="font-medium" { (message) }

                @if !details.is_empty() {
                    span { (details) }
                }
            }
        )
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
