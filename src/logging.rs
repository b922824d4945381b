//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// Form fields whose values must never reach the logs.
const REDACTED_FIELDS: &[&str] = &["password", "confirm_password"];

/// How much of a body is logged at the `info` level before truncating.
const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body logged at the `debug` level. Password form fields are
/// redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = extract_parts_and_body_text(request).await;

    let is_form_post = parts.method == axum::http::Method::POST
        && parts.headers.get(CONTENT_TYPE)
            == Some(&"application/x-www-form-urlencoded".parse().unwrap());

    if is_form_post {
        let mut display_text = body_text.clone();
        for field in REDACTED_FIELDS {
            display_text = redact_field(&display_text, field);
        }
        log_body("Received request", &format!("{parts:#?}"), &display_text);
    } else {
        log_body("Received request", &format!("{parts:#?}"), &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body_text) = extract_response_parts_and_body_text(response).await;
    log_body("Sending response", &format!("{parts:#?}"), &body_text);

    Response::from_parts(parts, body_text.into())
}

fn redact_field(form_text: &str, field_name: &str) -> String {
    let field_start = form_text.find(&format!("{field_name}="));

    let start = match field_start {
        Some(position) => position,
        None => return form_text.to_string(),
    };

    let field_end = form_text[start..].find('&');
    let end = match field_end {
        Some(end) => start + end,
        None => form_text.len(),
    };
    let field = &form_text[start..end];

    form_text.replace(field, &format!("{field_name}=********"))
}

async fn extract_parts_and_body_text(request: Request) -> (axum::http::request::Parts, String) {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_response_parts_and_body_text(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

fn log_body(prefix: &str, parts: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{prefix}: {parts}\nbody: {}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{prefix}: {parts}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod redact_field_tests {
    use super::redact_field;

    #[test]
    fn redacts_field_in_middle_of_form() {
        let form = "email=foo%40bar.baz&password=hunter2&remember_me=on";

        let redacted = redact_field(form, "password");

        assert_eq!(redacted, "email=foo%40bar.baz&password=********&remember_me=on");
    }

    #[test]
    fn redacts_field_at_end_of_form() {
        let form = "email=foo%40bar.baz&password=hunter2";

        let redacted = redact_field(form, "password");

        assert_eq!(redacted, "email=foo%40bar.baz&password=********");
    }

    #[test]
    fn leaves_forms_without_the_field_alone() {
        let form = "account=all&month=2025-03";

        let redacted = redact_field(form, "password");

        assert_eq!(redacted, form);
    }
}
