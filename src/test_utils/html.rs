//! Test helpers for parsing and validating HTML responses.

use axum::response::Response;
use scraper::Html;

/// Read a response body to completion and parse it as an HTML document.
pub(crate) async fn parse_html_document(response: Response) -> Html {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not read response body");
    let text = String::from_utf8_lossy(&body).to_string();

    Html::parse_document(&text)
}

/// Assert that the HTML parsed without errors.
#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}\n{}",
        html.errors,
        html.html()
    );
}
