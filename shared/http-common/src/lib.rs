//! Shared HTTP utilities for the todo list workspace.
//!
//! Provides HTML escaping, form decoding, and the page renderer used by both
//! api-server and lambda-todolist, so the two hosting surfaces serve the same
//! markup for the same state.

pub mod form;
pub mod page;

pub use form::{parse_form_field, AddItemForm};
pub use page::{render_error_page, render_todo_page, FormState};

/// Content type for every rendered page.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Escape text for safe interpolation into HTML element content and
/// double- or single-quoted attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

// ============================================================================
// Lambda HTTP Helpers (feature-gated)
// ============================================================================

#[cfg(feature = "lambda")]
pub mod lambda {
    //! Lambda-specific HTTP response builders using `lambda_http` types.

    use lambda_http::{Body, Response};

    /// Build an HTML response with the given status.
    ///
    /// # Panics
    /// Panics if response construction fails (should not happen for a numeric
    /// status and static header).
    pub fn html_resp(status: u16, html: String) -> Response<Body> {
        Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, crate::HTML_CONTENT_TYPE)
            .body(Body::Text(html))
            .expect("html response construction")
    }

    /// Empty response with an `Allow` header for unsupported methods.
    pub fn method_not_allowed() -> Response<Body> {
        Response::builder()
            .status(405)
            .header(http::header::ALLOW, "GET, POST")
            .body(Body::Empty)
            .expect("empty response body construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("plain"), "plain");
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }
}
