//! HTTP response building module
//!
//! Builders for the status codes and response shapes the application
//! produces, decoupled from handler logic. User-visible failures are
//! plain text; successful page loads are HTML.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

/// Build an HTML page response. HEAD requests get the headers with an
/// empty body.
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    build_html_with_status(content, StatusCode::OK, is_head)
}

/// Build an HTML response with an explicit status (re-rendered forms
/// carry 400).
pub fn build_html_with_status(
    content: String,
    status: StatusCode,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a 302 redirect response.
pub fn build_redirect_response(target: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(302)
        .header("Location", target)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("Redirecting...")))
        .unwrap_or_else(|e| {
            log_build_error("302", &e);
            Response::new(Full::new(Bytes::from("Redirecting...")))
        })
}

/// Build a 400 Bad Request response with a plain-text message.
pub fn build_400_response(message: &str) -> Response<Full<Bytes>> {
    build_plain_response(StatusCode::BAD_REQUEST, message.to_string())
}

/// Build a 404 Not Found response.
pub fn build_404_response(message: &str) -> Response<Full<Bytes>> {
    build_plain_response(StatusCode::NOT_FOUND, message.to_string())
}

/// Build a 405 Method Not Allowed response.
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, POST, PUT, DELETE, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Build an OPTIONS response.
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, POST, PUT, DELETE, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build a 413 Payload Too Large response.
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_plain_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        "413 Payload Too Large".to_string(),
    )
}

/// Build a 500 Internal Server Error response. The real error goes to
/// the server log, never to the client.
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_plain_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Server Error".to_string(),
    )
}

/// Build a 503 Service Unavailable response (store connection down).
pub fn build_503_response() -> Response<Full<Bytes>> {
    build_plain_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "Database not connected".to_string(),
    )
}

/// Build a health probe response.
pub fn build_health_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    build_plain_response(status, body.to_string())
}

fn build_plain_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
