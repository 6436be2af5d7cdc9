//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, the
//! store-connected guard, body reading, method-override resolution,
//! route matching, and access logging.

use crate::config::AppState;
use crate::handler::person;
use crate::http::{self, form};
use crate::logger;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body as _, Bytes};
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// One route per (method, path) pair of the person resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonRoute {
    List,
    NewForm,
    Create,
    Show(String),
    EditForm(String),
    Update(String),
    DeleteConfirm(String),
    Delete(String),
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let http_version = version_label(req.version());

    let response = dispatch(req, &state).await;

    if state.config.logging.access_log {
        let mut entry = logger::AccessLogEntry::new(
            peer_addr.ip().to_string(),
            method.to_string(),
            path,
        );
        entry.query = query;
        entry.http_version = http_version.to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes =
            usize::try_from(response.body().size_hint().exact().unwrap_or(0)).unwrap_or(0);
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route the request through the guard chain to a handler.
async fn dispatch(
    req: Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
) -> Response<Full<Bytes>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let is_head = method == Method::HEAD;

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&method) {
        return resp;
    }

    // 2. Health probes, matched before the store guard so liveness
    //    stays observable while the store is down
    if path == "/healthz" {
        return http::build_health_response(StatusCode::OK, "ok");
    }
    if path == "/readyz" {
        return if state.store.is_connected() {
            http::build_health_response(StatusCode::OK, "ok")
        } else {
            http::build_health_response(StatusCode::SERVICE_UNAVAILABLE, "store disconnected")
        };
    }

    // 3. Store guard: no route touches the store while disconnected
    if !state.store.is_connected() {
        return http::build_503_response();
    }

    // 4. Read and parse the body for methods that carry one
    let body = if matches!(method, Method::POST | Method::PUT) {
        if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
            return resp;
        }
        match req.collect().await {
            Ok(collected) => form::parse_body(&collected.to_bytes()),
            Err(e) => {
                logger::log_warning(&format!("Failed to read request body: {e}"));
                return http::build_400_response("Failed to read request body");
            }
        }
    } else {
        form::FormData::default()
    };

    // 5. Method override (PUT/DELETE tunneled over POST)
    let effective = effective_method(&method, query.as_deref(), &body);

    // 6. The application's only page set lives under /person
    if path == "/" {
        return http::build_redirect_response("/person");
    }

    match match_route(&effective, &path) {
        Some(route) => person::dispatch(route, &body, state, is_head).await,
        None => http::build_404_response("Not Found"),
    }
}

/// Check HTTP method and return an early response for anything the
/// application never routes.
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD | &Method::POST | &Method::PUT | &Method::DELETE => None,
        &Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    req: &Request<hyper::body::Incoming>,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Resolve the method a POST actually carries. The `_method` token is
/// read from the query string first, then the form body; only PUT and
/// DELETE may be tunneled.
pub fn effective_method(method: &Method, query: Option<&str>, body: &form::FormData) -> Method {
    if *method != Method::POST {
        return method.clone();
    }

    let from_query = query
        .map(form::parse)
        .and_then(|q| q.get("_method").map(ToString::to_string));
    let override_value = from_query.or_else(|| body.get("_method").map(ToString::to_string));

    match override_value.as_deref().map(str::to_ascii_uppercase) {
        Some(ref v) if v == "PUT" => Method::PUT,
        Some(ref v) if v == "DELETE" => Method::DELETE,
        _ => Method::POST,
    }
}

/// Match a (method, path) pair to its route. The `:id` segment is kept
/// opaque; the store decides whether it is well-formed.
pub fn match_route(method: &Method, path: &str) -> Option<PersonRoute> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, segments.as_slice()) {
        (&Method::GET | &Method::HEAD, ["person"]) => Some(PersonRoute::List),
        (&Method::POST, ["person"]) => Some(PersonRoute::Create),
        (&Method::GET | &Method::HEAD, ["person", "new"]) => Some(PersonRoute::NewForm),
        (&Method::GET | &Method::HEAD, ["person", id]) => Some(PersonRoute::Show((*id).to_string())),
        (&Method::PUT, ["person", id]) => Some(PersonRoute::Update((*id).to_string())),
        (&Method::DELETE, ["person", id]) => Some(PersonRoute::Delete((*id).to_string())),
        (&Method::GET | &Method::HEAD, ["person", id, "edit"]) => {
            Some(PersonRoute::EditForm((*id).to_string()))
        }
        (&Method::GET | &Method::HEAD, ["person", id, "delete"]) => {
            Some(PersonRoute::DeleteConfirm((*id).to_string()))
        }
        _ => None,
    }
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_route_list_and_create() {
        assert_eq!(match_route(&Method::GET, "/person"), Some(PersonRoute::List));
        assert_eq!(
            match_route(&Method::POST, "/person"),
            Some(PersonRoute::Create)
        );
    }

    #[test]
    fn test_match_route_new_form_wins_over_id() {
        assert_eq!(
            match_route(&Method::GET, "/person/new"),
            Some(PersonRoute::NewForm)
        );
    }

    #[test]
    fn test_match_route_id_routes() {
        assert_eq!(
            match_route(&Method::GET, "/person/abc"),
            Some(PersonRoute::Show("abc".to_string()))
        );
        assert_eq!(
            match_route(&Method::PUT, "/person/abc"),
            Some(PersonRoute::Update("abc".to_string()))
        );
        assert_eq!(
            match_route(&Method::DELETE, "/person/abc"),
            Some(PersonRoute::Delete("abc".to_string()))
        );
        assert_eq!(
            match_route(&Method::GET, "/person/abc/edit"),
            Some(PersonRoute::EditForm("abc".to_string()))
        );
        assert_eq!(
            match_route(&Method::GET, "/person/abc/delete"),
            Some(PersonRoute::DeleteConfirm("abc".to_string()))
        );
    }

    #[test]
    fn test_match_route_head_follows_get() {
        assert_eq!(
            match_route(&Method::HEAD, "/person"),
            Some(PersonRoute::List)
        );
        assert_eq!(
            match_route(&Method::HEAD, "/person/abc"),
            Some(PersonRoute::Show("abc".to_string()))
        );
    }

    #[test]
    fn test_match_route_rejects_unknown() {
        assert_eq!(match_route(&Method::GET, "/people"), None);
        assert_eq!(match_route(&Method::POST, "/person/abc"), None);
        assert_eq!(match_route(&Method::GET, "/person/abc/nope"), None);
        assert_eq!(match_route(&Method::PUT, "/person"), None);
    }

    #[test]
    fn test_effective_method_from_query() {
        let empty = form::FormData::default();
        assert_eq!(
            effective_method(&Method::POST, Some("_method=PUT"), &empty),
            Method::PUT
        );
        assert_eq!(
            effective_method(&Method::POST, Some("_method=delete"), &empty),
            Method::DELETE
        );
    }

    #[test]
    fn test_effective_method_from_body() {
        let body = form::parse("name=Ana&_method=DELETE");
        assert_eq!(effective_method(&Method::POST, None, &body), Method::DELETE);
    }

    #[test]
    fn test_effective_method_query_wins_over_body() {
        let body = form::parse("_method=DELETE");
        assert_eq!(
            effective_method(&Method::POST, Some("_method=PUT"), &body),
            Method::PUT
        );
    }

    #[test]
    fn test_effective_method_only_upgrades_post() {
        let empty = form::FormData::default();
        assert_eq!(
            effective_method(&Method::GET, Some("_method=DELETE"), &empty),
            Method::GET
        );
        assert_eq!(
            effective_method(&Method::POST, Some("_method=PATCH"), &empty),
            Method::POST
        );
        assert_eq!(effective_method(&Method::POST, None, &empty), Method::POST);
    }
}
