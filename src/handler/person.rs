//! Person resource handlers
//!
//! One handler per route; each is a thin adapter that calls the store
//! client and selects a view, a redirect, or a status code.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::sync::Arc;

use crate::config::AppState;
use crate::handler::router::PersonRoute;
use crate::http::{self, form::FormData};
use crate::logger;
use crate::store::{PersonInput, StoreError};
use crate::views;

/// Dispatch a matched route to its handler.
pub async fn dispatch(
    route: PersonRoute,
    body: &FormData,
    state: &Arc<AppState>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match route {
        PersonRoute::List => list(state, is_head).await,
        PersonRoute::NewForm => new_form(is_head),
        PersonRoute::Create => create(body, state).await,
        PersonRoute::Show(id) => show(&id, state, is_head).await,
        PersonRoute::EditForm(id) => edit_form(&id, state, is_head).await,
        PersonRoute::Update(id) => update(&id, body, state).await,
        PersonRoute::DeleteConfirm(id) => delete_confirm(&id, state, is_head).await,
        PersonRoute::Delete(id) => delete(&id, state).await,
    }
}

/// GET /person
async fn list(state: &Arc<AppState>, is_head: bool) -> Response<Full<Bytes>> {
    match state.store.list_all().await {
        Ok(people) => http::build_html_response(views::person_list(&people), is_head),
        Err(e) => store_error_response(&e),
    }
}

/// GET /person/new
fn new_form(is_head: bool) -> Response<Full<Bytes>> {
    http::build_html_response(views::person_new_form(&PersonInput::default(), None), is_head)
}

/// POST /person
async fn create(body: &FormData, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let input = PersonInput::from_form(body);
    match state.store.create(&input).await {
        Ok(_) => http::build_redirect_response("/person"),
        Err(StoreError::Validation(e)) => http::build_html_with_status(
            views::person_new_form(&input, Some(&e.to_string())),
            StatusCode::BAD_REQUEST,
            false,
        ),
        Err(e) => store_error_response(&e),
    }
}

/// GET /person/:id
async fn show(id: &str, state: &Arc<AppState>, is_head: bool) -> Response<Full<Bytes>> {
    match state.store.get_by_id(id).await {
        Ok(Some(person)) => http::build_html_response(views::person_show(&person), is_head),
        Ok(None) => not_found(),
        Err(e) => store_error_response(&e),
    }
}

/// GET /person/:id/edit
async fn edit_form(id: &str, state: &Arc<AppState>, is_head: bool) -> Response<Full<Bytes>> {
    match state.store.get_by_id(id).await {
        Ok(Some(person)) => http::build_html_response(
            views::person_edit_form(&person.id, &PersonInput::from(&person), None),
            is_head,
        ),
        Ok(None) => not_found(),
        Err(e) => store_error_response(&e),
    }
}

/// PUT /person/:id
async fn update(id: &str, body: &FormData, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let input = PersonInput::from_form(body);
    match state.store.update(id, &input).await {
        Ok(Some(_)) => http::build_redirect_response("/person"),
        Ok(None) => not_found(),
        Err(StoreError::Validation(e)) => http::build_html_with_status(
            views::person_edit_form(id, &input, Some(&e.to_string())),
            StatusCode::BAD_REQUEST,
            false,
        ),
        Err(e) => store_error_response(&e),
    }
}

/// GET /person/:id/delete
async fn delete_confirm(id: &str, state: &Arc<AppState>, is_head: bool) -> Response<Full<Bytes>> {
    match state.store.get_by_id(id).await {
        Ok(Some(person)) => {
            http::build_html_response(views::person_delete_confirm(&person), is_head)
        }
        Ok(None) => not_found(),
        Err(e) => store_error_response(&e),
    }
}

/// DELETE /person/:id
async fn delete(id: &str, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    match state.store.delete(id).await {
        Ok(Some(_)) => http::build_redirect_response("/person"),
        Ok(None) => not_found(),
        Err(e) => store_error_response(&e),
    }
}

fn not_found() -> Response<Full<Bytes>> {
    http::build_404_response("Person not found")
}

/// Map a store failure to its response. Malformed ids are client errors;
/// anything unexpected is logged server-side and answered generically.
fn store_error_response(error: &StoreError) -> Response<Full<Bytes>> {
    match error {
        StoreError::Unavailable => http::build_503_response(),
        StoreError::InvalidId(id) => {
            logger::log_warning(&format!("Rejected malformed person id: {id}"));
            http::build_400_response("Invalid person id")
        }
        StoreError::Validation(e) => http::build_400_response(&e.to_string()),
        StoreError::Persist(_) => {
            logger::log_error(&format!("Store operation failed: {error}"));
            http::build_500_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::http::form;

    async fn test_state() -> Arc<AppState> {
        let mut config = Config::load_from("does-not-exist").unwrap();
        config.store.data_file = None;
        let state = Arc::new(AppState::new(config));
        state.store.connect().await.unwrap();
        state
    }

    fn ana_form() -> FormData {
        form::parse("name=Ana&age=30&gender=Female&mobile=555-0100")
    }

    #[tokio::test]
    async fn test_create_redirects_and_lists() {
        let state = test_state().await;

        let resp = dispatch(PersonRoute::Create, &ana_form(), &state, false).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["Location"], "/person");

        let people = state.store.list_all().await.unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].name, "Ana");
    }

    #[tokio::test]
    async fn test_create_invalid_rerenders_form_with_400() {
        let state = test_state().await;
        let body = form::parse("name=Ana&age=-5&gender=Female&mobile=555-0100");

        let resp = dispatch(PersonRoute::Create, &body, &state, false).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");
        assert!(state.store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_show_absent_id_is_404() {
        let state = test_state().await;
        let absent = uuid::Uuid::new_v4().to_string();

        for route in [
            PersonRoute::Show(absent.clone()),
            PersonRoute::EditForm(absent.clone()),
            PersonRoute::DeleteConfirm(absent.clone()),
            PersonRoute::Delete(absent.clone()),
        ] {
            let resp = dispatch(route, &FormData::default(), &state, false).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_malformed_id_is_400() {
        let state = test_state().await;
        let resp = dispatch(
            PersonRoute::Show("not-a-uuid".to_string()),
            &FormData::default(),
            &state,
            false,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let state = test_state().await;
        dispatch(PersonRoute::Create, &ana_form(), &state, false).await;
        let id = state.store.list_all().await.unwrap()[0].id.clone();

        let body = form::parse("name=Ana&age=31&gender=Female&mobile=555-0100");
        let resp = dispatch(PersonRoute::Update(id.clone()), &body, &state, false).await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        let person = state.store.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(person.age, 31);
        assert_eq!(person.id, id);
    }

    #[tokio::test]
    async fn test_delete_then_list_empty() {
        let state = test_state().await;
        dispatch(PersonRoute::Create, &ana_form(), &state, false).await;
        let id = state.store.list_all().await.unwrap()[0].id.clone();

        let resp = dispatch(
            PersonRoute::Delete(id.clone()),
            &FormData::default(),
            &state,
            false,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert!(state.store.list_all().await.unwrap().is_empty());

        let resp = dispatch(PersonRoute::Delete(id), &FormData::default(), &state, false).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_store_down_maps_to_503() {
        let mut config = Config::load_from("does-not-exist").unwrap();
        config.store.data_file = None;
        let state = Arc::new(AppState::new(config));
        // never connected

        let resp = dispatch(PersonRoute::List, &FormData::default(), &state, false).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
