use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, RawQuery, rejection::JsonRejection},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use keyward_core::wire::TOTAL_COUNT_HEADER;
use keyward_core::{AuthorizationUpdate, Id, ListQuery, NewAuthorization};

use crate::app::dto;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_authorization).get(list_authorizations))
        .route(
            "/:id",
            get(get_authorization)
                .patch(update_authorization)
                .delete(delete_authorization),
        )
}

fn parse_id(raw: &str) -> Result<Id, Response> {
    raw.parse::<Id>()
        .map_err(|e| errors::invalid_argument(e.message().to_string()))
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(v)| v)
        .map_err(|rejection| errors::invalid_argument(format!("invalid request body: {}", rejection.body_text())))
}

pub async fn list_authorizations(
    Extension(services): Extension<Arc<AppServices>>,
    RawQuery(raw): RawQuery,
) -> Response {
    let query = match ListQuery::from_query_string(raw.as_deref().unwrap_or_default()) {
        Ok(q) => q,
        Err(e) => return errors::auth_error_to_response(e),
    };

    let page = match services
        .authorizations
        .find_authorizations(&query.filter, &query.options)
        .await
    {
        Ok(p) => p,
        Err(e) => return errors::auth_error_to_response(e),
    };

    let total = HeaderValue::from(page.total);
    let body = dto::page_to_response(&services.links, &query, page);
    (StatusCode::OK, [(TOTAL_COUNT_HEADER, total)], Json(body)).into_response()
}

pub async fn get_authorization(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.authorizations.find_authorization_by_id(&id).await {
        Ok(auth) => (
            StatusCode::OK,
            Json(dto::authorization_to_response(&services.links, auth)),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn create_authorization(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewAuthorization>, JsonRejection>,
) -> Response {
    let new = match parse_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.authorizations.create_authorization(new).await {
        Ok(auth) => {
            tracing::info!(id = %auth.id, user_id = %auth.user_id, "authorization created");
            (
                StatusCode::CREATED,
                Json(dto::authorization_to_response(&services.links, auth)),
            )
                .into_response()
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn update_authorization(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<AuthorizationUpdate>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let update = match parse_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.authorizations.update_authorization(&id, update).await {
        Ok(auth) => (
            StatusCode::OK,
            Json(dto::authorization_to_response(&services.links, auth)),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn delete_authorization(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.authorizations.delete_authorization(&id).await {
        Ok(()) => {
            tracing::info!(id = %id, "authorization deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}
