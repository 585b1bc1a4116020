use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use server_api::{create_item, delete_item, get_item, list_items, update_item};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{collection_route, ListQuery},
    resource::{Books, Resource, Users},
};
use storage::{ResourceStorage, Storage};
use tower_http::trace::TraceLayer;

mod app_state;
pub mod config;

pub use app_state::AppState;

const MAX_BODY_BYTES: usize = 64 * 1024;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Mounts both resource collections under `api_prefix` (already normalized,
/// empty for the root).
pub fn build_router(state: Arc<AppState>, api_prefix: &str) -> Router {
    let resources = Router::new()
        .merge(resource_routes::<Users>())
        .merge(resource_routes::<Books>());

    let api = if api_prefix.is_empty() {
        resources
    } else {
        Router::new().nest(api_prefix, resources)
    };

    Router::new()
        .route("/healthz", get(healthz))
        .merge(api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn resource_routes<R>() -> Router<Arc<AppState>>
where
    R: Resource,
    Storage: ResourceStorage<R>,
{
    let collection = collection_route(R::COLLECTION);
    let member = format!("{collection}:id/");
    Router::new()
        .route(&collection, get(http_list::<R>).post(http_create::<R>))
        .route(
            &member,
            get(http_get::<R>)
                .put(http_update::<R>)
                .delete(http_delete::<R>),
        )
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|e| reject(ApiError::new(ErrorCode::Internal, e.to_string())))?;
    Ok("ok")
}

async fn http_list<R>(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<R::Item>>>
where
    R: Resource,
    Storage: ResourceStorage<R>,
{
    let items = list_items::<R>(&state.api, &query).await.map_err(reject)?;
    Ok(Json(items))
}

async fn http_get<R>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<R::Id>,
) -> ApiResult<Json<R::Item>>
where
    R: Resource,
    Storage: ResourceStorage<R>,
{
    let item = get_item::<R>(&state.api, id).await.map_err(reject)?;
    Ok(Json(item))
}

async fn http_create<R>(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<R::Draft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<R::Item>)>
where
    R: Resource,
    Storage: ResourceStorage<R>,
{
    let Json(draft) = payload.map_err(malformed)?;
    let item = create_item::<R>(&state.api, draft).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn http_update<R>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<R::Id>,
    payload: Result<Json<R::Draft>, JsonRejection>,
) -> ApiResult<Json<R::Item>>
where
    R: Resource,
    Storage: ResourceStorage<R>,
{
    let Json(draft) = payload.map_err(malformed)?;
    let item = update_item::<R>(&state.api, id, draft)
        .await
        .map_err(reject)?;
    Ok(Json(item))
}

async fn http_delete<R>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<R::Id>,
) -> ApiResult<StatusCode>
where
    R: Resource,
    Storage: ResourceStorage<R>,
{
    delete_item::<R>(&state.api, id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bodies that do not decode into a draft are validation failures too.
fn malformed(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    reject(ApiError::new(ErrorCode::Validation, rejection.body_text()))
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
