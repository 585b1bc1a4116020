//! Request handlers for the library REST API, independent of the HTTP layer.
//!
//! Every handler is generic over a [`Resource`] and works against any storage
//! implementing [`ResourceStorage`] for it, so the users and books collections
//! share one code path.

use shared::{
    error::{ApiError, ErrorCode},
    protocol::ListQuery,
    resource::Resource,
};
use storage::{ResourceStorage, Storage};
use tracing::{error, info};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_items<R>(ctx: &ApiContext, query: &ListQuery) -> Result<Vec<R::Item>, ApiError>
where
    R: Resource,
    Storage: ResourceStorage<R>,
{
    ResourceStorage::<R>::list(&ctx.storage, query.term())
        .await
        .map_err(internal::<R>)
}

pub async fn get_item<R>(ctx: &ApiContext, id: R::Id) -> Result<R::Item, ApiError>
where
    R: Resource,
    Storage: ResourceStorage<R>,
{
    ResourceStorage::<R>::get(&ctx.storage, id)
        .await
        .map_err(internal::<R>)?
        .ok_or_else(not_found::<R>)
}

pub async fn create_item<R>(ctx: &ApiContext, draft: R::Draft) -> Result<R::Item, ApiError>
where
    R: Resource,
    Storage: ResourceStorage<R>,
{
    R::validate(&draft)?;
    let item = ResourceStorage::<R>::insert(&ctx.storage, &draft)
        .await
        .map_err(internal::<R>)?;
    info!(resource = R::SINGULAR, id = %R::id(&item), "created");
    Ok(item)
}

pub async fn update_item<R>(ctx: &ApiContext, id: R::Id, draft: R::Draft) -> Result<R::Item, ApiError>
where
    R: Resource,
    Storage: ResourceStorage<R>,
{
    R::validate(&draft)?;
    let item = ResourceStorage::<R>::replace(&ctx.storage, id, &draft)
        .await
        .map_err(internal::<R>)?
        .ok_or_else(not_found::<R>)?;
    info!(resource = R::SINGULAR, %id, "updated");
    Ok(item)
}

pub async fn delete_item<R>(ctx: &ApiContext, id: R::Id) -> Result<(), ApiError>
where
    R: Resource,
    Storage: ResourceStorage<R>,
{
    let removed = ResourceStorage::<R>::remove(&ctx.storage, id)
        .await
        .map_err(internal::<R>)?;
    if !removed {
        return Err(not_found::<R>());
    }
    info!(resource = R::SINGULAR, %id, "deleted");
    Ok(())
}

fn not_found<R: Resource>() -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("{} not found", R::LABEL))
}

fn internal<R: Resource>(err: anyhow::Error) -> ApiError {
    error!(resource = R::SINGULAR, error = %err, "storage failure");
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
