use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateEntryRequest, DeletedResponse, EntryResponse, ListQuery, UpdateEntryRequest},
    services,
};
use crate::{auth::AuthUser, error::ApiError, state::AppState};

pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/entries", get(list_entries).post(create_entry))
        .route(
            "/entries/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

/// Unparsable ids are reported like any other unknown entry.
fn entry_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::EntryNotFound)
}

#[instrument(skip(state, payload))]
pub async fn create_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    let Json(body) = payload.map_err(|_| ApiError::InvalidRequest)?;
    let entry = services::create_entry(&state, user_id, body.into()).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

#[instrument(skip(state, query))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    let Query(q) = query.map_err(|_| ApiError::InvalidDate)?;
    let entries =
        services::list_entries(&state, user_id, q.from.as_deref(), q.to.as_deref()).await?;
    Ok(Json(entries.into_iter().map(EntryResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = services::get_entry(&state, user_id, entry_id(&id)?).await?;
    Ok(Json(entry.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> Result<Json<EntryResponse>, ApiError> {
    let id = entry_id(&id)?;
    let Json(body) = payload.map_err(|_| ApiError::InvalidRequest)?;
    let entry = services::update_entry(&state, user_id, id, body.into()).await?;
    Ok(Json(entry.into()))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    services::delete_entry(&state, user_id, entry_id(&id)?).await?;
    Ok(Json(DeletedResponse { success: true }))
}
