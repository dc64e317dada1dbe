use axum::{
    Json,
    extract::{OriginalUri, State},
    http::{HeaderName, StatusCode, header},
    response::IntoResponse,
};

use crate::{
    AppState,
    common::{JsonBody, ResourceId},
    error::AppError,
    middleware::{Authenticated, authorize_creation, authorize_mutation},
};

use super::Resource;

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Authenticated(caller): Authenticated,
    JsonBody(mut input): JsonBody<R::Input>,
) -> Result<impl IntoResponse, AppError> {
    authorize_creation(caller, R::claimed_author(&input))?;
    R::validate(&mut input)?;

    let record = R::save(&state.pool, input).await?;
    tracing::info!("{} {} created by {}", R::LABEL, R::id(&record), caller);

    let location = format!("{}/{}", uri.path().trim_end_matches('/'), R::id(&record));
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(record)))
}

pub async fn list<R: Resource>(
    State(state): State<AppState>,
) -> Result<Json<Vec<R::Record>>, AppError> {
    Ok(Json(R::find_all(&state.pool).await?))
}

pub async fn show<R: Resource>(
    ResourceId(id): ResourceId,
    State(state): State<AppState>,
) -> Result<Json<R::Record>, AppError> {
    R::find(&state.pool, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(R::LABEL))
}

pub async fn update<R: Resource>(
    ResourceId(id): ResourceId,
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    JsonBody(mut input): JsonBody<R::Input>,
) -> Result<Json<R::Record>, AppError> {
    let existing = R::find(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound(R::LABEL))?;
    authorize_mutation(caller, R::owner(&existing))?;
    // the body may not hand the resource over to another author
    authorize_mutation(caller, R::claimed_author(&input))?;

    R::validate(&mut input)?;

    R::update(&state.pool, id, input)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(R::LABEL))
}

pub async fn delete<R: Resource>(
    ResourceId(id): ResourceId,
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Result<impl IntoResponse, AppError> {
    let existing = R::find(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound(R::LABEL))?;
    authorize_mutation(caller, R::owner(&existing))?;

    if R::delete(&state.pool, id, caller).await? == 0 {
        return Err(AppError::NotFound(R::LABEL));
    }
    tracing::info!("{} {} deleted by {}", R::LABEL, id, caller);

    Ok((
        StatusCode::NO_CONTENT,
        [(HeaderName::from_static("entity"), id.to_string())],
    ))
}
