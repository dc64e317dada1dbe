use axum::{
    Json,
    extract::State,
    http::{HeaderName, StatusCode, header},
    response::IntoResponse,
};

use crate::{
    AppState,
    common::{JsonBody, ResourceId},
    error::AppError,
    middleware::{Authenticated, authorize_mutation},
    utils::Identity,
};

use super::model::{LoginResponse, User, UserAction, UserRequest};

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(mut req): JsonBody<UserRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.prepare();
    req.validate(UserAction::Create)?;

    let user = User::create(&state.pool, &req).await?;
    let location = format!("/users/{}", user.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(user)))
}

#[axum::debug_handler]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(User::find_all(&state.pool).await?))
}

#[axum::debug_handler]
pub async fn get_user(
    ResourceId(id): ResourceId,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    User::find_by_id(&state.pool, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("User"))
}

#[axum::debug_handler]
pub async fn update_user(
    ResourceId(id): ResourceId,
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    JsonBody(mut req): JsonBody<UserRequest>,
) -> Result<Json<User>, AppError> {
    authorize_mutation(caller, Identity(id))?;

    req.prepare();
    req.validate(UserAction::Update)?;

    User::update(&state.pool, id, &req)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("User"))
}

#[axum::debug_handler]
pub async fn delete_user(
    ResourceId(id): ResourceId,
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Result<impl IntoResponse, AppError> {
    authorize_mutation(caller, Identity(id))?;

    if User::delete(&state.pool, id).await? == 0 {
        return Err(AppError::NotFound("User"));
    }
    tracing::info!("Deleted user {}", id);

    Ok((
        StatusCode::NO_CONTENT,
        [(HeaderName::from_static("entity"), id.to_string())],
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(mut req): JsonBody<UserRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    req.prepare();
    req.validate(UserAction::Login)?;

    let user = User::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or(AppError::InvalidCredentials("Incorrect details"))?;

    match user.verify_login(&req.password) {
        Ok(true) => (),
        Ok(false) => return Err(AppError::InvalidCredentials("Incorrect password")),
        Err(e) => {
            tracing::error!("Stored password hash for user {} is unusable", user.id);
            return Err(e.into());
        }
    }

    let token = state.tokens.issue(Identity(user.id))?;
    tracing::info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        user_id: user.id,
        token,
    }))
}
