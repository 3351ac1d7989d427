use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use tracing::info;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::validators::validate_user;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_all_users).post(create_user).put(update_user))
        .route("/users/{user_id}", get(get_user_by_id))
        .route(
            "/users/{user_id}/friends/{friend_id}",
            put(add_friend).delete(remove_friend),
        )
        .route("/users/{user_id}/friends", get(get_friends))
        .route(
            "/users/{user_id}/friends/common/{other_id}",
            get(get_mutual_friends),
        )
}

/// A blank display name falls back to the login before persistence.
fn apply_display_name_default(user: &mut User) {
    if user.name.trim().is_empty() {
        user.name = user.login.clone();
    }
}

async fn get_all_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.get_all().await?))
}

async fn get_user_by_id(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<User>> {
    match state.users.get_by_id(user_id).await? {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::NotFound(format!(
            "User with id {} not found",
            user_id
        ))),
    }
}

async fn create_user(
    State(state): State<AppState>,
    Json(mut user): Json<User>,
) -> AppResult<(StatusCode, Json<User>)> {
    info!("creating user {:?}", user.login);
    validate_user(&user)?;
    apply_display_name_default(&mut user);

    let created = state.users.create(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_user(
    State(state): State<AppState>,
    Json(mut user): Json<User>,
) -> AppResult<Json<User>> {
    info!("updating user {}", user.id);
    validate_user(&user)?;
    apply_display_name_default(&mut user);

    let user_id = user.id;
    match state.users.update(user).await? {
        Some(updated) => Ok(Json(updated)),
        None => Err(AppError::NotFound(format!(
            "User with id {} not found",
            user_id
        ))),
    }
}

async fn add_friend(
    State(state): State<AppState>,
    Path((user_id, friend_id)): Path<(i64, i64)>,
) -> AppResult<()> {
    info!("user {} adds friend {}", user_id, friend_id);
    state.users.add_friend(user_id, friend_id).await
}

async fn remove_friend(
    State(state): State<AppState>,
    Path((user_id, friend_id)): Path<(i64, i64)>,
) -> AppResult<()> {
    info!("user {} removes friend {}", user_id, friend_id);
    state.users.remove_friend(user_id, friend_id).await
}

async fn get_friends(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.friends_of(user_id).await?))
}

async fn get_mutual_friends(
    State(state): State<AppState>,
    Path((user_id, other_id)): Path<(i64, i64)>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.mutual_friends(user_id, other_id).await?))
}
