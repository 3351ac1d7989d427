use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{Genre, MpaRating};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/genres", get(get_all_genres))
        .route("/genres/{genre_id}", get(get_genre_by_id))
        .route("/mpa", get(get_all_ratings))
        .route("/mpa/{rating_id}", get(get_rating_by_id))
}

async fn get_all_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.genres.get_all().await?))
}

async fn get_genre_by_id(
    State(state): State<AppState>,
    Path(genre_id): Path<i64>,
) -> AppResult<Json<Genre>> {
    match state.genres.get_by_id(genre_id).await? {
        Some(genre) => Ok(Json(genre)),
        None => Err(AppError::NotFound(format!(
            "Genre with id {} not found",
            genre_id
        ))),
    }
}

async fn get_all_ratings(State(state): State<AppState>) -> AppResult<Json<Vec<MpaRating>>> {
    Ok(Json(state.mpa.get_all().await?))
}

async fn get_rating_by_id(
    State(state): State<AppState>,
    Path(rating_id): Path<i64>,
) -> AppResult<Json<MpaRating>> {
    match state.mpa.get_by_id(rating_id).await? {
        Some(rating) => Ok(Json(rating)),
        None => Err(AppError::NotFound(format!(
            "MPA rating with id {} not found",
            rating_id
        ))),
    }
}
