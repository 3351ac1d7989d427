use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use tracing::info;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::Film;
use crate::validators::validate_film;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/films", get(get_all_films).post(create_film).put(update_film))
        .route("/films/popular", get(get_popular_films))
        .route("/films/{film_id}", get(get_film_by_id))
        .route(
            "/films/{film_id}/like/{user_id}",
            put(add_like).delete(remove_like),
        )
}

async fn get_all_films(State(state): State<AppState>) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.films.get_all().await?))
}

async fn get_film_by_id(
    State(state): State<AppState>,
    Path(film_id): Path<i64>,
) -> AppResult<Json<Film>> {
    match state.films.get_by_id(film_id).await? {
        Some(film) => Ok(Json(film)),
        None => Err(AppError::NotFound(format!(
            "Film with id {} not found",
            film_id
        ))),
    }
}

async fn create_film(
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> AppResult<(StatusCode, Json<Film>)> {
    info!("creating film {:?}", film.name);
    validate_film(&film)?;

    let created = state.films.create(film).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_film(
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> AppResult<Json<Film>> {
    info!("updating film {}", film.id);
    validate_film(&film)?;

    let film_id = film.id;
    match state.films.update(film).await? {
        Some(updated) => Ok(Json(updated)),
        None => Err(AppError::NotFound(format!(
            "Film with id {} not found",
            film_id
        ))),
    }
}

async fn add_like(
    State(state): State<AppState>,
    Path((film_id, user_id)): Path<(i64, i64)>,
) -> AppResult<()> {
    info!("user {} likes film {}", user_id, film_id);
    state.films.like(film_id, user_id).await
}

async fn remove_like(
    State(state): State<AppState>,
    Path((film_id, user_id)): Path<(i64, i64)>,
) -> AppResult<()> {
    info!("user {} unlikes film {}", user_id, film_id);
    state.films.unlike(film_id, user_id).await
}

#[derive(Deserialize)]
struct PopularParams {
    count: Option<i64>,
}

async fn get_popular_films(
    State(state): State<AppState>,
    Query(params): Query<PopularParams>,
) -> AppResult<Json<Vec<Film>>> {
    Ok(Json(state.films.popular(params.count).await?))
}
