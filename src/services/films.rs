use std::cmp::Reverse;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::Film;
use crate::storage::{FilmStorage, UserStorage};

/// How many films `popular` returns when the caller gives no usable count.
const DEFAULT_POPULAR_COUNT: usize = 10;

#[derive(Clone)]
pub struct FilmService {
    films: Arc<dyn FilmStorage>,
    users: Arc<dyn UserStorage>,
}

impl FilmService {
    pub fn new(films: Arc<dyn FilmStorage>, users: Arc<dyn UserStorage>) -> Self {
        Self { films, users }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Film>> {
        Ok(self.films.get_all().await?)
    }

    pub async fn get_by_id(&self, film_id: i64) -> AppResult<Option<Film>> {
        Ok(self.films.get_by_id(film_id).await?)
    }

    pub async fn create(&self, film: Film) -> AppResult<Film> {
        Ok(self.films.create(film).await?)
    }

    pub async fn update(&self, film: Film) -> AppResult<Option<Film>> {
        Ok(self.films.update(film).await?)
    }

    /// Record a like. Fails with NotFound unless both the film and the
    /// user resolve; adding an existing like changes nothing.
    pub async fn like(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        self.require_film(film_id).await?;
        self.require_user(user_id).await?;
        Ok(self.films.add_like(film_id, user_id).await?)
    }

    /// Withdraw a like. Same existence checks; removing an absent like
    /// is a no-op.
    pub async fn unlike(&self, film_id: i64, user_id: i64) -> AppResult<()> {
        self.require_film(film_id).await?;
        self.require_user(user_id).await?;
        Ok(self.films.remove_like(film_id, user_id).await?)
    }

    /// Top films by like count. A missing count or one below 1 falls back
    /// to the default; ties keep listing order (the sort is stable).
    pub async fn popular(&self, count: Option<i64>) -> AppResult<Vec<Film>> {
        let count = match count {
            Some(n) if n >= 1 => n as usize,
            _ => DEFAULT_POPULAR_COUNT,
        };

        let mut films = self.films.get_all().await?;
        films.sort_by_key(|f| Reverse(f.liked_user_ids.len()));
        films.truncate(count);
        Ok(films)
    }

    async fn require_film(&self, film_id: i64) -> AppResult<Film> {
        self.films
            .get_by_id(film_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Film with id {} not found", film_id)))
    }

    async fn require_user(&self, user_id: i64) -> AppResult<()> {
        self.users
            .get_by_id(user_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
    }
}
