use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{DictionaryStorage, FilmStorage, UserStorage};
use crate::models::{Film, Genre, MpaRating, User};

/// Create the schema and seed the lookup tables. Idempotent.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS mpa_ratings (
            mpa_rating_id INTEGER PRIMARY KEY,
            mpa_rating_name TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS genres (
            genre_id INTEGER PRIMARY KEY,
            genre_name TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS films (
            film_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            release_date TEXT NOT NULL,
            duration INTEGER NOT NULL,
            mpa_rating_id INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL,
            login TEXT NOT NULL,
            name TEXT NOT NULL,
            birthday TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS film_genres (
            film_id INTEGER NOT NULL,
            genre_id INTEGER NOT NULL,
            PRIMARY KEY (film_id, genre_id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS film_likes (
            film_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            PRIMARY KEY (film_id, user_id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS user_friends (
            user_id INTEGER NOT NULL,
            friend_id INTEGER NOT NULL,
            PRIMARY KEY (user_id, friend_id)
        )",
    )
    .execute(pool)
    .await?;

    seed_dictionaries(pool).await
}

async fn seed_dictionaries(pool: &SqlitePool) -> Result<()> {
    let ratings = [(1, "G"), (2, "PG"), (3, "PG-13"), (4, "R"), (5, "NC-17")];
    for (id, name) in ratings {
        sqlx::query(
            "INSERT OR IGNORE INTO mpa_ratings (mpa_rating_id, mpa_rating_name) VALUES (?, ?)",
        )
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    }

    let genres = [
        (1, "Comedy"),
        (2, "Drama"),
        (3, "Cartoon"),
        (4, "Thriller"),
        (5, "Documentary"),
        (6, "Action"),
    ];
    for (id, name) in genres {
        sqlx::query("INSERT OR IGNORE INTO genres (genre_id, genre_name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// "?, ?, ..., ?" for a bound `IN` list of `n` ids.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

// Association hydration: the primary rows are fetched first, then one
// follow-up query per association kind fetches all rows for the whole
// batch of ids, and the rows are distributed into their owning entities.

async fn load_genres(pool: &SqlitePool, films: &mut [Film]) -> Result<()> {
    if films.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = films.iter().map(|f| f.id).collect();
    let sql = format!(
        "SELECT fg.film_id, fg.genre_id, g.genre_name \
         FROM film_genres AS fg LEFT JOIN genres AS g ON fg.genre_id = g.genre_id \
         WHERE fg.film_id IN ({}) ORDER BY fg.rowid",
        placeholders(ids.len())
    );

    let mut query = sqlx::query(&sql);
    for id in &ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;

    let mut by_id: HashMap<i64, &mut Film> = films.iter_mut().map(|f| (f.id, f)).collect();
    for row in rows {
        if let Some(film) = by_id.get_mut(&row.get::<i64, _>("film_id")) {
            film.genres.push(Genre {
                id: row.get("genre_id"),
                name: row
                    .get::<Option<String>, _>("genre_name")
                    .unwrap_or_default(),
            });
        }
    }

    Ok(())
}

async fn load_likes(pool: &SqlitePool, films: &mut [Film]) -> Result<()> {
    if films.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = films.iter().map(|f| f.id).collect();
    let sql = format!(
        "SELECT film_id, user_id FROM film_likes WHERE film_id IN ({})",
        placeholders(ids.len())
    );

    let mut query = sqlx::query(&sql);
    for id in &ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;

    let mut by_id: HashMap<i64, &mut Film> = films.iter_mut().map(|f| (f.id, f)).collect();
    for row in rows {
        if let Some(film) = by_id.get_mut(&row.get::<i64, _>("film_id")) {
            film.liked_user_ids.insert(row.get("user_id"));
        }
    }

    Ok(())
}

async fn load_friends(pool: &SqlitePool, users: &mut [User]) -> Result<()> {
    if users.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
    let sql = format!(
        "SELECT user_id, friend_id FROM user_friends WHERE user_id IN ({})",
        placeholders(ids.len())
    );

    let mut query = sqlx::query(&sql);
    for id in &ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;

    let mut by_id: HashMap<i64, &mut User> = users.iter_mut().map(|u| (u.id, u)).collect();
    for row in rows {
        if let Some(user) = by_id.get_mut(&row.get::<i64, _>("user_id")) {
            user.friend_ids.insert(row.get("friend_id"));
        }
    }

    Ok(())
}

pub struct DbFilmStorage {
    pool: SqlitePool,
}

impl DbFilmStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn film_from_row(row: &SqliteRow) -> Film {
        Film {
            id: row.get("film_id"),
            name: row.get("name"),
            description: row.get("description"),
            release_date: Some(row.get("release_date")),
            duration: Some(row.get("duration")),
            mpa: Some(MpaRating {
                id: row.get("mpa_rating_id"),
                name: row
                    .get::<Option<String>, _>("mpa_rating_name")
                    .unwrap_or_default(),
            }),
            genres: Vec::new(),
            liked_user_ids: HashSet::new(),
        }
    }

    async fn fetch_films(&self, sql: &str, id: Option<i64>) -> Result<Vec<Film>> {
        let mut query = sqlx::query(sql);
        if let Some(id) = id {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut films: Vec<Film> = rows.iter().map(Self::film_from_row).collect();
        load_genres(&self.pool, &mut films).await?;
        load_likes(&self.pool, &mut films).await?;
        Ok(films)
    }

    /// Current genre-id set of a stored film, for the update diff.
    async fn stored_genre_ids(&self, film_id: i64) -> Result<HashSet<i64>> {
        let rows = sqlx::query("SELECT genre_id FROM film_genres WHERE film_id = ?")
            .bind(film_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|row| row.get("genre_id")).collect())
    }

    async fn insert_genre_links(&self, film_id: i64, genres: &[Genre]) -> Result<()> {
        for genre in genres {
            sqlx::query("INSERT OR IGNORE INTO film_genres (film_id, genre_id) VALUES (?, ?)")
                .bind(film_id)
                .bind(genre.id)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    /// Rewrite the film's genre links only when the new id set differs
    /// from what is stored; order and duplicate count are ignored by the
    /// comparison, and the insert keeps first-seen order.
    async fn update_genre_links(&self, film: &Film, is_new_record: bool) -> Result<()> {
        let mut need_insert = is_new_record;

        if !is_new_record {
            let stored: HashSet<i64> = self.stored_genre_ids(film.id).await?;
            let incoming: HashSet<i64> = film.genres.iter().map(|g| g.id).collect();

            if stored != incoming {
                sqlx::query("DELETE FROM film_genres WHERE film_id = ?")
                    .bind(film.id)
                    .execute(&self.pool)
                    .await?;
                need_insert = true;
            }
        }

        if need_insert {
            self.insert_genre_links(film.id, &film.genres).await?;
        }
        Ok(())
    }
}

const FILM_SELECT: &str = "SELECT f.film_id, f.name, f.description, f.release_date, f.duration, \
     f.mpa_rating_id, mpa.mpa_rating_name \
     FROM films AS f LEFT JOIN mpa_ratings AS mpa ON f.mpa_rating_id = mpa.mpa_rating_id";

#[async_trait]
impl FilmStorage for DbFilmStorage {
    async fn get_by_id(&self, id: i64) -> Result<Option<Film>> {
        let sql = format!("{} WHERE f.film_id = ?", FILM_SELECT);
        let films = self.fetch_films(&sql, Some(id)).await?;
        Ok(films.into_iter().next())
    }

    async fn get_all(&self) -> Result<Vec<Film>> {
        let sql = format!("{} ORDER BY f.film_id", FILM_SELECT);
        self.fetch_films(&sql, None).await
    }

    async fn create(&self, mut film: Film) -> Result<Film> {
        film.dedup_genres();
        let mpa_id = film
            .mpa
            .as_ref()
            .map(|m| m.id)
            .ok_or_else(|| anyhow::anyhow!("film has no MPA rating"))?;

        let result = sqlx::query(
            "INSERT INTO films (name, description, release_date, duration, mpa_rating_id) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(mpa_id)
        .execute(&self.pool)
        .await?;

        film.id = result.last_insert_rowid();
        self.update_genre_links(&film, true).await?;

        // Re-read so the returned film carries hydrated genre and MPA names.
        self.get_by_id(film.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("film {} missing after insert", film.id))
    }

    async fn update(&self, mut film: Film) -> Result<Option<Film>> {
        if self.get_by_id(film.id).await?.is_none() {
            return Ok(None);
        }

        film.dedup_genres();
        let mpa_id = film
            .mpa
            .as_ref()
            .map(|m| m.id)
            .ok_or_else(|| anyhow::anyhow!("film has no MPA rating"))?;

        sqlx::query(
            "UPDATE films SET name = ?, description = ?, release_date = ?, duration = ?, \
             mpa_rating_id = ? WHERE film_id = ?",
        )
        .bind(&film.name)
        .bind(&film.description)
        .bind(film.release_date)
        .bind(film.duration)
        .bind(mpa_id)
        .bind(film.id)
        .execute(&self.pool)
        .await?;

        self.update_genre_links(&film, false).await?;

        self.get_by_id(film.id).await
    }

    async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM film_likes").execute(&self.pool).await?;
        sqlx::query("DELETE FROM film_genres").execute(&self.pool).await?;
        sqlx::query("DELETE FROM films").execute(&self.pool).await?;
        // Restart id generation; the sequence table only exists after the
        // first AUTOINCREMENT insert.
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'films'")
            .execute(&self.pool)
            .await
            .ok();
        Ok(())
    }

    async fn add_like(&self, film_id: i64, user_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO film_likes (film_id, user_id) VALUES (?, ?)")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM film_likes WHERE film_id = ? AND user_id = ?")
            .bind(film_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct DbUserStorage {
    pool: SqlitePool,
}

impl DbUserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn user_from_row(row: &SqliteRow) -> User {
        User {
            id: row.get("user_id"),
            email: row.get("email"),
            login: row.get("login"),
            name: row.get("name"),
            birthday: Some(row.get("birthday")),
            friend_ids: HashSet::new(),
        }
    }
}

#[async_trait]
impl UserStorage for DbUserStorage {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let rows = sqlx::query("SELECT * FROM users WHERE user_id = ?")
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        let mut users: Vec<User> = rows.iter().map(Self::user_from_row).collect();
        load_friends(&self.pool, &mut users).await?;
        Ok(users.into_iter().next())
    }

    async fn get_by_id_list(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT * FROM users WHERE user_id IN ({}) ORDER BY user_id",
            placeholders(ids.len())
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut users: Vec<User> = rows.iter().map(Self::user_from_row).collect();
        load_friends(&self.pool, &mut users).await?;
        Ok(users)
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY user_id")
            .fetch_all(&self.pool)
            .await?;

        let mut users: Vec<User> = rows.iter().map(Self::user_from_row).collect();
        load_friends(&self.pool, &mut users).await?;
        Ok(users)
    }

    async fn create(&self, mut user: User) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (email, login, name, birthday) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .execute(&self.pool)
        .await?;

        user.id = result.last_insert_rowid();
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<Option<User>> {
        if self.get_by_id(user.id).await?.is_none() {
            return Ok(None);
        }

        sqlx::query(
            "UPDATE users SET email = ?, login = ?, name = ?, birthday = ? WHERE user_id = ?",
        )
        .bind(&user.email)
        .bind(&user.login)
        .bind(&user.name)
        .bind(user.birthday)
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        // Re-read so the returned user carries the stored friend set.
        self.get_by_id(user.id).await
    }

    async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM user_friends").execute(&self.pool).await?;
        sqlx::query("DELETE FROM film_likes").execute(&self.pool).await?;
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'users'")
            .execute(&self.pool)
            .await
            .ok();
        Ok(())
    }

    async fn add_friend(&self, user_id: i64, friend_id: i64) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO user_friends (user_id, friend_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM user_friends WHERE user_id = ? AND friend_id = ?")
            .bind(user_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct DbGenreStorage {
    pool: SqlitePool,
}

impl DbGenreStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn genre_from_row(row: &SqliteRow) -> Genre {
        Genre {
            id: row.get("genre_id"),
            name: row.get("genre_name"),
        }
    }
}

#[async_trait]
impl DictionaryStorage<Genre> for DbGenreStorage {
    async fn get_by_id(&self, id: i64) -> Result<Option<Genre>> {
        let row = sqlx::query("SELECT * FROM genres WHERE genre_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::genre_from_row))
    }

    async fn get_all(&self) -> Result<Vec<Genre>> {
        let rows = sqlx::query("SELECT * FROM genres ORDER BY genre_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(Self::genre_from_row).collect())
    }
}

pub struct DbMpaStorage {
    pool: SqlitePool,
}

impl DbMpaStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn rating_from_row(row: &SqliteRow) -> MpaRating {
        MpaRating {
            id: row.get("mpa_rating_id"),
            name: row.get("mpa_rating_name"),
        }
    }
}

#[async_trait]
impl DictionaryStorage<MpaRating> for DbMpaStorage {
    async fn get_by_id(&self, id: i64) -> Result<Option<MpaRating>> {
        let row = sqlx::query("SELECT * FROM mpa_ratings WHERE mpa_rating_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::rating_from_row))
    }

    async fn get_all(&self) -> Result<Vec<MpaRating>> {
        let rows = sqlx::query("SELECT * FROM mpa_ratings ORDER BY mpa_rating_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(Self::rating_from_row).collect())
    }
}
