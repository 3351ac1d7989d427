// Storage layer - per-entity stores behind async traits, with an
// in-memory variant and a SQLite-backed variant.

pub mod db;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Film, User};

#[async_trait]
pub trait FilmStorage: Send + Sync {
    /// Fetch a film by id, or `None` when no such film exists.
    async fn get_by_id(&self, id: i64) -> Result<Option<Film>>;

    /// All stored films, ordered by id.
    async fn get_all(&self) -> Result<Vec<Film>>;

    /// Store a new film and assign it a unique id.
    async fn create(&self, film: Film) -> Result<Film>;

    /// Update the film resolved by `film.id`; `None` when the id is unknown.
    /// The stored like set is preserved across the update.
    async fn update(&self, film: Film) -> Result<Option<Film>>;

    /// Empty the store and reset id generation. Test/reset utility.
    async fn clear_all(&self) -> Result<()>;

    /// Record that `user_id` liked the film. Idempotent.
    async fn add_like(&self, film_id: i64, user_id: i64) -> Result<()>;

    /// Remove `user_id` from the film's like set. Absent likes are a no-op.
    async fn remove_like(&self, film_id: i64, user_id: i64) -> Result<()>;
}

#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Fetch a user by id, or `None` when no such user exists.
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Fetch the users whose ids appear in `ids`. Unknown ids are skipped.
    async fn get_by_id_list(&self, ids: &[i64]) -> Result<Vec<User>>;

    /// All stored users, ordered by id.
    async fn get_all(&self) -> Result<Vec<User>>;

    /// Store a new user and assign it a unique id.
    async fn create(&self, user: User) -> Result<User>;

    /// Update the user resolved by `user.id`; `None` when the id is unknown.
    /// The stored friend set is preserved across the update.
    async fn update(&self, user: User) -> Result<Option<User>>;

    /// Empty the store and reset id generation. Test/reset utility.
    async fn clear_all(&self) -> Result<()>;

    /// Record a one-directional friend link. Idempotent.
    async fn add_friend(&self, user_id: i64, friend_id: i64) -> Result<()>;

    /// Remove a one-directional friend link. Absent links are a no-op.
    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> Result<()>;
}

/// Read-only lookup tables (genres, MPA ratings). Rows are seeded at
/// schema initialization and never written through this interface.
#[async_trait]
pub trait DictionaryStorage<T>: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<T>>;
    async fn get_all(&self) -> Result<Vec<T>>;
}
