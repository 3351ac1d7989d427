use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{FilmStorage, UserStorage};
use crate::models::{Film, User};

// Both stores guard their map and id counter with a single mutex so that
// concurrent create/update calls cannot interleave id assignment.

#[derive(Default)]
struct FilmStore {
    films: HashMap<i64, Film>,
    next_id: i64,
}

pub struct InMemoryFilmStorage {
    inner: Mutex<FilmStore>,
}

impl InMemoryFilmStorage {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FilmStore::default()),
        }
    }
}

impl Default for InMemoryFilmStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FilmStorage for InMemoryFilmStorage {
    async fn get_by_id(&self, id: i64) -> Result<Option<Film>> {
        let store = self.inner.lock().await;
        Ok(store.films.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Film>> {
        let store = self.inner.lock().await;
        let mut films: Vec<Film> = store.films.values().cloned().collect();
        films.sort_by_key(|f| f.id);
        Ok(films)
    }

    async fn create(&self, mut film: Film) -> Result<Film> {
        film.dedup_genres();

        let mut store = self.inner.lock().await;
        store.next_id += 1;
        film.id = store.next_id;
        store.films.insert(film.id, film.clone());
        Ok(film)
    }

    async fn update(&self, mut film: Film) -> Result<Option<Film>> {
        film.dedup_genres();

        let mut store = self.inner.lock().await;
        match store.films.get(&film.id) {
            Some(existing) => {
                // The incoming payload never carries likes; keep the stored set.
                film.liked_user_ids = existing.liked_user_ids.clone();
                store.films.insert(film.id, film.clone());
                Ok(Some(film))
            }
            None => Ok(None),
        }
    }

    async fn clear_all(&self) -> Result<()> {
        let mut store = self.inner.lock().await;
        store.films.clear();
        store.next_id = 0;
        Ok(())
    }

    async fn add_like(&self, film_id: i64, user_id: i64) -> Result<()> {
        let mut store = self.inner.lock().await;
        if let Some(film) = store.films.get_mut(&film_id) {
            film.liked_user_ids.insert(user_id);
        }
        Ok(())
    }

    async fn remove_like(&self, film_id: i64, user_id: i64) -> Result<()> {
        let mut store = self.inner.lock().await;
        if let Some(film) = store.films.get_mut(&film_id) {
            film.liked_user_ids.remove(&user_id);
        }
        Ok(())
    }
}

#[derive(Default)]
struct UserStore {
    users: HashMap<i64, User>,
    next_id: i64,
}

pub struct InMemoryUserStorage {
    inner: Mutex<UserStore>,
}

impl InMemoryUserStorage {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(UserStore::default()),
        }
    }
}

impl Default for InMemoryUserStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let store = self.inner.lock().await;
        Ok(store.users.get(&id).cloned())
    }

    async fn get_by_id_list(&self, ids: &[i64]) -> Result<Vec<User>> {
        let store = self.inner.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| store.users.get(id).cloned())
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<User>> {
        let store = self.inner.lock().await;
        let mut users: Vec<User> = store.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn create(&self, mut user: User) -> Result<User> {
        let mut store = self.inner.lock().await;
        store.next_id += 1;
        user.id = store.next_id;
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, mut user: User) -> Result<Option<User>> {
        let mut store = self.inner.lock().await;
        match store.users.get(&user.id) {
            Some(existing) => {
                // The incoming payload never carries friends; keep the stored set.
                user.friend_ids = existing.friend_ids.clone();
                store.users.insert(user.id, user.clone());
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn clear_all(&self) -> Result<()> {
        let mut store = self.inner.lock().await;
        store.users.clear();
        store.next_id = 0;
        Ok(())
    }

    async fn add_friend(&self, user_id: i64, friend_id: i64) -> Result<()> {
        let mut store = self.inner.lock().await;
        if let Some(user) = store.users.get_mut(&user_id) {
            user.friend_ids.insert(friend_id);
        }
        Ok(())
    }

    async fn remove_friend(&self, user_id: i64, friend_id: i64) -> Result<()> {
        let mut store = self.inner.lock().await;
        if let Some(user) = store.users.get_mut(&user_id) {
            user.friend_ids.remove(&friend_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Genre;
    use chrono::NaiveDate;

    fn film(name: &str) -> Film {
        Film {
            name: name.to_string(),
            release_date: NaiveDate::from_ymd_opt(2000, 1, 1),
            duration: Some(90),
            ..Film::default()
        }
    }

    fn user(login: &str) -> User {
        User {
            email: format!("{}@example.com", login),
            login: login.to_string(),
            name: login.to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 6, 15),
            ..User::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_round_trips() {
        let storage = InMemoryFilmStorage::new();
        let first = storage.create(film("one")).await.unwrap();
        let second = storage.create(film("two")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let fetched = storage.get_by_id(1).await.unwrap().unwrap();
        assert_eq!(fetched, first);
    }

    #[tokio::test]
    async fn update_of_unknown_id_returns_none() {
        let storage = InMemoryFilmStorage::new();
        let mut missing = film("ghost");
        missing.id = 99;
        assert!(storage.update(missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_preserves_like_set() {
        let storage = InMemoryFilmStorage::new();
        let created = storage.create(film("liked")).await.unwrap();
        storage.add_like(created.id, 7).await.unwrap();

        let mut incoming = film("liked, renamed");
        incoming.id = created.id;
        let updated = storage.update(incoming).await.unwrap().unwrap();
        assert!(updated.liked_user_ids.contains(&7));
    }

    #[tokio::test]
    async fn likes_are_idempotent_and_removal_of_absent_like_is_a_noop() {
        let storage = InMemoryFilmStorage::new();
        let created = storage.create(film("f")).await.unwrap();

        storage.add_like(created.id, 3).await.unwrap();
        storage.add_like(created.id, 3).await.unwrap();
        let fetched = storage.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.liked_user_ids.len(), 1);

        storage.remove_like(created.id, 42).await.unwrap();
        storage.remove_like(created.id, 3).await.unwrap();
        let fetched = storage.get_by_id(created.id).await.unwrap().unwrap();
        assert!(fetched.liked_user_ids.is_empty());
    }

    #[tokio::test]
    async fn genre_lists_are_deduplicated_on_create() {
        let storage = InMemoryFilmStorage::new();
        let mut f = film("dup genres");
        f.genres = vec![
            Genre { id: 2, name: String::new() },
            Genre { id: 1, name: String::new() },
            Genre { id: 2, name: String::new() },
        ];
        let created = storage.create(f).await.unwrap();
        let ids: Vec<i64> = created.genres.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn clear_all_resets_the_id_counter() {
        let storage = InMemoryFilmStorage::new();
        storage.create(film("a")).await.unwrap();
        storage.create(film("b")).await.unwrap();
        storage.clear_all().await.unwrap();

        assert!(storage.get_all().await.unwrap().is_empty());
        let fresh = storage.create(film("c")).await.unwrap();
        assert_eq!(fresh.id, 1);
    }

    #[tokio::test]
    async fn user_update_preserves_friend_set() {
        let storage = InMemoryUserStorage::new();
        let created = storage.create(user("ann")).await.unwrap();
        storage.add_friend(created.id, 5).await.unwrap();

        let mut incoming = user("ann");
        incoming.id = created.id;
        incoming.name = "Ann".to_string();
        let updated = storage.update(incoming).await.unwrap().unwrap();
        assert!(updated.friend_ids.contains(&5));
    }

    #[tokio::test]
    async fn get_by_id_list_skips_unknown_ids() {
        let storage = InMemoryUserStorage::new();
        let a = storage.create(user("a")).await.unwrap();
        let b = storage.create(user("b")).await.unwrap();

        let found = storage.get_by_id_list(&[a.id, 999, b.id]).await.unwrap();
        let ids: Vec<i64> = found.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }
}
