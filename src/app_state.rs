use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    config::{Config, StorageBackend},
    services::{FilmService, GenreService, MpaService, UserService},
    storage::{
        db::{init_schema, DbFilmStorage, DbGenreStorage, DbMpaStorage, DbUserStorage},
        memory::{InMemoryFilmStorage, InMemoryUserStorage},
        FilmStorage, UserStorage,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub films: FilmService,
    pub users: UserService,
    pub genres: GenreService,
    pub mpa: MpaService,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(&config.database.url).await?;
        init_schema(&pool).await?;
        Ok(Self::with_pool(pool, config))
    }

    /// Assemble services over an already-initialized pool.
    pub fn with_pool(pool: SqlitePool, config: Config) -> Self {
        let (films, users): (Arc<dyn FilmStorage>, Arc<dyn UserStorage>) =
            match config.storage.backend {
                StorageBackend::Sqlite => (
                    Arc::new(DbFilmStorage::new(pool.clone())),
                    Arc::new(DbUserStorage::new(pool.clone())),
                ),
                StorageBackend::Memory => (
                    Arc::new(InMemoryFilmStorage::new()),
                    Arc::new(InMemoryUserStorage::new()),
                ),
            };

        Self {
            films: FilmService::new(films, users.clone()),
            users: UserService::new(users),
            genres: GenreService::new(Arc::new(DbGenreStorage::new(pool.clone()))),
            mpa: MpaService::new(Arc::new(DbMpaStorage::new(pool))),
            config,
        }
    }
}
