use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{Genre, MpaRating};
use crate::storage::DictionaryStorage;

/// Read-only access to a lookup table.
pub struct DictionaryService<T> {
    storage: Arc<dyn DictionaryStorage<T>>,
}

// Manual impl: derive(Clone) would add a `T: Clone` bound.
impl<T> Clone for DictionaryService<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
        }
    }
}

impl<T> DictionaryService<T> {
    pub fn new(storage: Arc<dyn DictionaryStorage<T>>) -> Self {
        Self { storage }
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<T>> {
        Ok(self.storage.get_by_id(id).await?)
    }

    pub async fn get_all(&self) -> AppResult<Vec<T>> {
        Ok(self.storage.get_all().await?)
    }
}

pub type GenreService = DictionaryService<Genre>;
pub type MpaService = DictionaryService<MpaRating>;
