// Services - thin business rules over the storage traits: cross-entity
// existence checks, popularity ranking and friend-set operations.

pub mod dictionaries;
pub mod films;
pub mod users;

pub use dictionaries::{DictionaryService, GenreService, MpaService};
pub use films::FilmService;
pub use users::UserService;
