// API layer - route tables and handlers. Handlers only validate, apply
// the display-name default, dispatch to services and map missing
// entities to NotFound; status-code mapping lives in `AppError`.

pub mod dictionaries;
pub mod films;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(films::router())
        .merge(users::router())
        .merge(dictionaries::router())
        .with_state(state)
}
