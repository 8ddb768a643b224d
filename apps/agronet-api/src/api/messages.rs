use axum::Router;
use domain_messages::{MessageService, MongoMessageRepository, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoMessageRepository::new(&state.db);
    handlers::router(MessageService::new(repository))
}
