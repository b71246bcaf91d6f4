use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, BooksState};

/// Routes relative to the module mount point (`/api/books`).
///
/// Static segments take precedence over `/{id}`, so `/search` and `/bulk`
/// are never captured as ids.
pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(handlers::list_books).post(handlers::create_book))
        .route("/bulk", post(handlers::bulk_operation))
        .route("/search", get(handlers::search_books))
        .route(
            "/{id}",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .with_state(state)
}
