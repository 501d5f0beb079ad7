//! HTTP surface: route table and the shared middleware stack.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    audios::audio_handlers, books::book_handlers, infra::app_state::AppState,
    students::student_handlers, upload::upload_handlers,
};

/// The audio upload ceiling plus multipart overhead.
const MAX_BODY_BYTES: usize = 60 * 1024 * 1024;

/// Build the full application router.
///
/// Everything but the student endpoints lives under `/api`; the student
/// routes sit at the root for compatibility with the existing client.
pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    let mut router = Router::new()
        .nest("/api", api_routes())
        .route("/student", post(student_handlers::create_student_handler))
        .route("/student/{id}", get(student_handlers::get_student_handler));

    if let Some(dir) = static_dir {
        let index = dir.join("index.html");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Books
        .route("/books", post(book_handlers::create_book_handler))
        .route("/books", get(book_handlers::list_books_handler))
        .route("/books/draft", post(book_handlers::save_draft_handler))
        .route("/books/page", get(book_handlers::page_books_handler))
        .route("/books/{id}", get(book_handlers::get_book_handler))
        .route("/books/{id}", put(book_handlers::update_book_handler))
        .route("/books/{id}", delete(book_handlers::delete_book_handler))
        .route(
            "/books/category/{category}",
            get(book_handlers::list_books_by_category_handler),
        )
        // Audios
        .route("/audios", post(audio_handlers::create_audio_handler))
        .route("/audios", get(audio_handlers::list_audios_handler))
        .route("/audios/page", get(audio_handlers::page_audios_handler))
        .route(
            "/audios/upload",
            post(audio_handlers::upload_audio_asset_handler),
        )
        .route("/audios/{id}", get(audio_handlers::get_audio_handler))
        .route("/audios/{id}", put(audio_handlers::update_audio_handler))
        .route("/audios/{id}", delete(audio_handlers::delete_audio_handler))
        .route(
            "/audios/category/{category}",
            get(audio_handlers::list_audios_by_category_handler),
        )
        // Upload proxy
        .route("/upload/image", post(upload_handlers::upload_image_handler))
        .route("/upload/audio", post(upload_handlers::upload_audio_handler))
}
