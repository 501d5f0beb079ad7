use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use speakbook_core::{
    book::BookDto, ApiResponse, PageRequest, PageResponse, SortDirection, SortSpec,
};

use super::BookService;
use crate::{errors::AppResult, infra::app_state::AppState};

/// Query parameters for `GET /api/books/page`.
///
/// Book listings are 1-based on the wire and carry the sort direction in
/// its own parameter, defaulting to descending when a sort field is given.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPageParams {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_page_size")]
    page_size: i64,
    sort_by: Option<String>,
    sort_direction: Option<String>,
    search_keyword: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

impl BookPageParams {
    fn into_page_request(self) -> PageRequest {
        let sort = self
            .sort_by
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|field| {
                let direction = match self.sort_direction.as_deref() {
                    Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Ascending,
                    _ => SortDirection::Descending,
                };
                SortSpec::new(field, direction)
            });
        PageRequest::new(self.page, self.page_size)
            .with_sort(sort)
            .with_keyword(self.search_keyword)
    }
}

/// `POST /api/books`
pub async fn create_book_handler(
    State(state): State<AppState>,
    Json(dto): Json<BookDto>,
) -> AppResult<Json<ApiResponse<BookDto>>> {
    let book = BookService::new(&state).create_book(dto).await?;
    Ok(Json(ApiResponse::success(book)))
}

/// `POST /api/books/draft`
pub async fn save_draft_handler(
    State(state): State<AppState>,
    Json(dto): Json<BookDto>,
) -> AppResult<Json<ApiResponse<BookDto>>> {
    let book = BookService::new(&state).save_draft(dto).await?;
    Ok(Json(ApiResponse::success(book)))
}

/// `PUT /api/books/{id}`
pub async fn update_book_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<BookDto>,
) -> AppResult<Json<ApiResponse<BookDto>>> {
    let book = BookService::new(&state).update_book(id, dto).await?;
    Ok(Json(ApiResponse::success(book)))
}

/// `GET /api/books/{id}`
pub async fn get_book_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<BookDto>>> {
    let book = BookService::new(&state).get_book(id).await?;
    Ok(Json(ApiResponse::success(book)))
}

/// `GET /api/books` — every published book.
pub async fn list_books_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<BookDto>>>> {
    let books = BookService::new(&state).list_published().await?;
    Ok(Json(ApiResponse::success(books)))
}

/// `GET /api/books/category/{category}` — published books in one category.
pub async fn list_books_by_category_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<BookDto>>>> {
    let books = BookService::new(&state).list_by_category(&category).await?;
    Ok(Json(ApiResponse::success(books)))
}

/// `DELETE /api/books/{id}`
pub async fn delete_book_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    BookService::new(&state).delete_book(id).await?;
    Ok(Json(ApiResponse::empty()))
}

/// `GET /api/books/page`
pub async fn page_books_handler(
    State(state): State<AppState>,
    Query(params): Query<BookPageParams>,
) -> AppResult<Json<ApiResponse<PageResponse<BookDto>>>> {
    let page = BookService::new(&state)
        .page_published(params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}
