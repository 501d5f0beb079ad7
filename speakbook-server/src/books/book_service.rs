//! Book domain operations: validation, draft/publish lifecycle, and the
//! wholesale hotspot replacement on update.

use chrono::Utc;
use speakbook_core::{
    book::{Book, BookDto, BookStatus},
    PageRequest, PageResponse, SpeakBookError,
};
use tracing::info;

use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
};

pub struct BookService<'a> {
    state: &'a AppState,
}

impl<'a> BookService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Required fields for publishing; drafts skip this entirely.
    fn validate(dto: &BookDto) -> Result<(), SpeakBookError> {
        if dto.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Err(SpeakBookError::Validation(
                "Book title must not be blank".to_string(),
            ));
        }
        if dto
            .cover_image_url
            .as_deref()
            .is_none_or(|u| u.trim().is_empty())
        {
            return Err(SpeakBookError::Validation(
                "Cover image URL must not be blank".to_string(),
            ));
        }
        if dto.category.as_deref().is_none_or(|c| c.trim().is_empty()) {
            return Err(SpeakBookError::Validation(
                "Category must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Create and publish a book. Status is forced to `published` and the
    /// publish time stamped to now, overwriting any caller value.
    pub async fn create_book(&self, mut dto: BookDto) -> AppResult<BookDto> {
        Self::validate(&dto)?;

        let now = Utc::now();
        dto.status = Some(BookStatus::Published);
        dto.published_at = Some(now);

        let mut book = dto.into_entity();
        book.created_at = now;
        book.updated_at = now;

        let id = self.state.db.backend().create_book(&book).await?;
        info!(book_id = id, title = %book.title, "book published");
        self.get_book(id).await
    }

    /// Persist a draft through the same path, without validation.
    pub async fn save_draft(&self, mut dto: BookDto) -> AppResult<BookDto> {
        let now = Utc::now();
        dto.status = Some(BookStatus::Draft);

        let mut book = dto.into_entity();
        book.created_at = now;
        book.updated_at = now;

        let id = self.state.db.backend().create_book(&book).await?;
        info!(book_id = id, "draft saved");
        self.get_book(id).await
    }

    pub async fn get_book(&self, id: i64) -> AppResult<BookDto> {
        let book = self
            .state
            .db
            .backend()
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::new(format!("Book not found, ID: {id}")))?;
        Ok(BookDto::from(&book))
    }

    /// Overwrite every scalar field from the transfer object and replace
    /// the hotspot collection wholesale. The existing publish time is kept
    /// unless the book is transitioning to published for the first time.
    pub async fn update_book(&self, id: i64, dto: BookDto) -> AppResult<BookDto> {
        let existing = self
            .state
            .db
            .backend()
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::new(format!("Book not found, ID: {id}")))?;

        let status = dto.status.unwrap_or(BookStatus::Draft);
        let published_at = if status == BookStatus::Published && existing.published_at.is_none() {
            Some(Utc::now())
        } else {
            existing.published_at
        };

        let book = Book {
            id,
            title: dto.title.unwrap_or_default(),
            author: dto.author,
            description: dto.description,
            category: dto.category,
            pages: dto.pages,
            target_age: dto.target_age,
            difficulty: dto.difficulty,
            cover_image_url: dto.cover_image_url,
            status,
            created_at: existing.created_at,
            updated_at: Utc::now(),
            published_at,
            hotspots: dto
                .hotspots
                .unwrap_or_default()
                .into_iter()
                .map(|h| h.into_entity(id))
                .collect(),
        };

        self.state.db.backend().update_book(&book).await?;
        info!(book_id = id, hotspots = book.hotspots.len(), "book updated");
        self.get_book(id).await
    }

    pub async fn list_published(&self) -> AppResult<Vec<BookDto>> {
        let books = self
            .state
            .db
            .backend()
            .list_books_by_status(BookStatus::Published)
            .await?;
        Ok(books.iter().map(BookDto::from).collect())
    }

    pub async fn list_by_category(&self, category: &str) -> AppResult<Vec<BookDto>> {
        let books = self
            .state
            .db
            .backend()
            .list_books_by_status_and_category(BookStatus::Published, category)
            .await?;
        Ok(books.iter().map(BookDto::from).collect())
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.state.db.backend().delete_book(id).await?;
        info!(book_id = id, "book deleted");
        Ok(())
    }

    pub async fn page_published(&self, page: PageRequest) -> AppResult<PageResponse<BookDto>> {
        let (books, total) = self.state.db.backend().page_published_books(&page).await?;
        let content = books.iter().map(BookDto::from).collect();
        Ok(PageResponse::new(content, &page, total))
    }
}
