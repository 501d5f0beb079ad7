use crate::{
    audio::Audio,
    book::{Book, BookStatus},
    pagination::PageRequest,
    student::Student,
    Result,
};
use async_trait::async_trait;

/// Storage contract for every entity kind.
///
/// `get_*` return `Ok(None)` for unknown ids; callers turn that into the
/// domain-level not-found condition. `update_*` and `delete_*` return
/// `NotFound` themselves since they must check existence anyway. Writes
/// that touch multiple rows (a book together with its hotspots) are atomic
/// within a single call.
#[async_trait]
pub trait DatabaseBackend: Send + Sync {
    // Books
    async fn create_book(&self, book: &Book) -> Result<i64>;
    async fn get_book(&self, id: i64) -> Result<Option<Book>>;
    async fn list_books_by_status(&self, status: BookStatus) -> Result<Vec<Book>>;
    async fn list_books_by_status_and_category(
        &self,
        status: BookStatus,
        category: &str,
    ) -> Result<Vec<Book>>;
    /// Overwrites every scalar field and replaces the hotspot collection
    /// wholesale (delete then bulk insert, never a merge).
    async fn update_book(&self, book: &Book) -> Result<()>;
    /// Deletes the book and cascades to its hotspots.
    async fn delete_book(&self, id: i64) -> Result<()>;
    /// Paged listing of published books; the optional keyword is a
    /// case-insensitive substring match over title, author, and
    /// description, ANDed with the published-status filter.
    async fn page_published_books(&self, page: &PageRequest) -> Result<(Vec<Book>, u64)>;

    // Audios
    async fn create_audio(&self, audio: &Audio) -> Result<i64>;
    async fn get_audio(&self, id: i64) -> Result<Option<Audio>>;
    async fn list_audios(&self) -> Result<Vec<Audio>>;
    async fn list_audios_by_category(&self, category: &str) -> Result<Vec<Audio>>;
    async fn update_audio(&self, audio: &Audio) -> Result<()>;
    async fn delete_audio(&self, id: i64) -> Result<()>;
    /// Paged listing of audios; the optional keyword matches name and
    /// category.
    async fn page_audios(&self, page: &PageRequest) -> Result<(Vec<Audio>, u64)>;

    // Students
    async fn create_student(&self, student: &Student) -> Result<i64>;
    async fn get_student(&self, id: i64) -> Result<Option<Student>>;
    /// Case-sensitive exact match on the email column.
    async fn find_students_by_email(&self, email: &str) -> Result<Vec<Student>>;
}
