//! PostgreSQL storage backend.
//!
//! Queries are built at runtime; sort columns are resolved through the
//! whitelist in [`super`] before they ever reach SQL text.

use async_trait::async_trait;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    PgPool, Row,
};
use tracing::info;

use super::{audio_sort_column, book_sort_column, traits::DatabaseBackend};
use crate::{
    audio::Audio,
    book::{Book, BookStatus, Hotspot},
    error::SpeakBookError,
    pagination::{PageRequest, SortDirection},
    student::Student,
    Result,
};

const BOOK_COLUMNS: &str = "id, title, author, description, category, pages, target_age, \
     difficulty, cover_image_url, status, created_at, updated_at, published_at";

const AUDIO_COLUMNS: &str = "id, name, url, duration, file_size, category, created_at";

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub async fn new(connection_string: &str) -> Result<Self> {
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(connection_string)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| SpeakBookError::Database(e.to_string()))?;

        info!(max_connections, "connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn book_from_row(row: &PgRow) -> Result<Book> {
        let status: String = row.try_get("status")?;
        Ok(Book {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            pages: row.try_get("pages")?,
            target_age: row.try_get("target_age")?,
            difficulty: row.try_get("difficulty")?,
            cover_image_url: row.try_get("cover_image_url")?,
            status: BookStatus::parse(&status),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            published_at: row.try_get("published_at")?,
            hotspots: Vec::new(),
        })
    }

    fn hotspot_from_row(row: &PgRow) -> Result<Hotspot> {
        Ok(Hotspot {
            id: row.try_get("id")?,
            book_id: row.try_get("book_id")?,
            label: row.try_get("label")?,
            x: row.try_get("x")?,
            y: row.try_get("y")?,
            width: row.try_get("width")?,
            height: row.try_get("height")?,
            audio_url: row.try_get("audio_url")?,
            sort_order: row.try_get("sort_order")?,
        })
    }

    fn audio_from_row(row: &PgRow) -> Result<Audio> {
        Ok(Audio {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            url: row.try_get("url")?,
            duration: row.try_get("duration")?,
            file_size: row.try_get("file_size")?,
            category: row.try_get("category")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn student_from_row(row: &PgRow) -> Result<Student> {
        Ok(Student {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
        })
    }

    /// Load the hotspot collections for a batch of books in one query,
    /// preserving insertion order within each book.
    async fn attach_hotspots(&self, books: &mut [Book]) -> Result<()> {
        if books.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = books.iter().map(|b| b.id).collect();
        let rows = sqlx::query(
            "SELECT id, book_id, label, x, y, width, height, audio_url, sort_order \
             FROM hotspots WHERE book_id = ANY($1) ORDER BY id",
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await?;

        for row in &rows {
            let hotspot = Self::hotspot_from_row(row)?;
            if let Some(book) = books.iter_mut().find(|b| b.id == hotspot.book_id) {
                book.hotspots.push(hotspot);
            }
        }
        Ok(())
    }

    async fn insert_hotspots(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        book_id: i64,
        hotspots: &[Hotspot],
    ) -> Result<()> {
        for hotspot in hotspots {
            sqlx::query(
                "INSERT INTO hotspots (book_id, label, x, y, width, height, audio_url, sort_order) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(book_id)
            .bind(&hotspot.label)
            .bind(hotspot.x)
            .bind(hotspot.y)
            .bind(hotspot.width)
            .bind(hotspot.height)
            .bind(hotspot.audio_url.as_deref())
            .bind(hotspot.sort_order)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    fn order_clause(sort: Option<(&'static str, SortDirection)>) -> String {
        match sort {
            Some((column, SortDirection::Descending)) => format!(" ORDER BY {column} DESC"),
            Some((column, SortDirection::Ascending)) => format!(" ORDER BY {column} ASC"),
            None => String::new(),
        }
    }
}

fn book_not_found(id: i64) -> SpeakBookError {
    SpeakBookError::NotFound(format!("Book not found, ID: {id}"))
}

fn audio_not_found(id: i64) -> SpeakBookError {
    SpeakBookError::NotFound(format!("Audio not found, ID: {id}"))
}

#[async_trait]
impl DatabaseBackend for PostgresDatabase {
    async fn create_book(&self, book: &Book) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "INSERT INTO books (title, author, description, category, pages, target_age, \
             difficulty, cover_image_url, status, created_at, updated_at, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING id",
        )
        .bind(&book.title)
        .bind(book.author.as_deref())
        .bind(book.description.as_deref())
        .bind(book.category.as_deref())
        .bind(book.pages)
        .bind(book.target_age.as_deref())
        .bind(book.difficulty.as_deref())
        .bind(book.cover_image_url.as_deref())
        .bind(book.status.as_str())
        .bind(book.created_at)
        .bind(book.updated_at)
        .bind(book.published_at)
        .fetch_one(&mut *tx)
        .await?;
        let id: i64 = row.try_get("id")?;

        Self::insert_hotspots(&mut tx, id, &book.hotspots).await?;
        tx.commit().await?;
        Ok(id)
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut books = vec![Self::book_from_row(&row)?];
        self.attach_hotspots(&mut books).await?;
        Ok(books.pop())
    }

    async fn list_books_by_status(&self, status: BookStatus) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE status = $1 ORDER BY id"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        let mut books = rows
            .iter()
            .map(Self::book_from_row)
            .collect::<Result<Vec<_>>>()?;
        self.attach_hotspots(&mut books).await?;
        Ok(books)
    }

    async fn list_books_by_status_and_category(
        &self,
        status: BookStatus,
        category: &str,
    ) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE status = $1 AND category = $2 ORDER BY id"
        ))
        .bind(status.as_str())
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        let mut books = rows
            .iter()
            .map(Self::book_from_row)
            .collect::<Result<Vec<_>>>()?;
        self.attach_hotspots(&mut books).await?;
        Ok(books)
    }

    async fn update_book(&self, book: &Book) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE books SET title = $1, author = $2, description = $3, category = $4, \
             pages = $5, target_age = $6, difficulty = $7, cover_image_url = $8, status = $9, \
             updated_at = $10, published_at = $11 WHERE id = $12",
        )
        .bind(&book.title)
        .bind(book.author.as_deref())
        .bind(book.description.as_deref())
        .bind(book.category.as_deref())
        .bind(book.pages)
        .bind(book.target_age.as_deref())
        .bind(book.difficulty.as_deref())
        .bind(book.cover_image_url.as_deref())
        .bind(book.status.as_str())
        .bind(book.updated_at)
        .bind(book.published_at)
        .bind(book.id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(book_not_found(book.id));
        }

        // delete-then-bulk-insert, never a merge
        sqlx::query("DELETE FROM hotspots WHERE book_id = $1")
            .bind(book.id)
            .execute(&mut *tx)
            .await?;
        Self::insert_hotspots(&mut tx, book.id, &book.hotspots).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_book(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(book_not_found(id));
        }
        Ok(())
    }

    async fn page_published_books(&self, page: &PageRequest) -> Result<(Vec<Book>, u64)> {
        let sort = page
            .sort()
            .and_then(|s| book_sort_column(&s.field).map(|c| (c, s.direction)));
        let order = Self::order_clause(sort);

        let (mut books, total) = if let Some(keyword) = page.keyword() {
            let pattern = format!("%{keyword}%");
            let rows = sqlx::query(&format!(
                "SELECT {BOOK_COLUMNS} FROM books WHERE status = 'published' \
                 AND (title ILIKE $1 OR author ILIKE $1 OR description ILIKE $1)\
                 {order} LIMIT $2 OFFSET $3"
            ))
            .bind(&pattern)
            .bind(page.page_size() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;
            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM books WHERE status = 'published' \
                 AND (title ILIKE $1 OR author ILIKE $1 OR description ILIKE $1)",
            )
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;
            let books = rows
                .iter()
                .map(Self::book_from_row)
                .collect::<Result<Vec<_>>>()?;
            (books, total)
        } else {
            let rows = sqlx::query(&format!(
                "SELECT {BOOK_COLUMNS} FROM books WHERE status = 'published'\
                 {order} LIMIT $1 OFFSET $2"
            ))
            .bind(page.page_size() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;
            let total: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE status = 'published'")
                    .fetch_one(&self.pool)
                    .await?;
            let books = rows
                .iter()
                .map(Self::book_from_row)
                .collect::<Result<Vec<_>>>()?;
            (books, total)
        };

        self.attach_hotspots(&mut books).await?;
        Ok((books, total.max(0) as u64))
    }

    async fn create_audio(&self, audio: &Audio) -> Result<i64> {
        let row = sqlx::query(
            "INSERT INTO audios (name, url, duration, file_size, category, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&audio.name)
        .bind(&audio.url)
        .bind(audio.duration)
        .bind(audio.file_size)
        .bind(audio.category.as_deref())
        .bind(audio.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn get_audio(&self, id: i64) -> Result<Option<Audio>> {
        let row = sqlx::query(&format!("SELECT {AUDIO_COLUMNS} FROM audios WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::audio_from_row).transpose()
    }

    async fn list_audios(&self) -> Result<Vec<Audio>> {
        let rows = sqlx::query(&format!("SELECT {AUDIO_COLUMNS} FROM audios ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::audio_from_row).collect()
    }

    async fn list_audios_by_category(&self, category: &str) -> Result<Vec<Audio>> {
        let rows = sqlx::query(&format!(
            "SELECT {AUDIO_COLUMNS} FROM audios WHERE category = $1 ORDER BY id"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::audio_from_row).collect()
    }

    async fn update_audio(&self, audio: &Audio) -> Result<()> {
        let result = sqlx::query(
            "UPDATE audios SET name = $1, url = $2, duration = $3, file_size = $4, \
             category = $5 WHERE id = $6",
        )
        .bind(&audio.name)
        .bind(&audio.url)
        .bind(audio.duration)
        .bind(audio.file_size)
        .bind(audio.category.as_deref())
        .bind(audio.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(audio_not_found(audio.id));
        }
        Ok(())
    }

    async fn delete_audio(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM audios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(audio_not_found(id));
        }
        Ok(())
    }

    async fn page_audios(&self, page: &PageRequest) -> Result<(Vec<Audio>, u64)> {
        let sort = page
            .sort()
            .and_then(|s| audio_sort_column(&s.field).map(|c| (c, s.direction)));
        let order = Self::order_clause(sort);

        if let Some(keyword) = page.keyword() {
            let pattern = format!("%{keyword}%");
            let rows = sqlx::query(&format!(
                "SELECT {AUDIO_COLUMNS} FROM audios \
                 WHERE (name ILIKE $1 OR category ILIKE $1){order} LIMIT $2 OFFSET $3"
            ))
            .bind(&pattern)
            .bind(page.page_size() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;
            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM audios WHERE (name ILIKE $1 OR category ILIKE $1)",
            )
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;
            let audios = rows
                .iter()
                .map(Self::audio_from_row)
                .collect::<Result<Vec<_>>>()?;
            Ok((audios, total.max(0) as u64))
        } else {
            let rows = sqlx::query(&format!(
                "SELECT {AUDIO_COLUMNS} FROM audios{order} LIMIT $1 OFFSET $2"
            ))
            .bind(page.page_size() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audios")
                .fetch_one(&self.pool)
                .await?;
            let audios = rows
                .iter()
                .map(Self::audio_from_row)
                .collect::<Result<Vec<_>>>()?;
            Ok((audios, total.max(0) as u64))
        }
    }

    async fn create_student(&self, student: &Student) -> Result<i64> {
        let row = sqlx::query("INSERT INTO students (name, email) VALUES ($1, $2) RETURNING id")
            .bind(student.name.as_deref())
            .bind(&student.email)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("id")?)
    }

    async fn get_student(&self, id: i64) -> Result<Option<Student>> {
        let row = sqlx::query("SELECT id, name, email FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::student_from_row).transpose()
    }

    async fn find_students_by_email(&self, email: &str) -> Result<Vec<Student>> {
        let rows = sqlx::query("SELECT id, name, email FROM students WHERE email = $1")
            .bind(email)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::student_from_row).collect()
    }
}
