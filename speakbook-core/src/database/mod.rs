pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::MemoryDatabase;
pub use postgres::PostgresDatabase;
pub use traits::DatabaseBackend;

use crate::Result;
use std::{fmt, sync::Arc};

/// Handle to the storage backend shared across the application.
#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn DatabaseBackend>,
}

impl Database {
    pub async fn new_postgres(connection_string: &str) -> Result<Self> {
        let backend = Arc::new(PostgresDatabase::new(connection_string).await?);
        Ok(Self { backend })
    }

    /// In-memory backend for tests and database-less runs.
    pub fn new_memory() -> Self {
        Self {
            backend: Arc::new(MemoryDatabase::new()),
        }
    }

    pub fn backend(&self) -> &dyn DatabaseBackend {
        self.backend.as_ref()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

/// Resolve a caller-supplied book sort field to its column.
///
/// Accepts both the wire spelling and the column spelling; anything else
/// falls back to store-default order rather than reaching the SQL layer.
pub(crate) fn book_sort_column(field: &str) -> Option<&'static str> {
    match field {
        "id" => Some("id"),
        "title" => Some("title"),
        "author" => Some("author"),
        "category" => Some("category"),
        "pages" => Some("pages"),
        "createdAt" | "created_at" => Some("created_at"),
        "updatedAt" | "updated_at" => Some("updated_at"),
        "publishedAt" | "published_at" => Some("published_at"),
        _ => None,
    }
}

pub(crate) fn audio_sort_column(field: &str) -> Option<&'static str> {
    match field {
        "id" => Some("id"),
        "name" => Some("name"),
        "category" => Some("category"),
        "duration" => Some("duration"),
        "fileSize" | "file_size" => Some("file_size"),
        "createdAt" | "created_at" => Some("created_at"),
        _ => None,
    }
}
