//! In-memory storage backend.
//!
//! Backs tests and database-less runs. One `RwLock` over the whole store
//! gives every multi-row mutation the same all-or-nothing behaviour the
//! Postgres backend gets from a transaction.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{audio_sort_column, book_sort_column, traits::DatabaseBackend};
use crate::{
    audio::Audio,
    book::{Book, BookStatus},
    error::SpeakBookError,
    pagination::{PageRequest, SortDirection},
    student::Student,
    Result,
};

#[derive(Default)]
struct Store {
    books: BTreeMap<i64, Book>,
    audios: BTreeMap<i64, Audio>,
    students: BTreeMap<i64, Student>,
    next_book_id: i64,
    next_hotspot_id: i64,
    next_audio_id: i64,
    next_student_id: i64,
}

pub struct MemoryDatabase {
    inner: RwLock<Store>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Store::default()),
        }
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

fn book_not_found(id: i64) -> SpeakBookError {
    SpeakBookError::NotFound(format!("Book not found, ID: {id}"))
}

fn audio_not_found(id: i64) -> SpeakBookError {
    SpeakBookError::NotFound(format!("Audio not found, ID: {id}"))
}

fn contains_ci(haystack: Option<&str>, needle_lower: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

fn compare_books(a: &Book, b: &Book, column: &str) -> Ordering {
    match column {
        "id" => a.id.cmp(&b.id),
        "title" => a.title.cmp(&b.title),
        "author" => a.author.cmp(&b.author),
        "category" => a.category.cmp(&b.category),
        "pages" => a.pages.cmp(&b.pages),
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        "published_at" => a.published_at.cmp(&b.published_at),
        _ => Ordering::Equal,
    }
}

fn compare_audios(a: &Audio, b: &Audio, column: &str) -> Ordering {
    match column {
        "id" => a.id.cmp(&b.id),
        "name" => a.name.cmp(&b.name),
        "category" => a.category.cmp(&b.category),
        "duration" => a.duration.cmp(&b.duration),
        "file_size" => a.file_size.cmp(&b.file_size),
        "created_at" => a.created_at.cmp(&b.created_at),
        _ => Ordering::Equal,
    }
}

fn apply_sort<T>(
    items: &mut [T],
    column: &str,
    direction: SortDirection,
    compare: impl Fn(&T, &T, &str) -> Ordering,
) {
    let descending = direction == SortDirection::Descending;
    items.sort_by(|a, b| {
        let ord = compare(a, b, column);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

fn slice_page<T: Clone>(items: &[T], page: &PageRequest) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let start = page.offset().min(total) as usize;
    let end = (start + page.page_size() as usize).min(items.len());
    (items[start..end].to_vec(), total)
}

#[async_trait]
impl DatabaseBackend for MemoryDatabase {
    async fn create_book(&self, book: &Book) -> Result<i64> {
        let mut store = self.inner.write().await;
        store.next_book_id += 1;
        let id = store.next_book_id;
        let mut stored = book.clone();
        stored.id = id;
        for hotspot in &mut stored.hotspots {
            store.next_hotspot_id += 1;
            hotspot.id = store.next_hotspot_id;
            hotspot.book_id = id;
        }
        store.books.insert(id, stored);
        Ok(id)
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        Ok(self.inner.read().await.books.get(&id).cloned())
    }

    async fn list_books_by_status(&self, status: BookStatus) -> Result<Vec<Book>> {
        let store = self.inner.read().await;
        Ok(store
            .books
            .values()
            .filter(|b| b.status == status)
            .cloned()
            .collect())
    }

    async fn list_books_by_status_and_category(
        &self,
        status: BookStatus,
        category: &str,
    ) -> Result<Vec<Book>> {
        let store = self.inner.read().await;
        Ok(store
            .books
            .values()
            .filter(|b| b.status == status && b.category.as_deref() == Some(category))
            .cloned()
            .collect())
    }

    async fn update_book(&self, book: &Book) -> Result<()> {
        let mut store = self.inner.write().await;
        if !store.books.contains_key(&book.id) {
            return Err(book_not_found(book.id));
        }
        // The previous hotspot set is discarded wholesale; incoming
        // hotspots are inserted fresh, mirroring delete-then-bulk-insert.
        let mut stored = book.clone();
        for hotspot in &mut stored.hotspots {
            store.next_hotspot_id += 1;
            hotspot.id = store.next_hotspot_id;
            hotspot.book_id = book.id;
        }
        store.books.insert(book.id, stored);
        Ok(())
    }

    async fn delete_book(&self, id: i64) -> Result<()> {
        let mut store = self.inner.write().await;
        store
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| book_not_found(id))
    }

    async fn page_published_books(&self, page: &PageRequest) -> Result<(Vec<Book>, u64)> {
        let store = self.inner.read().await;
        let needle = page.keyword().map(|k| k.to_lowercase());
        let mut matches: Vec<Book> = store
            .books
            .values()
            .filter(|b| b.status == BookStatus::Published)
            .filter(|b| match &needle {
                Some(needle) => {
                    contains_ci(Some(&b.title), needle)
                        || contains_ci(b.author.as_deref(), needle)
                        || contains_ci(b.description.as_deref(), needle)
                }
                None => true,
            })
            .cloned()
            .collect();
        if let Some(spec) = page.sort() {
            if let Some(column) = book_sort_column(&spec.field) {
                apply_sort(&mut matches, column, spec.direction, compare_books);
            }
        }
        Ok(slice_page(&matches, page))
    }

    async fn create_audio(&self, audio: &Audio) -> Result<i64> {
        let mut store = self.inner.write().await;
        store.next_audio_id += 1;
        let id = store.next_audio_id;
        let mut stored = audio.clone();
        stored.id = id;
        store.audios.insert(id, stored);
        Ok(id)
    }

    async fn get_audio(&self, id: i64) -> Result<Option<Audio>> {
        Ok(self.inner.read().await.audios.get(&id).cloned())
    }

    async fn list_audios(&self) -> Result<Vec<Audio>> {
        Ok(self.inner.read().await.audios.values().cloned().collect())
    }

    async fn list_audios_by_category(&self, category: &str) -> Result<Vec<Audio>> {
        let store = self.inner.read().await;
        Ok(store
            .audios
            .values()
            .filter(|a| a.category.as_deref() == Some(category))
            .cloned()
            .collect())
    }

    async fn update_audio(&self, audio: &Audio) -> Result<()> {
        let mut store = self.inner.write().await;
        if !store.audios.contains_key(&audio.id) {
            return Err(audio_not_found(audio.id));
        }
        store.audios.insert(audio.id, audio.clone());
        Ok(())
    }

    async fn delete_audio(&self, id: i64) -> Result<()> {
        let mut store = self.inner.write().await;
        store
            .audios
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| audio_not_found(id))
    }

    async fn page_audios(&self, page: &PageRequest) -> Result<(Vec<Audio>, u64)> {
        let store = self.inner.read().await;
        let needle = page.keyword().map(|k| k.to_lowercase());
        let mut matches: Vec<Audio> = store
            .audios
            .values()
            .filter(|a| match &needle {
                Some(needle) => {
                    contains_ci(Some(&a.name), needle) || contains_ci(a.category.as_deref(), needle)
                }
                None => true,
            })
            .cloned()
            .collect();
        if let Some(spec) = page.sort() {
            if let Some(column) = audio_sort_column(&spec.field) {
                apply_sort(&mut matches, column, spec.direction, compare_audios);
            }
        }
        Ok(slice_page(&matches, page))
    }

    async fn create_student(&self, student: &Student) -> Result<i64> {
        let mut store = self.inner.write().await;
        store.next_student_id += 1;
        let id = store.next_student_id;
        let mut stored = student.clone();
        stored.id = id;
        store.students.insert(id, stored);
        Ok(id)
    }

    async fn get_student(&self, id: i64) -> Result<Option<Student>> {
        Ok(self.inner.read().await.students.get(&id).cloned())
    }

    async fn find_students_by_email(&self, email: &str) -> Result<Vec<Student>> {
        let store = self.inner.read().await;
        Ok(store
            .students
            .values()
            .filter(|s| s.email == email)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SortDirection, SortSpec};
    use chrono::Utc;

    fn book(title: &str, status: BookStatus, hotspot_labels: &[&str]) -> Book {
        let now = Utc::now();
        Book {
            id: 0,
            title: title.to_string(),
            author: None,
            description: None,
            category: Some("animals".to_string()),
            pages: None,
            target_age: None,
            difficulty: None,
            cover_image_url: Some("https://files.example/c.png".to_string()),
            status,
            created_at: now,
            updated_at: now,
            published_at: None,
            hotspots: hotspot_labels
                .iter()
                .map(|label| crate::book::Hotspot {
                    id: 0,
                    book_id: 0,
                    label: label.to_string(),
                    x: 0,
                    y: 0,
                    width: 10,
                    height: 10,
                    audio_url: None,
                    sort_order: None,
                })
                .collect(),
        }
    }

    fn audio(name: &str, category: &str) -> Audio {
        Audio {
            id: 0,
            name: name.to_string(),
            url: "https://files.example/a.mp3".to_string(),
            duration: None,
            file_size: None,
            category: Some(category.to_string()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_assigns_book_and_hotspot_ids() {
        let db = MemoryDatabase::new();
        let id = db
            .create_book(&book("b", BookStatus::Draft, &["a", "b"]))
            .await
            .unwrap();
        let stored = db.get_book(id).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert!(stored.hotspots.iter().all(|h| h.book_id == id && h.id > 0));
    }

    #[tokio::test]
    async fn update_replaces_hotspots_wholesale() {
        let db = MemoryDatabase::new();
        let id = db
            .create_book(&book("b", BookStatus::Draft, &["A", "B"]))
            .await
            .unwrap();

        let mut updated = book("b", BookStatus::Draft, &["C"]);
        updated.id = id;
        db.update_book(&updated).await.unwrap();

        let stored = db.get_book(id).await.unwrap().unwrap();
        let labels: Vec<&str> = stored.hotspots.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["C"]);
    }

    #[tokio::test]
    async fn delete_missing_book_is_not_found() {
        let db = MemoryDatabase::new();
        let err = db.delete_book(42).await.unwrap_err();
        assert!(matches!(err, SpeakBookError::NotFound(_)));
    }

    #[tokio::test]
    async fn paged_books_filter_status_and_keyword_together() {
        let db = MemoryDatabase::new();
        db.create_book(&book("Cat Tales", BookStatus::Published, &[]))
            .await
            .unwrap();
        db.create_book(&book("Cat Drafts", BookStatus::Draft, &[]))
            .await
            .unwrap();
        db.create_book(&book("Dog Days", BookStatus::Published, &[]))
            .await
            .unwrap();

        let page = PageRequest::new(1, 10).with_keyword(Some("cat".to_string()));
        let (content, total) = db.page_published_books(&page).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(content[0].title, "Cat Tales");
    }

    #[tokio::test]
    async fn paged_audios_keyword_matches_name_and_category() {
        let db = MemoryDatabase::new();
        db.create_audio(&audio("Cat Sound", "animals")).await.unwrap();
        db.create_audio(&audio("Dog Bark", "pets")).await.unwrap();

        let page = PageRequest::new(1, 10).with_keyword(Some("cat".to_string()));
        let (content, total) = db.page_audios(&page).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(content[0].name, "Cat Sound");

        // category is searched too
        let page = PageRequest::new(1, 10).with_keyword(Some("PET".to_string()));
        let (content, _) = db.page_audios(&page).await.unwrap();
        assert_eq!(content[0].name, "Dog Bark");
    }

    #[tokio::test]
    async fn paged_audios_sort_and_slice() {
        let db = MemoryDatabase::new();
        for name in ["b", "d", "a", "c"] {
            db.create_audio(&audio(name, "x")).await.unwrap();
        }

        let page = PageRequest::new(1, 2)
            .with_sort(Some(SortSpec::new("name", SortDirection::Descending)));
        let (content, total) = db.page_audios(&page).await.unwrap();
        assert_eq!(total, 4);
        let names: Vec<&str> = content.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["d", "c"]);

        // a page past the end comes back empty but keeps the total
        let page = PageRequest::new(5, 2).with_sort(None);
        let (content, total) = db.page_audios(&page).await.unwrap();
        assert!(content.is_empty());
        assert_eq!(total, 4);
    }

    #[tokio::test]
    async fn student_email_lookup_is_case_sensitive() {
        let db = MemoryDatabase::new();
        db.create_student(&Student {
            id: 0,
            name: Some("Amy".to_string()),
            email: "amy@example.com".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(
            db.find_students_by_email("amy@example.com").await.unwrap().len(),
            1
        );
        assert!(db
            .find_students_by_email("AMY@example.com")
            .await
            .unwrap()
            .is_empty());
    }
}
