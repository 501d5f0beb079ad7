//! Book and hotspot entities plus their wire transfer objects.
//!
//! A book exclusively owns its hotspots: updates replace the whole hotspot
//! collection and deleting a book removes every hotspot with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a book. Draft books are excluded from public listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Draft,
    Published,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }

    /// Parse a stored status string; anything unrecognized reads as draft.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "published" => Self::Published,
            _ => Self::Draft,
        }
    }
}

/// A clickable rectangular region on a book page, mapped to an audio clip.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub id: i64,
    pub book_id: i64,
    pub label: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub audio_url: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub pages: Option<i32>,
    pub target_age: Option<String>,
    pub difficulty: Option<String>,
    pub cover_image_url: Option<String>,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    /// Owned, ordered hotspot collection.
    pub hotspots: Vec<Hotspot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HotspotDto {
    pub id: Option<i64>,
    pub label: Option<String>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub audio_url: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookDto {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub pages: Option<i32>,
    pub target_age: Option<String>,
    pub difficulty: Option<String>,
    pub cover_image_url: Option<String>,
    pub status: Option<BookStatus>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub hotspots: Option<Vec<HotspotDto>>,
}

impl From<&Hotspot> for HotspotDto {
    fn from(hotspot: &Hotspot) -> Self {
        Self {
            id: Some(hotspot.id),
            label: Some(hotspot.label.clone()),
            x: Some(hotspot.x),
            y: Some(hotspot.y),
            width: Some(hotspot.width),
            height: Some(hotspot.height),
            audio_url: hotspot.audio_url.clone(),
            sort_order: hotspot.sort_order,
        }
    }
}

impl HotspotDto {
    /// Convert to an entity owned by `book_id`. Absent fields map to
    /// defaults; nothing here fails.
    pub fn into_entity(self, book_id: i64) -> Hotspot {
        Hotspot {
            id: self.id.unwrap_or(0),
            book_id,
            label: self.label.unwrap_or_default(),
            x: self.x.unwrap_or(0),
            y: self.y.unwrap_or(0),
            width: self.width.unwrap_or(0),
            height: self.height.unwrap_or(0),
            audio_url: self.audio_url,
            sort_order: self.sort_order,
        }
    }
}

impl From<&Book> for BookDto {
    fn from(book: &Book) -> Self {
        Self {
            id: Some(book.id),
            title: Some(book.title.clone()),
            author: book.author.clone(),
            description: book.description.clone(),
            category: book.category.clone(),
            pages: book.pages,
            target_age: book.target_age.clone(),
            difficulty: book.difficulty.clone(),
            cover_image_url: book.cover_image_url.clone(),
            status: Some(book.status),
            created_at: Some(book.created_at),
            updated_at: Some(book.updated_at),
            published_at: book.published_at,
            hotspots: Some(book.hotspots.iter().map(HotspotDto::from).collect()),
        }
    }
}

impl BookDto {
    /// Convert to an entity.
    ///
    /// If the incoming status is `published` and no publish time was
    /// supplied, the publish time is stamped now; a caller-supplied value
    /// is preserved as-is. Hotspots are mapped element-wise in order.
    pub fn into_entity(self) -> Book {
        let now = Utc::now();
        let status = self.status.unwrap_or(BookStatus::Draft);
        let published_at = if status == BookStatus::Published && self.published_at.is_none() {
            Some(now)
        } else {
            self.published_at
        };
        let id = self.id.unwrap_or(0);
        Book {
            id,
            title: self.title.unwrap_or_default(),
            author: self.author,
            description: self.description,
            category: self.category,
            pages: self.pages,
            target_age: self.target_age,
            difficulty: self.difficulty,
            cover_image_url: self.cover_image_url,
            status,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
            published_at,
            hotspots: self
                .hotspots
                .unwrap_or_default()
                .into_iter()
                .map(|h| h.into_entity(id))
                .collect(),
        }
    }
}
