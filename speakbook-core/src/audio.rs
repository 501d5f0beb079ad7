//! Standalone audio assets and their transfer objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Audio {
    pub id: i64,
    pub name: String,
    pub url: String,
    /// Duration in seconds.
    pub duration: Option<i32>,
    /// File size in bytes.
    pub file_size: Option<i32>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AudioDto {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub duration: Option<i32>,
    pub file_size: Option<i32>,
    pub category: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Audio> for AudioDto {
    fn from(audio: &Audio) -> Self {
        Self {
            id: Some(audio.id),
            name: Some(audio.name.clone()),
            url: Some(audio.url.clone()),
            duration: audio.duration,
            file_size: audio.file_size,
            category: audio.category.clone(),
            created_at: Some(audio.created_at),
        }
    }
}

impl AudioDto {
    pub fn into_entity(self) -> Audio {
        Audio {
            id: self.id.unwrap_or(0),
            name: self.name.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            duration: self.duration,
            file_size: self.file_size,
            category: self.category,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }

    /// Overwrite the mutable scalar fields of an existing entity in place.
    ///
    /// Identity and creation time stay untouched; this is the update path,
    /// which replaces every caller-settable field wholesale.
    pub fn apply_to(self, audio: &mut Audio) {
        audio.name = self.name.unwrap_or_default();
        audio.url = self.url.unwrap_or_default();
        audio.duration = self.duration;
        audio.file_size = self.file_size;
        audio.category = self.category;
    }
}
