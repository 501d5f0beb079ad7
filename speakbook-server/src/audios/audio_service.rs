//! Audio domain operations: plain CRUD, no lifecycle.

use chrono::Utc;
use speakbook_core::{
    audio::AudioDto, PageRequest, PageResponse, SpeakBookError,
};
use tracing::info;

use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
};

pub struct AudioService<'a> {
    state: &'a AppState,
}

impl<'a> AudioService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn create_audio(&self, dto: AudioDto) -> AppResult<AudioDto> {
        if dto.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(SpeakBookError::Validation(
                "Audio name must not be blank".to_string(),
            )
            .into());
        }
        if dto.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            return Err(SpeakBookError::Validation(
                "Audio URL must not be blank".to_string(),
            )
            .into());
        }

        let mut audio = dto.into_entity();
        audio.created_at = Utc::now();

        let id = self.state.db.backend().create_audio(&audio).await?;
        info!(audio_id = id, name = %audio.name, "audio created");
        self.get_audio(id).await
    }

    /// Look up and overwrite all mutable scalar fields in place.
    pub async fn update_audio(&self, id: i64, dto: AudioDto) -> AppResult<AudioDto> {
        let mut audio = self
            .state
            .db
            .backend()
            .get_audio(id)
            .await?
            .ok_or_else(|| AppError::new(format!("Audio not found, ID: {id}")))?;

        dto.apply_to(&mut audio);
        self.state.db.backend().update_audio(&audio).await?;
        info!(audio_id = id, "audio updated");
        self.get_audio(id).await
    }

    pub async fn get_audio(&self, id: i64) -> AppResult<AudioDto> {
        let audio = self
            .state
            .db
            .backend()
            .get_audio(id)
            .await?
            .ok_or_else(|| AppError::new(format!("Audio not found, ID: {id}")))?;
        Ok(AudioDto::from(&audio))
    }

    pub async fn list_audios(&self) -> AppResult<Vec<AudioDto>> {
        let audios = self.state.db.backend().list_audios().await?;
        Ok(audios.iter().map(AudioDto::from).collect())
    }

    pub async fn list_by_category(&self, category: &str) -> AppResult<Vec<AudioDto>> {
        let audios = self
            .state
            .db
            .backend()
            .list_audios_by_category(category)
            .await?;
        Ok(audios.iter().map(AudioDto::from).collect())
    }

    /// Existence is checked first so a missing id reports not-found rather
    /// than silently succeeding.
    pub async fn delete_audio(&self, id: i64) -> AppResult<()> {
        self.state.db.backend().delete_audio(id).await?;
        info!(audio_id = id, "audio deleted");
        Ok(())
    }

    pub async fn page_audios(&self, page: PageRequest) -> AppResult<PageResponse<AudioDto>> {
        let (audios, total) = self.state.db.backend().page_audios(&page).await?;
        let content = audios.iter().map(AudioDto::from).collect();
        Ok(PageResponse::new(content, &page, total))
    }
}
