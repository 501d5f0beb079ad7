use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::Deserialize;
use speakbook_core::{
    audio::AudioDto, ApiResponse, PageRequest, PageResponse, SortSpec,
};

use super::AudioService;
use crate::{
    errors::AppResult,
    infra::app_state::AppState,
    upload::{
        upload_handlers::{collect_upload, InboundFile},
        UploadProfile,
    },
};

/// Query parameters for `GET /api/audios/page`.
///
/// Kept wire-compatible with the existing frontend: `page` defaults to 0
/// (the shared clamp normalizes it to 1) and `sort` is a combined
/// `field[,dir]` spec.
#[derive(Debug, Deserialize)]
pub struct AudioPageParams {
    #[serde(default)]
    page: i64,
    #[serde(default = "default_size")]
    size: i64,
    keyword: Option<String>,
    sort: Option<String>,
}

fn default_size() -> i64 {
    10
}

impl AudioPageParams {
    fn into_page_request(self) -> PageRequest {
        PageRequest::new(self.page, self.size)
            .with_sort(self.sort.as_deref().and_then(SortSpec::parse))
            .with_keyword(self.keyword)
    }
}

/// `POST /api/audios`
pub async fn create_audio_handler(
    State(state): State<AppState>,
    Json(dto): Json<AudioDto>,
) -> AppResult<Json<ApiResponse<AudioDto>>> {
    let audio = AudioService::new(&state).create_audio(dto).await?;
    Ok(Json(ApiResponse::success(audio)))
}

/// `PUT /api/audios/{id}`
pub async fn update_audio_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(dto): Json<AudioDto>,
) -> AppResult<Json<ApiResponse<AudioDto>>> {
    let audio = AudioService::new(&state).update_audio(id, dto).await?;
    Ok(Json(ApiResponse::success(audio)))
}

/// `GET /api/audios/{id}`
pub async fn get_audio_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<AudioDto>>> {
    let audio = AudioService::new(&state).get_audio(id).await?;
    Ok(Json(ApiResponse::success(audio)))
}

/// `GET /api/audios`
pub async fn list_audios_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<AudioDto>>>> {
    let audios = AudioService::new(&state).list_audios().await?;
    Ok(Json(ApiResponse::success(audios)))
}

/// `GET /api/audios/category/{category}`
pub async fn list_audios_by_category_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<AudioDto>>>> {
    let audios = AudioService::new(&state).list_by_category(&category).await?;
    Ok(Json(ApiResponse::success(audios)))
}

/// `DELETE /api/audios/{id}`
pub async fn delete_audio_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    AudioService::new(&state).delete_audio(id).await?;
    Ok(Json(ApiResponse::empty()))
}

/// `GET /api/audios/page`
pub async fn page_audios_handler(
    State(state): State<AppState>,
    Query(params): Query<AudioPageParams>,
) -> AppResult<Json<ApiResponse<PageResponse<AudioDto>>>> {
    let page = AudioService::new(&state)
        .page_audios(params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// `POST /api/audios/upload` — forward the file to the external host, then
/// persist an audio record pointing at the returned URL.
pub async fn upload_audio_asset_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<AudioDto>>> {
    let upload = collect_upload(multipart).await?;
    // a missing file part validates like an empty payload
    let file = upload.file.unwrap_or(InboundFile {
        bytes: Vec::new(),
        file_name: "upload".to_string(),
        content_type: None,
    });
    UploadProfile::audio().validate(file.bytes.len(), file.content_type.as_deref())?;

    let size = file.bytes.len();
    let uploaded = state.uploader.upload(file.bytes, &file.file_name).await?;

    let dto = AudioDto {
        name: upload
            .name
            .filter(|n| !n.trim().is_empty())
            .or(Some(uploaded.file_name.clone())),
        url: Some(uploaded.url),
        file_size: Some(size as i32),
        category: upload.category,
        ..AudioDto::default()
    };

    let audio = AudioService::new(&state).create_audio(dto).await?;
    Ok(Json(ApiResponse::success(audio)))
}
