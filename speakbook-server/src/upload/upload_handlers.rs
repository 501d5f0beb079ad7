use axum::{
    extract::{Multipart, State},
    Json,
};
use speakbook_core::ApiResponse;

use super::upload_service::{UploadProfile, UploadResponse};
use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
};

/// File payload pulled out of a multipart request.
pub struct InboundFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: Option<String>,
}

/// Collected multipart request: at most one `file` part plus the optional
/// text fields the audio upload endpoint accepts.
pub struct MultipartUpload {
    pub file: Option<InboundFile>,
    pub name: Option<String>,
    pub category: Option<String>,
}

pub async fn collect_upload(mut multipart: Multipart) -> AppResult<MultipartUpload> {
    let mut upload = MultipartUpload {
        file: None,
        name: None,
        category: None,
    };
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(e.to_string()))?
    {
        match field.name().unwrap_or("") {
            "file" => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::new(e.to_string()))?;
                upload.file = Some(InboundFile {
                    bytes: bytes.to_vec(),
                    file_name,
                    content_type,
                });
            }
            "name" => {
                upload.name = Some(field.text().await.map_err(|e| AppError::new(e.to_string()))?)
            }
            "category" => {
                upload.category =
                    Some(field.text().await.map_err(|e| AppError::new(e.to_string()))?)
            }
            _ => {}
        }
    }
    Ok(upload)
}

/// `POST /api/upload/image`
pub async fn upload_image_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    upload_with_profile(&state, multipart, UploadProfile::image()).await
}

/// `POST /api/upload/audio`
pub async fn upload_audio_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    upload_with_profile(&state, multipart, UploadProfile::audio()).await
}

async fn upload_with_profile(
    state: &AppState,
    multipart: Multipart,
    profile: UploadProfile,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    let upload = collect_upload(multipart).await?;
    // a missing file part validates like an empty payload
    let file = upload.file.unwrap_or(InboundFile {
        bytes: Vec::new(),
        file_name: "upload".to_string(),
        content_type: None,
    });

    profile.validate(file.bytes.len(), file.content_type.as_deref())?;
    let result = state.uploader.upload(file.bytes, &file.file_name).await?;
    Ok(Json(ApiResponse::success(result)))
}
