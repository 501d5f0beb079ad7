use axum::{
    extract::{Path, State},
    Json,
};
use speakbook_core::{student::StudentDto, ApiResponse};

use super::StudentService;
use crate::{errors::AppResult, infra::app_state::AppState};

/// `POST /student` — register a student and return the new id.
pub async fn create_student_handler(
    State(state): State<AppState>,
    Json(dto): Json<StudentDto>,
) -> AppResult<Json<ApiResponse<i64>>> {
    let id = StudentService::new(&state).create_student(dto).await?;
    Ok(Json(ApiResponse::success(id)))
}

/// `GET /student/{id}`
pub async fn get_student_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<StudentDto>>> {
    let student = StudentService::new(&state).get_student(id).await?;
    Ok(Json(ApiResponse::success(student)))
}
