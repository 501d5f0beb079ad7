//! Student registration and lookup.

use speakbook_core::{student::StudentDto, SpeakBookError};
use tracing::info;

use crate::{
    errors::{AppError, AppResult},
    infra::app_state::AppState,
};

pub struct StudentService<'a> {
    state: &'a AppState,
}

impl<'a> StudentService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Register a student, rejecting an email that is already taken.
    ///
    /// The existence check and the insert are two separate statements, so
    /// two concurrent registrations with the same email can both pass the
    /// check. The schema deliberately carries no unique constraint to keep
    /// the failure mode an envelope message rather than a database error.
    pub async fn create_student(&self, dto: StudentDto) -> AppResult<i64> {
        if dto.email.as_deref().is_none_or(|e| e.trim().is_empty()) {
            return Err(SpeakBookError::Validation(
                "Student email must not be blank".to_string(),
            )
            .into());
        }

        let student = dto.into_entity();
        let taken = self
            .state
            .db
            .backend()
            .find_students_by_email(&student.email)
            .await?;
        if !taken.is_empty() {
            return Err(SpeakBookError::DuplicateEmail(student.email).into());
        }

        let id = self.state.db.backend().create_student(&student).await?;
        info!(student_id = id, "student registered");
        Ok(id)
    }

    pub async fn get_student(&self, id: i64) -> AppResult<StudentDto> {
        let student = self
            .state
            .db
            .backend()
            .get_student(id)
            .await?
            .ok_or_else(|| AppError::new(format!("Student not found, ID: {id}")))?;
        Ok(StudentDto::from(&student))
    }
}
