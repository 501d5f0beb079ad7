pub mod upload_handlers;
pub mod upload_service;

pub use upload_service::{UploadClient, UploadProfile, UploadResponse};
