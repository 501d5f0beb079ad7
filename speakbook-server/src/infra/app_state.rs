use std::sync::Arc;

use speakbook_core::Database;

use crate::{infra::config::Config, upload::upload_service::UploadClient};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub uploader: Arc<UploadClient>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, uploader: UploadClient, config: Config) -> Self {
        Self {
            db,
            uploader: Arc::new(uploader),
            config: Arc::new(config),
        }
    }
}
