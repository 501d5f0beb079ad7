pub mod audio_handlers;
pub mod audio_service;

pub use audio_service::AudioService;
