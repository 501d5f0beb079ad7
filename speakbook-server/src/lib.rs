//! # SpeakBook Server
//!
//! REST backend for the SpeakBook interactive speaking-book application:
//! book CRUD with a draft/published lifecycle and embedded audio hotspots,
//! standalone audio assets, student records, and a proxy that forwards file
//! uploads to an external file host.
//!
//! Every JSON response is wrapped in the `{success, data, message}`
//! envelope; domain-level failures are reported through the envelope, not
//! through HTTP status codes.

pub mod audios;
pub mod books;
pub mod errors;
pub mod infra;
pub mod routes;
pub mod students;
pub mod upload;

pub use errors::{AppError, AppResult};
pub use infra::{app_state::AppState, config::Config};
