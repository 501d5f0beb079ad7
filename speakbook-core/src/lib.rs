//! # SpeakBook Core
//!
//! Core library for the SpeakBook backend, providing the domain types,
//! transfer objects, pagination convention, and storage backends shared by
//! the HTTP server.
//!
//! ## Overview
//!
//! - **Books**: interactive picture books with clickable audio hotspots and
//!   a draft/published lifecycle
//! - **Audios**: standalone audio assets referenced by hotspots
//! - **Students**: student records with application-level email uniqueness
//! - **Pagination**: one offset/limit convention reused by every paged
//!   listing
//! - **Database Abstraction**: trait-based storage interface with
//!   PostgreSQL and in-memory backends
//!
//! ## Architecture
//!
//! - [`api_types`]: the `{success, data, message}` response envelope
//! - [`book`], [`audio`], [`student`]: entities, wire DTOs, and converters
//! - [`pagination`]: page request normalization and page response derivation
//! - [`database`]: the [`Database`](database::Database) facade and its
//!   backends

pub mod api_types;
pub mod audio;
pub mod book;
pub mod database;
pub mod error;
pub mod pagination;
pub mod student;

pub use api_types::ApiResponse;
pub use database::Database;
pub use error::{Result, SpeakBookError};
pub use pagination::{PageRequest, PageResponse, SortDirection, SortSpec};
