pub mod book_handlers;
pub mod book_service;

pub use book_service::BookService;
