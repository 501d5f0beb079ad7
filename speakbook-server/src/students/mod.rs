pub mod student_handlers;
pub mod student_service;

pub use student_service::StudentService;
