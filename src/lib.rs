pub mod app;
pub mod config;
pub mod config_store;
pub mod error;
pub mod iced_ui;
pub mod interfaces;
pub mod logging;
pub mod providers;
pub mod quiz;
pub mod runtime_paths;
pub mod syllabus;

pub use error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
