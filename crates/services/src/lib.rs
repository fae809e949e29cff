#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod preferences_service;
pub mod progress_service;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProgressError};
pub use preferences_service::PreferencesService;
pub use progress_service::{ChangeCause, ProgressService, StoreChange};
