#![forbid(unsafe_code)]

pub mod config;
pub mod model;
pub mod search;

pub use config::StorageKeys;
