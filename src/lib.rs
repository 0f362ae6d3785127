pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod monitor;
pub mod version;
