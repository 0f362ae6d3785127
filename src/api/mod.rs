//! Client side of the monitor REST API.
//!
//! The form logic talks to the API only through [`MonitorApi`], so tests can
//! swap in an in-memory implementation.

use async_trait::async_trait;
use thiserror::Error;

pub mod cache;
pub mod http;
pub mod models;
#[cfg(test)]
pub(crate) mod testing;

pub use cache::SelectorCache;
pub use http::HttpMonitorApi;
use crate::monitor::UnknownMonitorType;
use models::{BulkCreateDependencies, Monitor, MonitorDependency, MonitorPayload, RegionsResponse};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid API configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid resource id: {0:?}")]
    InvalidId(String),
    #[error("Monitor cannot be edited by this client: {0}")]
    UnsupportedType(#[from] UnknownMonitorType),
}

#[async_trait]
pub trait MonitorApi: Send + Sync {
    async fn create_monitor(&self, payload: &MonitorPayload) -> Result<Monitor, ApiError>;

    async fn update_monitor(&self, id: &str, payload: &MonitorPayload) -> Result<Monitor, ApiError>;

    async fn get_monitor(&self, id: &str) -> Result<Monitor, ApiError>;

    async fn list_monitors(&self) -> Result<Vec<Monitor>, ApiError>;

    /// Dependencies where `id` is the downstream monitor.
    async fn list_dependencies(&self, id: &str) -> Result<Vec<MonitorDependency>, ApiError>;

    async fn bulk_create_dependencies(&self, request: &BulkCreateDependencies) -> Result<(), ApiError>;

    async fn delete_dependency(&self, id: &str) -> Result<(), ApiError>;

    async fn list_regions(&self) -> Result<RegionsResponse, ApiError>;
}
