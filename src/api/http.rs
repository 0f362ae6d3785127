use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url, header};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{
    BulkCreateDependencies, ErrorBody, Monitor, MonitorDependency, MonitorPayload, RegionsResponse,
};
use super::{ApiError, MonitorApi};
use crate::config::ClientConfig;
use crate::version::user_agent;

/// Percent-encodes an id for use as one path segment. Ids that would be read
/// as dot segments are refused.
fn segment(id: &str) -> Result<Cow<'_, str>, ApiError> {
    if matches!(id, "" | "." | "..") {
        return Err(ApiError::InvalidId(id.to_string()));
    }
    Ok(urlencoding::encode(id))
}

/// [`MonitorApi`] over HTTP + JSON.
pub struct HttpMonitorApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpMonitorApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut base = config.api_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ApiError::InvalidConfiguration(format!("Invalid API base URL {base}: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidConfiguration(format!("Invalid API path {path}: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        debug!(%method, %url, "Sending API request.");
        let mut builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        warn!(status = status.as_u16(), %message, "API request failed.");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::check(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn empty(builder: RequestBuilder) -> Result<(), ApiError> {
        Self::check(builder.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl MonitorApi for HttpMonitorApi {
    async fn create_monitor(&self, payload: &MonitorPayload) -> Result<Monitor, ApiError> {
        Self::json(self.request(Method::POST, "monitors")?.json(payload)).await
    }

    async fn update_monitor(&self, id: &str, payload: &MonitorPayload) -> Result<Monitor, ApiError> {
        let path = format!("monitors/{}", segment(id)?);
        Self::json(self.request(Method::PUT, &path)?.json(payload)).await
    }

    async fn get_monitor(&self, id: &str) -> Result<Monitor, ApiError> {
        Self::json(self.request(Method::GET, &format!("monitors/{}", segment(id)?))?).await
    }

    async fn list_monitors(&self) -> Result<Vec<Monitor>, ApiError> {
        Self::json(self.request(Method::GET, "monitors")?).await
    }

    async fn list_dependencies(&self, id: &str) -> Result<Vec<MonitorDependency>, ApiError> {
        Self::json(self.request(Method::GET, &format!("monitors/{}/dependencies", segment(id)?))?).await
    }

    async fn bulk_create_dependencies(&self, request: &BulkCreateDependencies) -> Result<(), ApiError> {
        Self::empty(self.request(Method::POST, "monitor-dependencies/bulk")?.json(request)).await
    }

    async fn delete_dependency(&self, id: &str) -> Result<(), ApiError> {
        Self::empty(self.request(Method::DELETE, &format!("monitor-dependencies/{}", segment(id)?))?).await
    }

    async fn list_regions(&self) -> Result<RegionsResponse, ApiError> {
        Self::json(self.request(Method::GET, "regions")?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> ClientConfig {
        ClientConfig {
            api_base_url: base.to_string(),
            api_token: None,
            request_timeout_secs: 5,
            selector_cache_ttl_secs: 30,
            log_dir: "logs".to_string(),
        }
    }

    #[test]
    fn test_paths_join_under_base_prefix() {
        let api = HttpMonitorApi::new(&config("https://api.example.com/v1")).unwrap();
        assert_eq!(
            api.url("monitors/abc").unwrap().as_str(),
            "https://api.example.com/v1/monitors/abc"
        );
        assert_eq!(
            api.url("/regions").unwrap().as_str(),
            "https://api.example.com/v1/regions"
        );
    }

    #[test]
    fn test_ids_stay_inside_their_segment() {
        let api = HttpMonitorApi::new(&config("https://api.example.com/v1")).unwrap();
        let path = |id: &str| api.url(&format!("monitors/{}", segment(id).unwrap())).unwrap();

        assert_eq!(
            path("../regions").as_str(),
            "https://api.example.com/v1/monitors/..%2Fregions"
        );
        let query = path("a?b=1");
        assert_eq!(query.path(), "/v1/monitors/a%3Fb%3D1");
        assert_eq!(query.query(), None);
        let fragment = path("x#y");
        assert_eq!(fragment.path(), "/v1/monitors/x%23y");
        assert_eq!(fragment.fragment(), None);

        for id in ["", ".", ".."] {
            assert!(matches!(segment(id), Err(ApiError::InvalidId(_))), "{id:?}");
        }
        assert_eq!(path("%2e%2e").path(), "/v1/monitors/%252e%252e");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = HttpMonitorApi::new(&config("not a url"));
        assert!(matches!(result, Err(ApiError::InvalidConfiguration(_))));
    }
}
