//! In-memory [`MonitorApi`] used by unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::models::{
    BulkCreateDependencies, Monitor, MonitorDependency, MonitorPayload, RegionsResponse,
};
use super::{ApiError, MonitorApi};
use crate::monitor::MonitorType;

#[derive(Default)]
struct FakeState {
    monitors: HashMap<String, Monitor>,
    dependencies: Vec<MonitorDependency>,
    calls: Vec<String>,
    failing: HashSet<String>,
    next_id: u32,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
}

pub(crate) fn monitor_fixture(id: &str, name: &str) -> Monitor {
    Monitor {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        monitor_type: MonitorType::Https.into(),
        url: Some("https://example.com".to_string()),
        interval_seconds: 60,
        timeout_ms: 10_000,
        regions: vec![],
        config: None,
        created_at: None,
        updated_at: None,
    }
}

fn from_payload(id: &str, payload: &MonitorPayload) -> Monitor {
    Monitor {
        id: id.to_string(),
        name: payload.name.clone(),
        description: payload.description.clone(),
        monitor_type: payload.monitor_type.into(),
        url: payload.url.clone(),
        interval_seconds: payload.interval_seconds,
        timeout_ms: payload.timeout_ms,
        regions: payload.regions.clone(),
        config: Some(payload.config.clone()),
        created_at: None,
        updated_at: None,
    }
}

impl FakeApi {
    pub fn add_monitor(&self, monitor: Monitor) {
        let mut state = self.state.lock().unwrap();
        state.monitors.insert(monitor.id.clone(), monitor);
    }

    pub fn add_dependency(&self, dependency: MonitorDependency) {
        self.state.lock().unwrap().dependencies.push(dependency);
    }

    /// Makes every call recorded as `call` (e.g. `delete_dependency:d1`) fail.
    pub fn fail(&self, call: &str) {
        self.state.lock().unwrap().failing.insert(call.to_string());
    }

    pub fn heal(&self, call: &str) {
        self.state.lock().unwrap().failing.remove(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_named(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(':').next() == Some(name))
            .count()
    }

    pub fn dependencies(&self) -> Vec<MonitorDependency> {
        self.state.lock().unwrap().dependencies.clone()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        let name = call.split(':').next().unwrap_or_default().to_string();
        state.calls.push(call.clone());
        if state.failing.contains(&call) || state.failing.contains(&name) {
            return Err(ApiError::Status {
                status: 500,
                message: format!("{call} failed"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MonitorApi for FakeApi {
    async fn create_monitor(&self, payload: &MonitorPayload) -> Result<Monitor, ApiError> {
        self.record("create_monitor".to_string())?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let monitor = from_payload(&format!("mon-{}", state.next_id), payload);
        state.monitors.insert(monitor.id.clone(), monitor.clone());
        Ok(monitor)
    }

    async fn update_monitor(&self, id: &str, payload: &MonitorPayload) -> Result<Monitor, ApiError> {
        self.record(format!("update_monitor:{id}"))?;
        let monitor = from_payload(id, payload);
        self.state
            .lock()
            .unwrap()
            .monitors
            .insert(id.to_string(), monitor.clone());
        Ok(monitor)
    }

    async fn get_monitor(&self, id: &str) -> Result<Monitor, ApiError> {
        self.record(format!("get_monitor:{id}"))?;
        self.state
            .lock()
            .unwrap()
            .monitors
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "Monitor not found".to_string(),
            })
    }

    async fn list_monitors(&self) -> Result<Vec<Monitor>, ApiError> {
        self.record("list_monitors".to_string())?;
        let mut monitors: Vec<Monitor> = self.state.lock().unwrap().monitors.values().cloned().collect();
        monitors.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(monitors)
    }

    async fn list_dependencies(&self, id: &str) -> Result<Vec<MonitorDependency>, ApiError> {
        self.record(format!("list_dependencies:{id}"))?;
        Ok(self
            .dependencies()
            .into_iter()
            .filter(|d| d.downstream_monitor_id == id)
            .collect())
    }

    async fn bulk_create_dependencies(&self, request: &BulkCreateDependencies) -> Result<(), ApiError> {
        self.record(format!(
            "bulk_create_dependencies:{}",
            request.upstream_monitor_ids.join(",")
        ))?;
        let mut state = self.state.lock().unwrap();
        for upstream in &request.upstream_monitor_ids {
            let id = format!("dep-{}-{}", request.downstream_monitor_id, upstream);
            state.dependencies.push(MonitorDependency {
                id,
                downstream_monitor_id: request.downstream_monitor_id.clone(),
                upstream_monitor_id: upstream.clone(),
                description: None,
            });
        }
        Ok(())
    }

    async fn delete_dependency(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("delete_dependency:{id}"))?;
        self.state.lock().unwrap().dependencies.retain(|d| d.id != id);
        Ok(())
    }

    async fn list_regions(&self) -> Result<RegionsResponse, ApiError> {
        self.record("list_regions".to_string())?;
        Ok(RegionsResponse {
            regions: vec!["eu-west".to_string(), "us-east".to_string()],
            default: "eu-west".to_string(),
            is_empty: false,
        })
    }
}
