use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::monitor::{MonitorConfig, MonitorType, UnknownMonitorType};

pub type MonitorId = String;
pub type DependencyId = String;

/// Type tag of a stored monitor. Tags this client does not know are kept as
/// text so that listing still works; such monitors cannot be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonitorTypeTag {
    Known(MonitorType),
    Unknown(String),
}

impl MonitorTypeTag {
    pub fn known(&self) -> Option<MonitorType> {
        match self {
            MonitorTypeTag::Known(t) => Some(*t),
            MonitorTypeTag::Unknown(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MonitorTypeTag::Known(t) => t.as_str(),
            MonitorTypeTag::Unknown(tag) => tag,
        }
    }
}

impl From<MonitorType> for MonitorTypeTag {
    fn from(t: MonitorType) -> Self {
        MonitorTypeTag::Known(t)
    }
}

impl fmt::Display for MonitorTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A monitor as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "MonitorRecord")]
pub struct Monitor {
    pub id: MonitorId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub monitor_type: MonitorTypeTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub interval_seconds: u32,
    pub timeout_ms: u32,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<MonitorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Monitor {
    /// The monitor's type, if this client knows how to edit it.
    pub fn editable_type(&self) -> Result<MonitorType, UnknownMonitorType> {
        self.monitor_type
            .known()
            .ok_or_else(|| UnknownMonitorType(self.monitor_type.as_str().to_string()))
    }
}

/// Monitor as it arrives on the wire, before the settings block is resolved.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonitorRecord {
    id: MonitorId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "type")]
    monitor_type: MonitorTypeTag,
    #[serde(default)]
    url: Option<String>,
    interval_seconds: u32,
    timeout_ms: u32,
    #[serde(default)]
    regions: Vec<String>,
    #[serde(default)]
    config: Option<serde_json::Value>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<MonitorRecord> for Monitor {
    type Error = String;

    fn try_from(record: MonitorRecord) -> Result<Self, Self::Error> {
        let config = resolve_config(&record.monitor_type, record.config).map_err(|e| e.to_string())?;
        Ok(Monitor {
            id: record.id,
            name: record.name,
            description: record.description,
            monitor_type: record.monitor_type,
            url: record.url,
            interval_seconds: record.interval_seconds,
            timeout_ms: record.timeout_ms,
            regions: record.regions,
            config,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Picks the settings block out of a stored `config` object.
///
/// Null entries are ignored and an empty object means no settings. When
/// several blocks are present the one belonging to the monitor's type wins.
/// A lone block under another key is taken if it decodes and skipped
/// otherwise.
fn resolve_config(
    monitor_type: &MonitorTypeTag,
    config: Option<serde_json::Value>,
) -> Result<Option<MonitorConfig>, serde_json::Error> {
    let Some(serde_json::Value::Object(mut blocks)) = config else {
        return Ok(None);
    };
    blocks.retain(|_, value| !value.is_null());

    if let Some(entry) = monitor_type
        .known()
        .and_then(|t| blocks.remove_entry(t.config_block().key()))
    {
        return single_block(entry).map(Some);
    }
    if blocks.len() != 1 {
        if !blocks.is_empty() {
            debug!(monitor_type = %monitor_type, keys = blocks.len(), "No settings block for monitor type");
        }
        return Ok(None);
    }
    Ok(blocks.into_iter().next().and_then(|entry| single_block(entry).ok()))
}

fn single_block((key, value): (String, serde_json::Value)) -> Result<MonitorConfig, serde_json::Error> {
    let mut single = serde_json::Map::new();
    single.insert(key, value);
    serde_json::from_value(serde_json::Value::Object(single))
}

/// Body of create and update calls: shared fields plus the one settings
/// block that belongs to `monitor_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub interval_seconds: u32,
    pub timeout_ms: u32,
    #[serde(default)]
    pub regions: Vec<String>,
    pub config: MonitorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorDependency {
    pub id: DependencyId,
    pub downstream_monitor_id: MonitorId,
    pub upstream_monitor_id: MonitorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateDependencies {
    pub downstream_monitor_id: MonitorId,
    pub upstream_monitor_ids: Vec<MonitorId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionsResponse {
    pub regions: Vec<String>,
    pub default: String,
    pub is_empty: bool,
}

/// Error body returned by the API on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::config::TcpConfig;

    fn monitor_json(monitor_type: &str, config: &str) -> String {
        format!(
            r#"{{"id":"m1","name":"Edge","type":"{monitor_type}","url":"db.internal:22","intervalSeconds":60,"timeoutMs":10000,"config":{config}}}"#
        )
    }

    #[test]
    fn test_empty_config_object_decodes_as_no_settings() {
        let monitor: Monitor = serde_json::from_str(&monitor_json("tcp", "{}")).unwrap();
        assert_eq!(monitor.config, None);
        assert_eq!(monitor.editable_type(), Ok(MonitorType::Tcp));

        let monitor: Monitor = serde_json::from_str(&monitor_json("tcp", "null")).unwrap();
        assert_eq!(monitor.config, None);
    }

    #[test]
    fn test_flat_config_picks_the_block_of_the_monitor_type() {
        let json = monitor_json("tcp", r#"{"http":{"method":"GET"},"dns":null,"tcp":{"port":22}}"#);
        let monitor: Monitor = serde_json::from_str(&json).unwrap();
        assert_eq!(
            monitor.config,
            Some(MonitorConfig::Tcp(TcpConfig {
                port: Some(22),
                ..Default::default()
            }))
        );

        let json = monitor_json("tcp", r#"{"http":{},"dns":{}}"#);
        let monitor: Monitor = serde_json::from_str(&json).unwrap();
        assert_eq!(monitor.config, None);
    }

    #[test]
    fn test_unknown_type_still_lists() {
        let json = format!("[{},{}]", monitor_json("https", "{}"), monitor_json("traceroute", r#"{"hops":30}"#));
        let monitors: Vec<Monitor> = serde_json::from_str(&json).unwrap();
        assert_eq!(monitors.len(), 2);
        assert_eq!(monitors[0].monitor_type, MonitorTypeTag::Known(MonitorType::Https));
        assert_eq!(monitors[1].monitor_type.as_str(), "traceroute");
        assert_eq!(monitors[1].config, None);
        assert_eq!(
            monitors[1].editable_type(),
            Err(UnknownMonitorType("traceroute".to_string()))
        );

        let back = serde_json::to_value(&monitors[1]).unwrap();
        assert_eq!(back["type"], "traceroute");
    }
}
