//! The monitor form: shared fields, the active type's editor and the submit
//! state machine.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::dependencies::DependencyEditor;
use super::editors::{BuildContext, ConfigDraft};
use super::fields::{ListField, NumberInput, optional_text};
use crate::api::models::{Monitor, MonitorDependency, MonitorId, MonitorPayload};
use crate::api::{ApiError, MonitorApi};
use crate::error::{SubmitError, ValidationErrors};
use crate::monitor::{MonitorType, TypeSelection, UnknownMonitorType, suggest_monitor_type};

pub const DEFAULT_INTERVAL_SECS: u32 = 60;
pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;
pub const MAX_NAME_LEN: usize = 255;
const INTERVAL_RANGE: (u32, u32) = (10, 86_400);
const TIMEOUT_RANGE: (u32, u32) = (100, 120_000);

/// Fields every monitor has regardless of type. These survive type changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedFields {
    pub name: String,
    pub description: String,
    pub url: String,
    pub interval_seconds: NumberInput,
    pub timeout_ms: NumberInput,
    pub regions: ListField<String>,
}

impl Default for SharedFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            url: String::new(),
            interval_seconds: NumberInput::from_value(DEFAULT_INTERVAL_SECS),
            timeout_ms: NumberInput::from_value(DEFAULT_TIMEOUT_MS),
            regions: ListField::new(),
        }
    }
}

impl SharedFields {
    fn from_monitor(monitor: &Monitor) -> Self {
        Self {
            name: monitor.name.clone(),
            description: monitor.description.clone().unwrap_or_default(),
            url: monitor.url.clone().unwrap_or_default(),
            interval_seconds: NumberInput::from_value(monitor.interval_seconds),
            timeout_ms: NumberInput::from_value(monitor.timeout_ms),
            regions: monitor.regions.iter().cloned().collect(),
        }
    }

    /// Checked target for `monitor_type`, normalized for URL-based types.
    fn target(&self, monitor_type: MonitorType, errors: &mut ValidationErrors) -> Option<String> {
        let metadata = monitor_type.metadata();
        if !metadata.requires_url {
            return None;
        }
        let Some(raw) = optional_text(&self.url) else {
            errors.push("url", format!("{} is required", metadata.url_field_label));
            return None;
        };

        let schemes: &[&str] = match monitor_type {
            MonitorType::Http | MonitorType::Https | MonitorType::Keyword | MonitorType::JsonQuery | MonitorType::Cdn => {
                &["http", "https"]
            }
            MonitorType::Websocket => &["ws", "wss"],
            _ => return Some(raw),
        };
        let candidate = if raw.contains("://") {
            raw
        } else {
            let scheme = if monitor_type == MonitorType::Http { "http" } else { schemes[1] };
            format!("{scheme}://{raw}")
        };
        match Url::parse(&candidate) {
            Ok(url) if schemes.contains(&url.scheme()) && url.host_str().is_some() => Some(candidate),
            Ok(url) => {
                errors.push("url", format!("Unsupported scheme '{}'", url.scheme()));
                None
            }
            Err(e) => {
                errors.push("url", format!("Invalid URL: {e}"));
                None
            }
        }
    }
}

/// Shared values after validation.
struct CheckedShared {
    name: String,
    description: Option<String>,
    url: Option<String>,
    interval_seconds: u32,
    timeout_ms: u32,
    regions: Vec<String>,
}

fn check_shared(shared: &SharedFields, monitor_type: MonitorType, errors: &mut ValidationErrors) -> CheckedShared {
    let name = shared.name.trim().to_string();
    if name.is_empty() {
        errors.push("name", "Name is required");
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push("name", format!("Name must be at most {MAX_NAME_LEN} characters"));
    }

    let interval_seconds = shared
        .interval_seconds
        .read_in_range("intervalSeconds", INTERVAL_RANGE.0, INTERVAL_RANGE.1, errors)
        .unwrap_or(DEFAULT_INTERVAL_SECS);
    let timeout_ms = shared
        .timeout_ms
        .read_in_range("timeoutMs", TIMEOUT_RANGE.0, TIMEOUT_RANGE.1, errors)
        .unwrap_or(DEFAULT_TIMEOUT_MS);
    if u64::from(timeout_ms) >= u64::from(interval_seconds) * 1000 {
        errors.push("timeoutMs", "Timeout must be shorter than the check interval");
    }

    let mut regions: Vec<String> = Vec::new();
    for region in shared.regions.iter().filter_map(|r| optional_text(r.as_str())) {
        if !regions.contains(&region) {
            regions.push(region);
        }
    }

    CheckedShared {
        name,
        description: optional_text(&shared.description),
        url: shared.target(monitor_type, errors),
        interval_seconds,
        timeout_ms,
        regions,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    Create,
    Edit { monitor_id: MonitorId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Submitting,
    Succeeded,
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub monitor: Monitor,
}

/// Serializable snapshot of the form inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDraft {
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    #[serde(flatten)]
    pub shared: SharedFields,
    pub config: ConfigDraft,
}

#[derive(Debug, Clone)]
pub struct FormSession {
    mode: SessionMode,
    monitor_type: MonitorType,
    shared: SharedFields,
    draft: ConfigDraft,
    selection: TypeSelection,
    phase: FormPhase,
    dependencies: Option<DependencyEditor>,
    /// Last update that reached the server, reused while only dependency
    /// steps remain to be applied.
    saved: Option<(MonitorPayload, Monitor)>,
}

impl FormSession {
    pub fn new(monitor_type: MonitorType) -> Self {
        Self {
            mode: SessionMode::Create,
            monitor_type,
            shared: SharedFields::default(),
            draft: ConfigDraft::defaults_for(monitor_type),
            selection: TypeSelection::Auto,
            phase: FormPhase::Idle,
            dependencies: None,
            saved: None,
        }
    }

    /// Edit session for a persisted monitor. Auto-detection is off from the
    /// start so the stored type is never replaced by a guess.
    pub fn from_monitor(monitor: &Monitor, dependencies: Vec<MonitorDependency>) -> Result<Self, UnknownMonitorType> {
        let monitor_type = monitor.editable_type()?;
        Ok(Self {
            mode: SessionMode::Edit {
                monitor_id: monitor.id.clone(),
            },
            monitor_type,
            shared: SharedFields::from_monitor(monitor),
            draft: ConfigDraft::hydrate(monitor_type, monitor.config.as_ref()),
            selection: TypeSelection::UserOverridden,
            phase: FormPhase::Idle,
            dependencies: Some(DependencyEditor::new(monitor.id.clone(), dependencies)),
            saved: None,
        })
    }

    /// Fetches a monitor and its dependencies and opens an edit session.
    pub async fn load(api: &dyn MonitorApi, monitor_id: &str) -> Result<Self, ApiError> {
        let monitor = api.get_monitor(monitor_id).await?;
        if let Err(e) = monitor.editable_type() {
            warn!(monitor_id, error = %e, "Refusing to edit monitor");
            return Err(e.into());
        }
        let dependencies = api.list_dependencies(monitor_id).await?;
        debug!(monitor_id, dependencies = dependencies.len(), "Loaded monitor for editing");
        Ok(Self::from_monitor(&monitor, dependencies)?)
    }

    /// Create session from a snapshot. The snapshot's editor is used only if
    /// it belongs to the snapshot's type.
    pub fn from_draft(draft: FormDraft) -> Self {
        let mut session = Self::new(draft.monitor_type);
        session.apply_draft(draft);
        session
    }

    /// Replaces every input with the snapshot's, keeping the session mode
    /// and staged dependency edits.
    pub fn apply_draft(&mut self, draft: FormDraft) {
        self.select_type(draft.monitor_type);
        self.shared = draft.shared;
        self.draft = if draft.config.block() == draft.monitor_type.config_block() {
            draft.config
        } else {
            ConfigDraft::defaults_for(draft.monitor_type)
        };
    }

    pub fn to_draft(&self) -> FormDraft {
        FormDraft {
            monitor_type: self.monitor_type,
            shared: self.shared.clone(),
            config: self.draft.clone(),
        }
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn monitor_type(&self) -> MonitorType {
        self.monitor_type
    }

    pub fn selection(&self) -> TypeSelection {
        self.selection
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn shared(&self) -> &SharedFields {
        &self.shared
    }

    pub fn shared_mut(&mut self) -> &mut SharedFields {
        &mut self.shared
    }

    pub fn config(&self) -> &ConfigDraft {
        &self.draft
    }

    pub fn config_mut(&mut self) -> &mut ConfigDraft {
        &mut self.draft
    }

    pub fn dependencies(&self) -> Option<&DependencyEditor> {
        self.dependencies.as_ref()
    }

    pub fn dependencies_mut(&mut self) -> Option<&mut DependencyEditor> {
        self.dependencies.as_mut()
    }

    /// Type picked by the user. Auto-detection stays off afterwards.
    pub fn select_type(&mut self, monitor_type: MonitorType) {
        self.selection = TypeSelection::UserOverridden;
        self.change_type(monitor_type);
    }

    /// Stores the target and, while detection is allowed, follows its
    /// suggestion.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.shared.url = url.into();
        if !self.selection.allows_detection() {
            return;
        }
        if let Some(suggested) = suggest_monitor_type(&self.shared.url, self.monitor_type) {
            debug!(from = %self.monitor_type, to = %suggested, "Detected monitor type from target");
            self.change_type(suggested);
        }
    }

    fn change_type(&mut self, monitor_type: MonitorType) {
        if monitor_type == self.monitor_type {
            return;
        }
        let draft = ConfigDraft::defaults_for(monitor_type);
        (self.monitor_type, self.draft) = (monitor_type, draft);
    }

    /// Validates every input and assembles the create/update body.
    pub fn build_payload(&self) -> Result<MonitorPayload, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let shared = check_shared(&self.shared, self.monitor_type, &mut errors);
        let ctx = BuildContext {
            monitor_type: self.monitor_type,
            url: shared.url.as_deref().unwrap_or_default(),
        };
        let Some(config) = self.draft.build(&ctx, &mut errors) else {
            return Err(errors);
        };
        errors.into_result(MonitorPayload {
            name: shared.name,
            description: shared.description,
            monitor_type: self.monitor_type,
            url: shared.url,
            interval_seconds: shared.interval_seconds,
            timeout_ms: shared.timeout_ms,
            regions: shared.regions,
            config,
        })
    }

    /// Saves the monitor, then applies staged dependency edits.
    ///
    /// Any failure leaves the session `Idle` with every input intact. When
    /// the save went through but a dependency step failed, the error names
    /// that step; submitting again skips what was already applied.
    pub async fn submit(&mut self, api: &dyn MonitorApi) -> Result<SubmitOutcome, SubmitError> {
        if self.phase == FormPhase::Succeeded {
            return Err(SubmitError::AlreadySubmitted);
        }
        let payload = match self.build_payload() {
            Ok(payload) => payload,
            Err(errors) => {
                warn!(monitor_type = %self.monitor_type, errors = errors.len(), "Monitor form is invalid");
                return Err(errors.into());
            }
        };

        self.phase = FormPhase::Submitting;
        let monitor = match self.save(api, &payload).await {
            Ok(monitor) => monitor,
            Err(e) => {
                self.phase = FormPhase::Idle;
                warn!(monitor_type = %self.monitor_type, error = %e, "Failed to save monitor");
                return Err(e.into());
            }
        };

        if let Some(dependencies) = self.dependencies.as_mut() {
            if let Err(failure) = dependencies.commit(api).await {
                self.phase = FormPhase::Idle;
                return Err(SubmitError::Dependency {
                    step: failure.step,
                    monitor: Box::new(monitor),
                    source: failure.source,
                });
            }
        }

        self.phase = FormPhase::Succeeded;
        info!(monitor_id = %monitor.id, monitor_type = %monitor.monitor_type, "Monitor saved");
        Ok(SubmitOutcome { monitor })
    }

    async fn save(&mut self, api: &dyn MonitorApi, payload: &MonitorPayload) -> Result<Monitor, ApiError> {
        match &self.mode {
            SessionMode::Create => api.create_monitor(payload).await,
            SessionMode::Edit { monitor_id } => {
                if let Some((saved_payload, monitor)) = &self.saved {
                    if saved_payload == payload {
                        debug!(monitor_id = %monitor_id, "Monitor unchanged since last save, skipping update");
                        return Ok(monitor.clone());
                    }
                }
                let monitor = api.update_monitor(monitor_id, payload).await?;
                self.saved = Some((payload.clone(), monitor.clone()));
                Ok(monitor)
            }
        }
    }
}
