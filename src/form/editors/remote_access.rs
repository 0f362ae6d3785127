use serde::{Deserialize, Serialize};

use super::database::service_port;
use super::{BuildContext, ConfigEditor};
use crate::error::ValidationErrors;
use crate::form::fields::{NumberInput, optional_raw, optional_text};
use crate::monitor::MonitorType;
use crate::monitor::config::RemoteAccessConfig;

/// SSH, RDP and FTP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteAccessEditor {
    pub port: NumberInput,
    pub username: String,
    pub password: String,
    pub expected_banner: String,
}

impl ConfigEditor for RemoteAccessEditor {
    type Block = RemoteAccessConfig;

    fn defaults(monitor_type: MonitorType) -> Self {
        Self {
            port: NumberInput::from_optional(monitor_type.metadata().default_port),
            ..Default::default()
        }
    }

    fn hydrate(block: &RemoteAccessConfig) -> Self {
        Self {
            port: NumberInput::from_optional(block.port),
            username: block.username.clone().unwrap_or_default(),
            password: block.password.clone().unwrap_or_default(),
            expected_banner: block.expected_banner.clone().unwrap_or_default(),
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<RemoteAccessConfig> {
        Some(RemoteAccessConfig {
            port: service_port(&self.port, ctx, errors),
            username: optional_text(&self.username),
            password: optional_raw(&self.password),
            expected_banner: optional_text(&self.expected_banner),
        })
    }
}
