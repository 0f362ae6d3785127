use serde::{Deserialize, Serialize};

use super::{BuildContext, ConfigEditor};
use crate::error::ValidationErrors;
use crate::form::fields::NumberInput;
use crate::monitor::MonitorType;
use crate::monitor::config::{DEFAULT_HEARTBEAT_GRACE_SECS, DEFAULT_HEARTBEAT_INTERVAL_SECS, HeartbeatConfig};

const MAX_HEARTBEAT_SECS: u32 = 30 * 24 * 60 * 60;

/// Push-based check. Blank inputs fall back to the defaults when built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatEditor {
    pub expected_interval: NumberInput,
    pub grace_period: NumberInput,
}

impl ConfigEditor for HeartbeatEditor {
    type Block = HeartbeatConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &HeartbeatConfig) -> Self {
        Self {
            expected_interval: NumberInput::from_value(block.expected_interval),
            grace_period: NumberInput::from_value(block.grace_period),
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<HeartbeatConfig> {
        let expected_interval = self
            .expected_interval
            .read_in_range(&ctx.field("expectedInterval"), 1, MAX_HEARTBEAT_SECS, errors)
            .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL_SECS);
        let grace_period = self
            .grace_period
            .read_in_range(&ctx.field("gracePeriod"), 0, MAX_HEARTBEAT_SECS, errors)
            .unwrap_or(DEFAULT_HEARTBEAT_GRACE_SECS);
        Some(HeartbeatConfig {
            expected_interval,
            grace_period,
        })
    }
}
