use serde::{Deserialize, Serialize};

use super::{BuildContext, ConfigEditor};
use crate::error::ValidationErrors;
use crate::form::fields::{NumberInput, optional_text};
use crate::monitor::MonitorType;
use crate::monitor::config::{Comparison, PrometheusConfig};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrometheusEditor {
    pub query: String,
    pub comparison: Option<Comparison>,
    pub warning_threshold: NumberInput,
    pub critical_threshold: NumberInput,
}

impl ConfigEditor for PrometheusEditor {
    type Block = PrometheusConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &PrometheusConfig) -> Self {
        Self {
            query: block.query.clone(),
            comparison: block.comparison,
            warning_threshold: NumberInput::from_optional(block.warning_threshold),
            critical_threshold: NumberInput::from_optional(block.critical_threshold),
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<PrometheusConfig> {
        let warning = self.warning_threshold.read::<f64>(&ctx.field("warningThreshold"));
        let critical = self.critical_threshold.read::<f64>(&ctx.field("criticalThreshold"));

        if let (Some(comparison), Some(warning), Some(critical)) = (self.comparison, warning, critical) {
            let ordered = match comparison {
                Comparison::Gt | Comparison::Gte => warning <= critical,
                Comparison::Lt | Comparison::Lte => warning >= critical,
                Comparison::Eq | Comparison::Ne => true,
            };
            if !ordered {
                errors.push(
                    ctx.field("warningThreshold"),
                    "Warning threshold must be reached before the critical threshold",
                );
            }
        }

        let Some(query) = optional_text(&self.query) else {
            errors.push(ctx.field("query"), "PromQL query is required");
            return None;
        };
        Some(PrometheusConfig {
            query,
            comparison: self.comparison,
            warning_threshold: warning,
            critical_threshold: critical,
        })
    }
}
