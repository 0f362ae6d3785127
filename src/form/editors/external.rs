//! Checks that watch other status sources: third-party status pages and
//! aggregates over existing monitors.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::{BuildContext, ConfigEditor};
use crate::error::ValidationErrors;
use crate::form::fields::{ListField, NumberInput, join_list, optional_text, parse_list};
use crate::monitor::MonitorType;
use crate::monitor::config::{AggregateConfig, AggregateMode, ExternalStatusConfig, StatusProvider};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalStatusEditor {
    pub provider: Option<StatusProvider>,
    pub page_url: String,
    pub component_ids: String,
}

impl ConfigEditor for ExternalStatusEditor {
    type Block = ExternalStatusConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &ExternalStatusConfig) -> Self {
        Self {
            provider: Some(block.provider),
            page_url: block.page_url.clone().unwrap_or_default(),
            component_ids: join_list(&block.component_ids),
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<ExternalStatusConfig> {
        let page_url = optional_text(&self.page_url);
        if let Some(page_url) = &page_url {
            if Url::parse(page_url).is_err() {
                errors.push(ctx.field("pageUrl"), "Status page URL is not a valid URL");
            }
        }

        let Some(provider) = self.provider else {
            errors.push(ctx.field("provider"), "Provider is required");
            return None;
        };
        if provider == StatusProvider::Custom && page_url.is_none() {
            errors.push(ctx.field("pageUrl"), "A custom provider needs a status page URL");
        }
        Some(ExternalStatusConfig {
            provider,
            page_url,
            component_ids: parse_list(&self.component_ids),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateEditor {
    pub monitor_ids: ListField<String>,
    pub mode: AggregateMode,
    pub threshold_percent: NumberInput,
}

impl ConfigEditor for AggregateEditor {
    type Block = AggregateConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &AggregateConfig) -> Self {
        Self {
            monitor_ids: block.monitor_ids.iter().cloned().collect(),
            mode: block.mode,
            threshold_percent: NumberInput::from_optional(block.threshold_percent),
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<AggregateConfig> {
        let mut monitor_ids: Vec<String> = Vec::new();
        for id in self.monitor_ids.iter().filter_map(|id| optional_text(id.as_str())) {
            if !monitor_ids.contains(&id) {
                monitor_ids.push(id);
            }
        }
        if monitor_ids.is_empty() {
            errors.push(ctx.field("monitorIds"), "Select at least one monitor");
        }

        let field = ctx.field("thresholdPercent");
        let threshold_percent = match self.mode {
            AggregateMode::Threshold => {
                let value = self.threshold_percent.read_in_range(&field, 1.0, 100.0, errors);
                if self.threshold_percent.value::<f64>().is_none() {
                    errors.push(field, "Threshold is required in threshold mode");
                }
                value
            }
            AggregateMode::AllUp | AggregateMode::AnyUp => None,
        };

        Some(AggregateConfig {
            monitor_ids,
            mode: self.mode,
            threshold_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_provider_needs_page_url() {
        let ctx = BuildContext {
            monitor_type: MonitorType::ExternalStatus,
            url: "https://status.example.com",
        };
        let mut errors = ValidationErrors::new();
        assert!(ExternalStatusEditor::default().build(&ctx, &mut errors).is_none());
        assert!(errors.for_field("config.externalStatus.provider").is_some());

        let editor = ExternalStatusEditor {
            provider: Some(StatusProvider::Custom),
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        editor.build(&ctx, &mut errors);
        assert!(errors.for_field("config.externalStatus.pageUrl").is_some());
    }

    #[test]
    fn test_aggregate_threshold_mode() {
        let ctx = BuildContext {
            monitor_type: MonitorType::Aggregate,
            url: "",
        };
        let mut editor = AggregateEditor::default();
        editor.monitor_ids.append("mon-1".into());
        editor.monitor_ids.append("mon-2".into());
        editor.monitor_ids.append("mon-1".into());
        editor.mode = AggregateMode::Threshold;

        let mut errors = ValidationErrors::new();
        editor.build(&ctx, &mut errors);
        assert_eq!(
            errors.for_field("config.aggregate.thresholdPercent"),
            Some("Threshold is required in threshold mode")
        );

        editor.threshold_percent.set("50");
        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx, &mut errors).unwrap();
        assert!(errors.is_empty());
        assert_eq!(config.monitor_ids, vec!["mon-1", "mon-2"]);
        assert_eq!(config.threshold_percent, Some(50.0));
    }

    #[test]
    fn test_aggregate_needs_members_and_ignores_stale_threshold() {
        let ctx = BuildContext {
            monitor_type: MonitorType::Aggregate,
            url: "",
        };
        let editor = AggregateEditor {
            threshold_percent: NumberInput::new("75"),
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx, &mut errors).unwrap();
        assert!(errors.for_field("config.aggregate.monitorIds").is_some());
        assert_eq!(config.threshold_percent, None);
    }
}
