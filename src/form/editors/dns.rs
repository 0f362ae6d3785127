use serde::{Deserialize, Serialize};

use super::{BuildContext, ConfigEditor};
use crate::error::ValidationErrors;
use crate::form::fields::{ListField, NumberInput, join_list, optional_text, parse_list};
use crate::monitor::MonitorType;
use crate::monitor::config::{DnsConfig, DnsRecordType, Resolver, ResolverKind};

/// One row of the resolver list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverInput {
    pub endpoint: String,
    pub kind: ResolverKind,
    pub region: String,
    pub name: String,
}

impl ResolverInput {
    pub fn new(endpoint: impl Into<String>, kind: ResolverKind) -> Self {
        Self {
            endpoint: endpoint.into(),
            kind,
            ..Default::default()
        }
    }

    fn build(&self, field: &str, errors: &mut ValidationErrors) -> Option<Resolver> {
        let Some(endpoint) = optional_text(&self.endpoint) else {
            errors.push(format!("{field}.endpoint"), "Endpoint is required");
            return None;
        };
        if self.kind == ResolverKind::Doh && !endpoint.to_ascii_lowercase().starts_with("https://") {
            errors.push(format!("{field}.endpoint"), "DNS-over-HTTPS endpoints must start with https://");
            return None;
        }
        Some(Resolver {
            endpoint,
            kind: self.kind,
            region: optional_text(&self.region),
            name: optional_text(&self.name),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsEditor {
    pub record_type: DnsRecordType,
    pub nameserver: String,
    pub expected_values: String,
    pub resolvers: ListField<ResolverInput>,
    pub propagation_check: Option<bool>,
    pub propagation_threshold: NumberInput,
}

impl ConfigEditor for DnsEditor {
    type Block = DnsConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &DnsConfig) -> Self {
        Self {
            record_type: block.record_type,
            nameserver: block.nameserver.clone().unwrap_or_default(),
            expected_values: join_list(&block.expected_values),
            resolvers: block
                .resolvers
                .iter()
                .map(|r| ResolverInput {
                    endpoint: r.endpoint.clone(),
                    kind: r.kind,
                    region: r.region.clone().unwrap_or_default(),
                    name: r.name.clone().unwrap_or_default(),
                })
                .collect(),
            propagation_check: block.propagation_check,
            propagation_threshold: NumberInput::from_optional(block.propagation_threshold),
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<DnsConfig> {
        let resolvers: Vec<Resolver> = self
            .resolvers
            .iter()
            .enumerate()
            .filter_map(|(index, input)| input.build(&ctx.field(&format!("resolvers[{index}]")), errors))
            .collect();

        if self.propagation_check == Some(true) && self.resolvers.is_empty() {
            errors.push(ctx.field("resolvers"), "Add at least one resolver to check propagation");
        }

        Some(DnsConfig {
            record_type: self.record_type,
            nameserver: optional_text(&self.nameserver),
            expected_values: parse_list(&self.expected_values),
            resolvers,
            propagation_check: self.propagation_check,
            propagation_threshold: self.propagation_threshold.read_in_range(
                &ctx.field("propagationThreshold"),
                1,
                100,
                errors,
            ),
        })
    }
}
