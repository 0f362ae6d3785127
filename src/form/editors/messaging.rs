use serde::{Deserialize, Serialize};

use super::database::service_port;
use super::{BuildContext, ConfigEditor};
use crate::error::ValidationErrors;
use crate::form::fields::{NumberInput, optional_raw, optional_text};
use crate::monitor::MonitorType;
use crate::monitor::config::BrokerConfig;

/// MQTT, AMQP and Kafka brokers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerEditor {
    pub port: NumberInput,
    pub topic: String,
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub vhost: String,
}

impl ConfigEditor for BrokerEditor {
    type Block = BrokerConfig;

    fn defaults(monitor_type: MonitorType) -> Self {
        Self {
            port: NumberInput::from_optional(monitor_type.metadata().default_port),
            vhost: if monitor_type == MonitorType::Amqp {
                "/".to_string()
            } else {
                String::new()
            },
            ..Default::default()
        }
    }

    fn hydrate(block: &BrokerConfig) -> Self {
        Self {
            port: NumberInput::from_optional(block.port),
            topic: block.topic.clone().unwrap_or_default(),
            username: block.username.clone().unwrap_or_default(),
            password: block.password.clone().unwrap_or_default(),
            client_id: block.client_id.clone().unwrap_or_default(),
            vhost: block.vhost.clone().unwrap_or_default(),
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<BrokerConfig> {
        let topic = optional_text(&self.topic);
        if ctx.monitor_type == MonitorType::Kafka && topic.is_none() {
            errors.push(ctx.field("topic"), "Topic is required for Kafka");
        }
        // vhost and client id only mean something to one protocol each
        let vhost = (ctx.monitor_type == MonitorType::Amqp)
            .then(|| optional_text(&self.vhost))
            .flatten();
        let client_id = (ctx.monitor_type == MonitorType::Mqtt)
            .then(|| optional_text(&self.client_id))
            .flatten();
        Some(BrokerConfig {
            port: service_port(&self.port, ctx, errors),
            topic,
            username: optional_text(&self.username),
            password: optional_raw(&self.password),
            client_id,
            vhost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kafka_requires_topic() {
        let ctx = BuildContext {
            monitor_type: MonitorType::Kafka,
            url: "kafka.internal",
        };
        let mut errors = ValidationErrors::new();
        let config = BrokerEditor::defaults(MonitorType::Kafka).build(&ctx, &mut errors).unwrap();
        assert_eq!(config.port, Some(9092));
        assert_eq!(errors.for_field("config.broker.topic"), Some("Topic is required for Kafka"));
    }

    #[test]
    fn test_protocol_specific_fields() {
        let mut editor = BrokerEditor::defaults(MonitorType::Amqp);
        assert_eq!(editor.vhost, "/");
        editor.client_id = "probe-1".into();

        let ctx = BuildContext {
            monitor_type: MonitorType::Amqp,
            url: "rabbit.internal",
        };
        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx, &mut errors).unwrap();
        assert_eq!(config.vhost.as_deref(), Some("/"));
        assert_eq!(config.client_id, None);
        assert_eq!(config.port, Some(5672));
        assert!(errors.is_empty());
    }
}
