//! TCP, UDP and ping editors.

use serde::{Deserialize, Serialize};

use super::{BuildContext, ConfigEditor};
use crate::error::ValidationErrors;
use crate::form::fields::{NumberInput, optional_raw};
use crate::monitor::MonitorType;
use crate::monitor::config::{PingConfig, TcpConfig, UdpConfig};

/// Port from the input box, else from the target's `host:port`.
fn resolve_port(input: &NumberInput, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<u16> {
    let field = ctx.field("port");
    if input.has_integer() {
        return input.read_port(&field, errors);
    }
    let port = ctx.target_port();
    if port.is_none() {
        errors.push(field, "Port is required when the host has no :port");
    }
    port
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpEditor {
    pub port: NumberInput,
    pub send_data: String,
    pub expect_data: String,
}

impl ConfigEditor for TcpEditor {
    type Block = TcpConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &TcpConfig) -> Self {
        Self {
            port: NumberInput::from_optional(block.port),
            send_data: block.send_data.clone().unwrap_or_default(),
            expect_data: block.expect_data.clone().unwrap_or_default(),
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<TcpConfig> {
        Some(TcpConfig {
            port: resolve_port(&self.port, ctx, errors),
            send_data: optional_raw(&self.send_data),
            expect_data: optional_raw(&self.expect_data),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UdpEditor {
    pub port: NumberInput,
    pub payload: String,
    pub expect_response: Option<bool>,
}

impl ConfigEditor for UdpEditor {
    type Block = UdpConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &UdpConfig) -> Self {
        Self {
            port: NumberInput::from_optional(block.port),
            payload: block.payload.clone().unwrap_or_default(),
            expect_response: block.expect_response,
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<UdpConfig> {
        Some(UdpConfig {
            port: resolve_port(&self.port, ctx, errors),
            payload: optional_raw(&self.payload),
            expect_response: self.expect_response,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingEditor {
    pub packet_count: NumberInput,
    pub packet_size: NumberInput,
    pub max_packet_loss_percent: NumberInput,
}

impl ConfigEditor for PingEditor {
    type Block = PingConfig;

    fn defaults(_monitor_type: MonitorType) -> Self {
        Self::default()
    }

    fn hydrate(block: &PingConfig) -> Self {
        Self {
            packet_count: NumberInput::from_optional(block.packet_count),
            packet_size: NumberInput::from_optional(block.packet_size),
            max_packet_loss_percent: NumberInput::from_optional(block.max_packet_loss_percent),
        }
    }

    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<PingConfig> {
        Some(PingConfig {
            packet_count: self.packet_count.read_in_range(&ctx.field("packetCount"), 1, 100, errors),
            packet_size: self.packet_size.read_in_range(&ctx.field("packetSize"), 1, 65_500, errors),
            max_packet_loss_percent: self.max_packet_loss_percent.read_in_range(
                &ctx.field("maxPacketLossPercent"),
                0.0,
                100.0,
                errors,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_port_falls_back_to_target() {
        let ctx = BuildContext {
            monitor_type: MonitorType::Tcp,
            url: "10.0.0.1:8080",
        };
        let mut errors = ValidationErrors::new();
        let config = TcpEditor::default().build(&ctx, &mut errors).unwrap();
        assert!(errors.is_empty());
        assert_eq!(config.port, Some(8080));

        let explicit = TcpEditor {
            port: NumberInput::new("9000"),
            ..Default::default()
        };
        assert_eq!(explicit.build(&ctx, &mut errors).unwrap().port, Some(9000));
    }

    #[test]
    fn test_udp_port_required_without_target_port() {
        let ctx = BuildContext {
            monitor_type: MonitorType::Udp,
            url: "dns.example.com",
        };
        let mut errors = ValidationErrors::new();
        let config = UdpEditor::default().build(&ctx, &mut errors).unwrap();
        assert_eq!(config.port, None);
        assert!(errors.for_field("config.udp.port").is_some());
    }

    #[test]
    fn test_ping_prunes_garbage_numbers() {
        let editor = PingEditor {
            packet_count: NumberInput::new("5"),
            packet_size: NumberInput::new("big"),
            max_packet_loss_percent: NumberInput::new("12.5"),
        };
        let ctx = BuildContext {
            monitor_type: MonitorType::Ping,
            url: "example.com",
        };
        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx, &mut errors).unwrap();
        assert!(errors.is_empty());
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            serde_json::json!({"packetCount": 5, "maxPacketLossPercent": 12.5})
        );
    }

    #[test]
    fn test_garbage_tcp_port_falls_back_to_target() {
        let editor = TcpEditor {
            port: NumberInput::new("ssh"),
            ..Default::default()
        };
        let ctx = BuildContext {
            monitor_type: MonitorType::Tcp,
            url: "db.internal:2222",
        };
        let mut errors = ValidationErrors::new();
        let config = editor.build(&ctx, &mut errors).unwrap();
        assert!(errors.is_empty());
        assert_eq!(config.port, Some(2222));
    }
}
