//! Monitor type catalogue and the typed configuration union.
//!
//! Every monitor type belongs to exactly one [`MonitorFamily`] (used for
//! grouping in selectors) and exactly one [`ConfigBlock`] (the key its
//! settings live under in the `config` object of the wire payload).

pub mod config;
pub mod detection;
pub mod registry;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use config::MonitorConfig;
pub use detection::{TypeSelection, detect_monitor_type, suggest_monitor_type};
pub use registry::TypeMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorType {
    Http,
    Https,
    Keyword,
    JsonQuery,
    Websocket,
    Grpc,
    Cdn,
    Ssl,
    Tcp,
    Udp,
    Ping,
    Dns,
    Postgres,
    Mysql,
    Mongodb,
    Redis,
    Elasticsearch,
    Smtp,
    Imap,
    Pop3,
    EmailAuth,
    Mqtt,
    Amqp,
    Kafka,
    Ssh,
    Rdp,
    Ftp,
    Prometheus,
    ExternalStatus,
    Aggregate,
    Heartbeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorFamily {
    Web,
    Network,
    Database,
    Email,
    Messaging,
    RemoteAccess,
    Metrics,
    ExternalStatus,
    Aggregate,
    Heartbeat,
}

/// Key of the single settings object carried under `config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigBlock {
    Http,
    Websocket,
    Grpc,
    Cdn,
    Ssl,
    Tcp,
    Udp,
    Ping,
    Dns,
    Database,
    Email,
    EmailAuth,
    Broker,
    RemoteAccess,
    Prometheus,
    ExternalStatus,
    Aggregate,
    Heartbeat,
}

impl ConfigBlock {
    /// The JSON key used for this block.
    pub fn key(self) -> &'static str {
        match self {
            ConfigBlock::Http => "http",
            ConfigBlock::Websocket => "websocket",
            ConfigBlock::Grpc => "grpc",
            ConfigBlock::Cdn => "cdn",
            ConfigBlock::Ssl => "ssl",
            ConfigBlock::Tcp => "tcp",
            ConfigBlock::Udp => "udp",
            ConfigBlock::Ping => "ping",
            ConfigBlock::Dns => "dns",
            ConfigBlock::Database => "database",
            ConfigBlock::Email => "email",
            ConfigBlock::EmailAuth => "emailAuth",
            ConfigBlock::Broker => "broker",
            ConfigBlock::RemoteAccess => "remoteAccess",
            ConfigBlock::Prometheus => "prometheus",
            ConfigBlock::ExternalStatus => "externalStatus",
            ConfigBlock::Aggregate => "aggregate",
            ConfigBlock::Heartbeat => "heartbeat",
        }
    }
}

impl MonitorType {
    pub const ALL: [MonitorType; 31] = [
        MonitorType::Http,
        MonitorType::Https,
        MonitorType::Keyword,
        MonitorType::JsonQuery,
        MonitorType::Websocket,
        MonitorType::Grpc,
        MonitorType::Cdn,
        MonitorType::Ssl,
        MonitorType::Tcp,
        MonitorType::Udp,
        MonitorType::Ping,
        MonitorType::Dns,
        MonitorType::Postgres,
        MonitorType::Mysql,
        MonitorType::Mongodb,
        MonitorType::Redis,
        MonitorType::Elasticsearch,
        MonitorType::Smtp,
        MonitorType::Imap,
        MonitorType::Pop3,
        MonitorType::EmailAuth,
        MonitorType::Mqtt,
        MonitorType::Amqp,
        MonitorType::Kafka,
        MonitorType::Ssh,
        MonitorType::Rdp,
        MonitorType::Ftp,
        MonitorType::Prometheus,
        MonitorType::ExternalStatus,
        MonitorType::Aggregate,
        MonitorType::Heartbeat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MonitorType::Http => "http",
            MonitorType::Https => "https",
            MonitorType::Keyword => "keyword",
            MonitorType::JsonQuery => "json_query",
            MonitorType::Websocket => "websocket",
            MonitorType::Grpc => "grpc",
            MonitorType::Cdn => "cdn",
            MonitorType::Ssl => "ssl",
            MonitorType::Tcp => "tcp",
            MonitorType::Udp => "udp",
            MonitorType::Ping => "ping",
            MonitorType::Dns => "dns",
            MonitorType::Postgres => "postgres",
            MonitorType::Mysql => "mysql",
            MonitorType::Mongodb => "mongodb",
            MonitorType::Redis => "redis",
            MonitorType::Elasticsearch => "elasticsearch",
            MonitorType::Smtp => "smtp",
            MonitorType::Imap => "imap",
            MonitorType::Pop3 => "pop3",
            MonitorType::EmailAuth => "email_auth",
            MonitorType::Mqtt => "mqtt",
            MonitorType::Amqp => "amqp",
            MonitorType::Kafka => "kafka",
            MonitorType::Ssh => "ssh",
            MonitorType::Rdp => "rdp",
            MonitorType::Ftp => "ftp",
            MonitorType::Prometheus => "prometheus",
            MonitorType::ExternalStatus => "external_status",
            MonitorType::Aggregate => "aggregate",
            MonitorType::Heartbeat => "heartbeat",
        }
    }

    pub fn family(self) -> MonitorFamily {
        use MonitorType::*;
        match self {
            Http | Https | Keyword | JsonQuery | Websocket | Grpc | Cdn | Ssl => MonitorFamily::Web,
            Tcp | Udp | Ping | Dns => MonitorFamily::Network,
            Postgres | Mysql | Mongodb | Redis | Elasticsearch => MonitorFamily::Database,
            Smtp | Imap | Pop3 | EmailAuth => MonitorFamily::Email,
            Mqtt | Amqp | Kafka => MonitorFamily::Messaging,
            Ssh | Rdp | Ftp => MonitorFamily::RemoteAccess,
            Prometheus => MonitorFamily::Metrics,
            ExternalStatus => MonitorFamily::ExternalStatus,
            Aggregate => MonitorFamily::Aggregate,
            Heartbeat => MonitorFamily::Heartbeat,
        }
    }

    pub fn config_block(self) -> ConfigBlock {
        use MonitorType::*;
        match self {
            Http | Https | Keyword | JsonQuery => ConfigBlock::Http,
            Websocket => ConfigBlock::Websocket,
            Grpc => ConfigBlock::Grpc,
            Cdn => ConfigBlock::Cdn,
            Ssl => ConfigBlock::Ssl,
            Tcp => ConfigBlock::Tcp,
            Udp => ConfigBlock::Udp,
            Ping => ConfigBlock::Ping,
            Dns => ConfigBlock::Dns,
            Postgres | Mysql | Mongodb | Redis | Elasticsearch => ConfigBlock::Database,
            Smtp | Imap | Pop3 => ConfigBlock::Email,
            EmailAuth => ConfigBlock::EmailAuth,
            Mqtt | Amqp | Kafka => ConfigBlock::Broker,
            Ssh | Rdp | Ftp => ConfigBlock::RemoteAccess,
            Prometheus => ConfigBlock::Prometheus,
            ExternalStatus => ConfigBlock::ExternalStatus,
            Aggregate => ConfigBlock::Aggregate,
            Heartbeat => ConfigBlock::Heartbeat,
        }
    }

    pub fn metadata(self) -> TypeMetadata {
        registry::metadata_for(self)
    }
}

impl fmt::Display for MonitorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown monitor type: {0}")]
pub struct UnknownMonitorType(pub String);

impl FromStr for MonitorType {
    type Err = UnknownMonitorType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        MonitorType::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| UnknownMonitorType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip_through_from_str() {
        for t in MonitorType::ALL {
            assert_eq!(t.as_str().parse::<MonitorType>().unwrap(), t);
        }
        assert!("gopher".parse::<MonitorType>().is_err());
    }

    #[test]
    fn test_serde_tag_matches_as_str() {
        for t in MonitorType::ALL {
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json, serde_json::Value::String(t.as_str().to_string()));
        }
    }

    #[test]
    fn test_database_types_share_a_block() {
        assert_eq!(MonitorType::Postgres.config_block(), ConfigBlock::Database);
        assert_eq!(MonitorType::Redis.config_block(), ConfigBlock::Database);
        assert_eq!(MonitorType::Redis.family(), MonitorFamily::Database);
        assert_eq!(MonitorType::EmailAuth.config_block().key(), "emailAuth");
    }
}
