//! Static display metadata per monitor type.

use serde::Serialize;

use super::MonitorType;

/// Labels and hints for the target field of a monitor type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMetadata {
    pub label: &'static str,
    pub url_field_label: &'static str,
    pub url_field_placeholder: &'static str,
    pub url_field_hint: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_port: Option<u16>,
    /// Whether the target field must be filled in before submit.
    pub requires_url: bool,
}

const GENERIC: TypeMetadata = TypeMetadata {
    label: "Monitor",
    url_field_label: "URL",
    url_field_placeholder: "https://example.com",
    url_field_hint: "The address to check.",
    default_port: None,
    requires_url: true,
};

const fn meta(
    label: &'static str,
    url_field_label: &'static str,
    url_field_placeholder: &'static str,
    url_field_hint: &'static str,
    default_port: Option<u16>,
) -> TypeMetadata {
    TypeMetadata {
        label,
        url_field_label,
        url_field_placeholder,
        url_field_hint,
        default_port,
        requires_url: true,
    }
}

/// Looks up metadata by raw tag. Unknown tags get generic "URL" labeling.
pub fn lookup(tag: &str) -> TypeMetadata {
    match tag.parse::<MonitorType>() {
        Ok(monitor_type) => metadata_for(monitor_type),
        Err(_) => GENERIC,
    }
}

pub fn metadata_for(monitor_type: MonitorType) -> TypeMetadata {
    use MonitorType::*;
    match monitor_type {
        Http => meta("HTTP", "URL", "http://example.com/health", "Plain HTTP endpoint to request.", Some(80)),
        Https => meta("HTTPS", "URL", "https://example.com/health", "HTTPS endpoint to request.", Some(443)),
        Keyword => meta(
            "Keyword",
            "URL",
            "https://example.com",
            "Page whose body is searched for the keyword.",
            Some(443),
        ),
        JsonQuery => meta(
            "JSON Query",
            "URL",
            "https://api.example.com/status",
            "Endpoint returning JSON to evaluate.",
            Some(443),
        ),
        Websocket => meta("WebSocket", "URL", "wss://example.com/socket", "ws:// or wss:// endpoint.", Some(443)),
        Grpc => meta("gRPC", "Host", "grpc.example.com:443", "Host and port of the gRPC server.", Some(443)),
        Cdn => meta("CDN", "URL", "https://cdn.example.com/asset.js", "Asset URL served through the CDN.", Some(443)),
        Ssl => meta("SSL Certificate", "Host", "example.com", "Host whose certificate is inspected.", Some(443)),
        Tcp => meta("TCP Port", "Host", "example.com:8080", "Host and port to open a connection to.", None),
        Udp => meta("UDP Port", "Host", "example.com:53", "Host and port to send a datagram to.", None),
        Ping => meta("Ping", "Host", "example.com", "Host name or IP address to ping.", None),
        Dns => meta("DNS", "Domain", "example.com", "Domain name to resolve.", Some(53)),
        Postgres => meta("PostgreSQL", "Host", "db.example.com", "Database server host.", Some(5432)),
        Mysql => meta("MySQL", "Host", "db.example.com", "Database server host.", Some(3306)),
        Mongodb => meta("MongoDB", "Host", "mongo.example.com", "Database server host.", Some(27017)),
        Redis => meta("Redis", "Host", "redis.example.com", "Redis server host.", Some(6379)),
        Elasticsearch => meta(
            "Elasticsearch",
            "Host",
            "search.example.com",
            "Cluster node host.",
            Some(9200),
        ),
        Smtp => meta("SMTP", "Host", "smtp.example.com", "Mail server accepting submissions.", Some(587)),
        Imap => meta("IMAP", "Host", "imap.example.com", "Mailbox server host.", Some(993)),
        Pop3 => meta("POP3", "Host", "pop.example.com", "Mailbox server host.", Some(995)),
        EmailAuth => meta(
            "Email Authentication",
            "Domain",
            "example.com",
            "Domain whose SPF, DKIM and DMARC records are checked.",
            None,
        ),
        Mqtt => meta("MQTT", "Broker", "mqtt.example.com", "Broker host.", Some(1883)),
        Amqp => meta("AMQP", "Broker", "rabbit.example.com", "Broker host.", Some(5672)),
        Kafka => meta("Kafka", "Bootstrap server", "kafka.example.com", "Bootstrap broker host.", Some(9092)),
        Ssh => meta("SSH", "Host", "server.example.com", "Host running an SSH daemon.", Some(22)),
        Rdp => meta("RDP", "Host", "desktop.example.com", "Host accepting remote desktop sessions.", Some(3389)),
        Ftp => meta("FTP", "Host", "ftp.example.com", "FTP server host.", Some(21)),
        Prometheus => meta(
            "Prometheus",
            "Server URL",
            "http://prometheus.example.com:9090",
            "Prometheus server the query is sent to.",
            Some(9090),
        ),
        ExternalStatus => meta(
            "External Status Page",
            "Status page URL",
            "https://status.example.com",
            "Public status page of the provider.",
            None,
        ),
        Aggregate => TypeMetadata {
            label: "Aggregate",
            url_field_label: "URL",
            url_field_placeholder: "",
            url_field_hint: "Aggregate monitors have no target of their own.",
            default_port: None,
            requires_url: false,
        },
        Heartbeat => TypeMetadata {
            label: "Heartbeat",
            url_field_label: "URL",
            url_field_placeholder: "",
            url_field_hint: "Heartbeats are pushed to us; no target is needed.",
            default_port: None,
            requires_url: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tag_falls_back_to_generic() {
        let meta = lookup("carrier-pigeon");
        assert_eq!(meta.url_field_label, "URL");
        assert_eq!(meta.default_port, None);
        assert!(meta.requires_url);

        assert_eq!(lookup(""), GENERIC);
    }

    #[test]
    fn test_known_tags_have_ports() {
        assert_eq!(lookup("postgres").default_port, Some(5432));
        assert_eq!(lookup("SSH").default_port, Some(22));
        assert_eq!(MonitorType::Redis.metadata().label, "Redis");
    }

    #[test]
    fn test_every_type_has_a_label() {
        for t in MonitorType::ALL {
            assert!(!t.metadata().label.is_empty(), "{t} has no label");
        }
        assert!(!MonitorType::Heartbeat.metadata().requires_url);
        assert!(!MonitorType::Aggregate.metadata().requires_url);
    }
}
