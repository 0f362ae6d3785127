//! Infers a monitor type from a pasted URL or host string.
//!
//! Rules are evaluated in order and the first match wins:
//! protocol prefix, bare domain, `ipv4:port`, `host:port` (well-known port
//! table), otherwise no suggestion.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::MonitorType;

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+([a-z0-9](?:[a-z0-9-]*[a-z0-9])?))(?:/\S*)?$")
        .expect("domain pattern is valid")
});

static IPV4_PORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3}):(\d{1,5})$").expect("ipv4 pattern is valid")
});

static HOST_PORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z0-9](?:[a-z0-9.-]*[a-z0-9])?):(\d{1,5})$").expect("host:port pattern is valid")
});

const SCHEMES: &[(&str, MonitorType)] = &[
    ("https://", MonitorType::Https),
    ("http://", MonitorType::Http),
    ("wss://", MonitorType::Websocket),
    ("ws://", MonitorType::Websocket),
    ("grpcs://", MonitorType::Grpc),
    ("grpc://", MonitorType::Grpc),
    ("mqtts://", MonitorType::Mqtt),
    ("mqtt://", MonitorType::Mqtt),
    ("amqps://", MonitorType::Amqp),
    ("amqp://", MonitorType::Amqp),
    ("kafka://", MonitorType::Kafka),
    ("postgresql://", MonitorType::Postgres),
    ("postgres://", MonitorType::Postgres),
    ("mysql://", MonitorType::Mysql),
    ("mongodb+srv://", MonitorType::Mongodb),
    ("mongodb://", MonitorType::Mongodb),
    ("rediss://", MonitorType::Redis),
    ("redis://", MonitorType::Redis),
    ("elasticsearch://", MonitorType::Elasticsearch),
    ("ssh://", MonitorType::Ssh),
    ("sftp://", MonitorType::Ssh),
    ("rdp://", MonitorType::Rdp),
    ("ftps://", MonitorType::Ftp),
    ("ftp://", MonitorType::Ftp),
    ("smtps://", MonitorType::Smtp),
    ("smtp://", MonitorType::Smtp),
    ("imaps://", MonitorType::Imap),
    ("imap://", MonitorType::Imap),
    ("pop3s://", MonitorType::Pop3),
    ("pop3://", MonitorType::Pop3),
    ("tcp://", MonitorType::Tcp),
    ("udp://", MonitorType::Udp),
];

/// Maps a well-known port to the type that usually listens there.
pub fn type_for_port(port: u16) -> Option<MonitorType> {
    let monitor_type = match port {
        21 => MonitorType::Ftp,
        22 => MonitorType::Ssh,
        25 | 465 | 587 => MonitorType::Smtp,
        80 => MonitorType::Http,
        110 | 995 => MonitorType::Pop3,
        143 | 993 => MonitorType::Imap,
        443 => MonitorType::Https,
        1883 | 8883 => MonitorType::Mqtt,
        3306 => MonitorType::Mysql,
        3389 => MonitorType::Rdp,
        5432 => MonitorType::Postgres,
        5672 => MonitorType::Amqp,
        6379 => MonitorType::Redis,
        9090 => MonitorType::Prometheus,
        9092 => MonitorType::Kafka,
        9200 => MonitorType::Elasticsearch,
        27017 => MonitorType::Mongodb,
        _ => return None,
    };
    Some(monitor_type)
}

/// Which rule produced a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionRule {
    Scheme,
    Domain,
    Ipv4Port,
    HostPort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub monitor_type: MonitorType,
    pub rule: DetectionRule,
}

/// Whether auto-detection may still change the type of a form.
///
/// Once the user picks a type by hand the form stays `UserOverridden` for
/// the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSelection {
    #[default]
    Auto,
    UserOverridden,
}

impl TypeSelection {
    pub fn allows_detection(self) -> bool {
        matches!(self, TypeSelection::Auto)
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.parse::<u16>().ok().filter(|p| *p != 0)
}

pub fn detect(input: &str) -> Option<Detection> {
    let text = input.trim().to_ascii_lowercase();
    if text.is_empty() {
        return None;
    }

    if let Some((_, monitor_type)) = SCHEMES.iter().find(|(prefix, _)| text.starts_with(prefix)) {
        return Some(Detection {
            monitor_type: *monitor_type,
            rule: DetectionRule::Scheme,
        });
    }

    if let Some(caps) = DOMAIN_RE.captures(&text) {
        // A purely numeric last label is an IP address, not a domain.
        let tld = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if tld.chars().any(|c| c.is_ascii_alphabetic()) {
            return Some(Detection {
                monitor_type: MonitorType::Https,
                rule: DetectionRule::Domain,
            });
        }
    }

    if let Some(caps) = IPV4_PORT_RE.captures(&text) {
        let octets_valid = (1..=4).all(|i| caps[i].parse::<u8>().is_ok());
        if octets_valid && parse_port(&caps[5]).is_some() {
            return Some(Detection {
                monitor_type: MonitorType::Tcp,
                rule: DetectionRule::Ipv4Port,
            });
        }
    }

    if let Some(caps) = HOST_PORT_RE.captures(&text) {
        if let Some(port) = parse_port(&caps[2]) {
            return Some(Detection {
                monitor_type: type_for_port(port).unwrap_or(MonitorType::Tcp),
                rule: DetectionRule::HostPort,
            });
        }
    }

    None
}

/// Suggested type for a raw target string, ignoring the current form state.
pub fn detect_monitor_type(input: &str) -> Option<MonitorType> {
    detect(input).map(|d| d.monitor_type)
}

/// Suggested type change for a form currently set to `current`.
///
/// Returns `None` when the detected type equals `current` or when `current`
/// already accepts the pasted target (a bare domain typed into a DNS form,
/// an `https://` URL typed into a keyword form).
pub fn suggest_monitor_type(input: &str, current: MonitorType) -> Option<MonitorType> {
    let detection = detect(input)?;
    if detection.monitor_type == current || accepts(current, detection) {
        return None;
    }
    Some(detection.monitor_type)
}

fn accepts(current: MonitorType, detection: Detection) -> bool {
    use MonitorType::*;
    let host_based = matches!(current.metadata().url_field_label, "Host" | "Domain" | "Broker" | "Bootstrap server");
    match detection.rule {
        DetectionRule::Scheme => {
            matches!(detection.monitor_type, Http | Https)
                && matches!(current, Keyword | JsonQuery | Cdn | Prometheus | ExternalStatus)
        }
        DetectionRule::Domain => host_based,
        DetectionRule::Ipv4Port | DetectionRule::HostPort => {
            detection.monitor_type == Tcp && host_based
        }
    }
}
