//! Per-type settings editors.
//!
//! Each editor owns the raw inputs of exactly one config block. The form
//! holds one editor at a time inside [`ConfigDraft`]; switching the monitor
//! type replaces it wholesale.

use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;
use crate::monitor::config::MonitorConfig;
use crate::monitor::{ConfigBlock, MonitorType};

pub mod database;
pub mod dns;
pub mod email;
pub mod external;
pub mod heartbeat;
pub mod messaging;
pub mod metrics;
pub mod network;
pub mod remote_access;
pub mod ssl;
pub mod web;

pub use database::DatabaseEditor;
pub use dns::{DnsEditor, ResolverInput};
pub use email::{EmailAuthEditor, EmailEditor};
pub use external::{AggregateEditor, ExternalStatusEditor};
pub use heartbeat::HeartbeatEditor;
pub use messaging::BrokerEditor;
pub use metrics::PrometheusEditor;
pub use network::{PingEditor, TcpEditor, UdpEditor};
pub use remote_access::RemoteAccessEditor;
pub use ssl::SslEditor;
pub use web::{AssertionsEditor, CdnEditor, GrpcEditor, HttpEditor, JsonPathInput, WebsocketEditor};

/// What an editor may read from outside its own subtree while building.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub monitor_type: MonitorType,
    pub url: &'a str,
}

impl BuildContext<'_> {
    pub fn default_port(&self) -> Option<u16> {
        self.monitor_type.metadata().default_port
    }

    /// Port written into the target itself (`host:port`, `scheme://host:port/...`).
    pub fn target_port(&self) -> Option<u16> {
        port_from_target(self.url)
    }

    pub fn field(&self, name: &str) -> String {
        format!("config.{}.{}", self.monitor_type.config_block().key(), name)
    }
}

pub fn port_from_target(target: &str) -> Option<u16> {
    let target = target.trim();
    let without_scheme = target.split_once("://").map_or(target, |(_, rest)| rest);
    let authority = without_scheme.split(['/', '?', '#']).next()?;
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    if authority.ends_with(']') {
        return None;
    }
    let (_, port) = authority.rsplit_once(':')?;
    port.parse::<u16>().ok().filter(|p| *p != 0)
}

pub trait ConfigEditor: Sized {
    type Block;

    /// Fresh inputs for a newly selected `monitor_type`.
    fn defaults(monitor_type: MonitorType) -> Self;

    /// Inputs reproducing a persisted block.
    fn hydrate(block: &Self::Block) -> Self;

    /// Builds the wire block, recording problems in `errors`.
    fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<Self::Block>;
}

/// The active type's editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigDraft {
    Http(HttpEditor),
    Websocket(WebsocketEditor),
    Grpc(GrpcEditor),
    Cdn(CdnEditor),
    Ssl(SslEditor),
    Tcp(TcpEditor),
    Udp(UdpEditor),
    Ping(PingEditor),
    Dns(DnsEditor),
    Database(DatabaseEditor),
    Email(EmailEditor),
    EmailAuth(EmailAuthEditor),
    Broker(BrokerEditor),
    RemoteAccess(RemoteAccessEditor),
    Prometheus(PrometheusEditor),
    ExternalStatus(ExternalStatusEditor),
    Aggregate(AggregateEditor),
    Heartbeat(HeartbeatEditor),
}

macro_rules! lenses {
    ($($variant:ident => $editor:ty, $get:ident, $get_mut:ident;)*) => {
        impl ConfigDraft {
            $(
                pub fn $get(&self) -> Option<&$editor> {
                    match self {
                        ConfigDraft::$variant(editor) => Some(editor),
                        _ => None,
                    }
                }

                pub fn $get_mut(&mut self) -> Option<&mut $editor> {
                    match self {
                        ConfigDraft::$variant(editor) => Some(editor),
                        _ => None,
                    }
                }
            )*
        }
    };
}

lenses! {
    Http => HttpEditor, as_http, as_http_mut;
    Websocket => WebsocketEditor, as_websocket, as_websocket_mut;
    Grpc => GrpcEditor, as_grpc, as_grpc_mut;
    Cdn => CdnEditor, as_cdn, as_cdn_mut;
    Ssl => SslEditor, as_ssl, as_ssl_mut;
    Tcp => TcpEditor, as_tcp, as_tcp_mut;
    Udp => UdpEditor, as_udp, as_udp_mut;
    Ping => PingEditor, as_ping, as_ping_mut;
    Dns => DnsEditor, as_dns, as_dns_mut;
    Database => DatabaseEditor, as_database, as_database_mut;
    Email => EmailEditor, as_email, as_email_mut;
    EmailAuth => EmailAuthEditor, as_email_auth, as_email_auth_mut;
    Broker => BrokerEditor, as_broker, as_broker_mut;
    RemoteAccess => RemoteAccessEditor, as_remote_access, as_remote_access_mut;
    Prometheus => PrometheusEditor, as_prometheus, as_prometheus_mut;
    ExternalStatus => ExternalStatusEditor, as_external_status, as_external_status_mut;
    Aggregate => AggregateEditor, as_aggregate, as_aggregate_mut;
    Heartbeat => HeartbeatEditor, as_heartbeat, as_heartbeat_mut;
}

impl ConfigDraft {
    pub fn defaults_for(monitor_type: MonitorType) -> Self {
        let t = monitor_type;
        match t.config_block() {
            ConfigBlock::Http => ConfigDraft::Http(HttpEditor::defaults(t)),
            ConfigBlock::Websocket => ConfigDraft::Websocket(WebsocketEditor::defaults(t)),
            ConfigBlock::Grpc => ConfigDraft::Grpc(GrpcEditor::defaults(t)),
            ConfigBlock::Cdn => ConfigDraft::Cdn(CdnEditor::defaults(t)),
            ConfigBlock::Ssl => ConfigDraft::Ssl(SslEditor::defaults(t)),
            ConfigBlock::Tcp => ConfigDraft::Tcp(TcpEditor::defaults(t)),
            ConfigBlock::Udp => ConfigDraft::Udp(UdpEditor::defaults(t)),
            ConfigBlock::Ping => ConfigDraft::Ping(PingEditor::defaults(t)),
            ConfigBlock::Dns => ConfigDraft::Dns(DnsEditor::defaults(t)),
            ConfigBlock::Database => ConfigDraft::Database(DatabaseEditor::defaults(t)),
            ConfigBlock::Email => ConfigDraft::Email(EmailEditor::defaults(t)),
            ConfigBlock::EmailAuth => ConfigDraft::EmailAuth(EmailAuthEditor::defaults(t)),
            ConfigBlock::Broker => ConfigDraft::Broker(BrokerEditor::defaults(t)),
            ConfigBlock::RemoteAccess => ConfigDraft::RemoteAccess(RemoteAccessEditor::defaults(t)),
            ConfigBlock::Prometheus => ConfigDraft::Prometheus(PrometheusEditor::defaults(t)),
            ConfigBlock::ExternalStatus => ConfigDraft::ExternalStatus(ExternalStatusEditor::defaults(t)),
            ConfigBlock::Aggregate => ConfigDraft::Aggregate(AggregateEditor::defaults(t)),
            ConfigBlock::Heartbeat => ConfigDraft::Heartbeat(HeartbeatEditor::defaults(t)),
        }
    }

    /// Editor for `monitor_type` filled from a persisted block.
    ///
    /// A missing block, or one that belongs to a different type, yields the
    /// type's defaults.
    pub fn hydrate(monitor_type: MonitorType, config: Option<&MonitorConfig>) -> Self {
        let Some(config) = config.filter(|c| c.block() == monitor_type.config_block()) else {
            return Self::defaults_for(monitor_type);
        };
        match config {
            MonitorConfig::Http(b) => ConfigDraft::Http(HttpEditor::hydrate(b)),
            MonitorConfig::Websocket(b) => ConfigDraft::Websocket(WebsocketEditor::hydrate(b)),
            MonitorConfig::Grpc(b) => ConfigDraft::Grpc(GrpcEditor::hydrate(b)),
            MonitorConfig::Cdn(b) => ConfigDraft::Cdn(CdnEditor::hydrate(b)),
            MonitorConfig::Ssl(b) => ConfigDraft::Ssl(SslEditor::hydrate(b)),
            MonitorConfig::Tcp(b) => ConfigDraft::Tcp(TcpEditor::hydrate(b)),
            MonitorConfig::Udp(b) => ConfigDraft::Udp(UdpEditor::hydrate(b)),
            MonitorConfig::Ping(b) => ConfigDraft::Ping(PingEditor::hydrate(b)),
            MonitorConfig::Dns(b) => ConfigDraft::Dns(DnsEditor::hydrate(b)),
            MonitorConfig::Database(b) => ConfigDraft::Database(DatabaseEditor::hydrate(b)),
            MonitorConfig::Email(b) => ConfigDraft::Email(EmailEditor::hydrate(b)),
            MonitorConfig::EmailAuth(b) => ConfigDraft::EmailAuth(EmailAuthEditor::hydrate(b)),
            MonitorConfig::Broker(b) => ConfigDraft::Broker(BrokerEditor::hydrate(b)),
            MonitorConfig::RemoteAccess(b) => ConfigDraft::RemoteAccess(RemoteAccessEditor::hydrate(b)),
            MonitorConfig::Prometheus(b) => ConfigDraft::Prometheus(PrometheusEditor::hydrate(b)),
            MonitorConfig::ExternalStatus(b) => ConfigDraft::ExternalStatus(ExternalStatusEditor::hydrate(b)),
            MonitorConfig::Aggregate(b) => ConfigDraft::Aggregate(AggregateEditor::hydrate(b)),
            MonitorConfig::Heartbeat(b) => ConfigDraft::Heartbeat(HeartbeatEditor::hydrate(b)),
        }
    }

    pub fn block(&self) -> ConfigBlock {
        match self {
            ConfigDraft::Http(_) => ConfigBlock::Http,
            ConfigDraft::Websocket(_) => ConfigBlock::Websocket,
            ConfigDraft::Grpc(_) => ConfigBlock::Grpc,
            ConfigDraft::Cdn(_) => ConfigBlock::Cdn,
            ConfigDraft::Ssl(_) => ConfigBlock::Ssl,
            ConfigDraft::Tcp(_) => ConfigBlock::Tcp,
            ConfigDraft::Udp(_) => ConfigBlock::Udp,
            ConfigDraft::Ping(_) => ConfigBlock::Ping,
            ConfigDraft::Dns(_) => ConfigBlock::Dns,
            ConfigDraft::Database(_) => ConfigBlock::Database,
            ConfigDraft::Email(_) => ConfigBlock::Email,
            ConfigDraft::EmailAuth(_) => ConfigBlock::EmailAuth,
            ConfigDraft::Broker(_) => ConfigBlock::Broker,
            ConfigDraft::RemoteAccess(_) => ConfigBlock::RemoteAccess,
            ConfigDraft::Prometheus(_) => ConfigBlock::Prometheus,
            ConfigDraft::ExternalStatus(_) => ConfigBlock::ExternalStatus,
            ConfigDraft::Aggregate(_) => ConfigBlock::Aggregate,
            ConfigDraft::Heartbeat(_) => ConfigBlock::Heartbeat,
        }
    }

    pub fn build(&self, ctx: &BuildContext<'_>, errors: &mut ValidationErrors) -> Option<MonitorConfig> {
        match self {
            ConfigDraft::Http(e) => e.build(ctx, errors).map(MonitorConfig::Http),
            ConfigDraft::Websocket(e) => e.build(ctx, errors).map(MonitorConfig::Websocket),
            ConfigDraft::Grpc(e) => e.build(ctx, errors).map(MonitorConfig::Grpc),
            ConfigDraft::Cdn(e) => e.build(ctx, errors).map(MonitorConfig::Cdn),
            ConfigDraft::Ssl(e) => e.build(ctx, errors).map(MonitorConfig::Ssl),
            ConfigDraft::Tcp(e) => e.build(ctx, errors).map(MonitorConfig::Tcp),
            ConfigDraft::Udp(e) => e.build(ctx, errors).map(MonitorConfig::Udp),
            ConfigDraft::Ping(e) => e.build(ctx, errors).map(MonitorConfig::Ping),
            ConfigDraft::Dns(e) => e.build(ctx, errors).map(MonitorConfig::Dns),
            ConfigDraft::Database(e) => e.build(ctx, errors).map(MonitorConfig::Database),
            ConfigDraft::Email(e) => e.build(ctx, errors).map(MonitorConfig::Email),
            ConfigDraft::EmailAuth(e) => e.build(ctx, errors).map(MonitorConfig::EmailAuth),
            ConfigDraft::Broker(e) => e.build(ctx, errors).map(MonitorConfig::Broker),
            ConfigDraft::RemoteAccess(e) => e.build(ctx, errors).map(MonitorConfig::RemoteAccess),
            ConfigDraft::Prometheus(e) => e.build(ctx, errors).map(MonitorConfig::Prometheus),
            ConfigDraft::ExternalStatus(e) => e.build(ctx, errors).map(MonitorConfig::ExternalStatus),
            ConfigDraft::Aggregate(e) => e.build(ctx, errors).map(MonitorConfig::Aggregate),
            ConfigDraft::Heartbeat(e) => e.build(ctx, errors).map(MonitorConfig::Heartbeat),
        }
    }
}
