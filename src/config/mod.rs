use std::net::SocketAddr;

use crate::libdns::proto::rr::Name;
use crate::log::Level;

mod parser;

pub use parser::{parse_config, NomParser};

/// One line of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneConfig {
    /// Listen address, served over both UDP and TCP.
    Bind(SocketAddr),
    /// Zones answered from the lease table.
    Zone(Vec<Name>),
    MikroTikUrl(String),
    MikroTikUsername(String),
    MikroTikPassword(String),
    /// Skip TLS certificate verification of the RouterOS API.
    MikroTikInsecure(bool),
    /// Lease request timeout, in seconds.
    MikroTikTimeout(u64),
    /// Upstream nameserver for names outside the zones.
    Server(SocketAddr),
    TcpIdleTime(u64),
    LogLevel(Level),
}
