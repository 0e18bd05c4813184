use super::*;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::dns_conf::DEFAULT_PORT;

/// Accepts `ip:port`, `[ipv6]:port`, a bare ip or `:port`, the port defaults to 53.
impl NomParser for SocketAddr {
    fn parse(input: &str) -> IResult<&str, Self> {
        map_opt(is_not(" \t\r\n"), socket_addr)(input)
    }
}

fn socket_addr(s: &str) -> Option<SocketAddr> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Some(addr);
    }

    if let Ok(ip) = s.parse::<IpAddr>() {
        return Some(SocketAddr::new(ip, DEFAULT_PORT));
    }

    if let Some(ip) = s
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .and_then(|s| s.parse::<Ipv6Addr>().ok())
    {
        return Some(SocketAddr::new(ip.into(), DEFAULT_PORT));
    }

    s.strip_prefix(':')
        .and_then(|port| port.parse::<u16>().ok())
        .map(|port| SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), port))
}
