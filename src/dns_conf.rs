use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::{parse_config, OneConfig};
use crate::error::{ConfigError, LeaseError};
use crate::log::{info, Level};
use crate::mikrotik::{MikroTikLeaseClient, DEFAULT_TIMEOUT};
use crate::zone::ZoneSet;

pub const DEFAULT_PORT: u16 = 53;

const DEFAULT_TCP_IDLE_TIME: u64 = 120;

/// How to reach the RouterOS REST API.
#[derive(Clone)]
pub struct MikroTikConfig {
    pub url: Url,
    pub username: String,
    pub password: String,
    pub insecure: bool,
    pub timeout: Duration,
}

impl MikroTikConfig {
    pub fn client(&self) -> Result<MikroTikLeaseClient, LeaseError> {
        MikroTikLeaseClient::builder(self.url.clone(), &self.username, &self.password)
            .insecure(self.insecure)
            .timeout(self.timeout)
            .build()
    }
}

impl std::fmt::Debug for MikroTikConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MikroTikConfig")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"***")
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Validated configuration, immutable once built.
#[derive(Debug)]
pub struct RuntimeConfig {
    conf_file: Option<PathBuf>,
    binds: Vec<SocketAddr>,
    zones: ZoneSet,
    mikrotik: MikroTikConfig,
    servers: Vec<SocketAddr>,
    tcp_idle_time: u64,
    log_level: Option<Level>,
}

impl RuntimeConfig {
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Arc<Self>, ConfigError> {
        Self::builder().with_conf_file(path).build().map(Arc::new)
    }

    #[inline]
    pub fn conf_file(&self) -> Option<&Path> {
        self.conf_file.as_deref()
    }

    /// Listen addresses, defaults to `0.0.0.0:53`.
    #[inline]
    pub fn binds(&self) -> &[SocketAddr] {
        &self.binds
    }

    #[inline]
    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    #[inline]
    pub fn mikrotik(&self) -> &MikroTikConfig {
        &self.mikrotik
    }

    /// Upstream nameservers, empty when forwarding is disabled.
    #[inline]
    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }

    #[inline]
    pub fn tcp_idle_time(&self) -> Duration {
        Duration::from_secs(self.tcp_idle_time)
    }

    #[inline]
    pub fn log_level(&self) -> Option<Level> {
        self.log_level
    }

    pub fn summary(&self) {
        info!("==================== Config ====================");
        if let Some(conf_file) = self.conf_file() {
            info!("{:>20}: {:?}", "conf-file", conf_file);
        }
        for bind in self.binds() {
            info!("{:>20}: {}", "bind", bind);
        }
        for zone in self.zones().iter() {
            info!("{:>20}: {}", "zone", zone);
        }
        info!("{:>20}: {}", "mikrotik-url", self.mikrotik.url);
        info!("{:>20}: {}", "mikrotik-username", self.mikrotik.username);
        if self.mikrotik.insecure {
            info!("{:>20}: {}", "mikrotik-insecure", self.mikrotik.insecure);
        }
        info!("{:>20}: {:?}", "mikrotik-timeout", self.mikrotik.timeout);
        for server in self.servers() {
            info!("{:>20}: {}", "server", server);
        }
        info!("================================================");
    }
}

#[derive(Default)]
pub struct RuntimeConfigBuilder {
    conf_file: Option<PathBuf>,
    lines: Vec<String>,
}

impl RuntimeConfigBuilder {
    /// Adds configuration lines, applied after the configuration file.
    pub fn with(mut self, lines: &str) -> Self {
        self.lines.push(lines.to_string());
        self
    }

    pub fn with_conf_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.conf_file = Some(path.as_ref().to_owned());
        self
    }

    pub fn build(self) -> Result<RuntimeConfig, ConfigError> {
        let mut items = vec![];

        if let Some(path) = self.conf_file.as_ref() {
            let content =
                fs::read_to_string(path).map_err(|err| ConfigError::Read(path.clone(), err))?;
            parse_lines(&content, &mut items)?;
        }

        for lines in self.lines.iter() {
            parse_lines(lines, &mut items)?;
        }

        assemble(self.conf_file, items)
    }
}

fn parse_lines(text: &str, items: &mut Vec<OneConfig>) -> Result<(), ConfigError> {
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();

        // skip comments and empty line.
        if matches!(trimmed.chars().next(), Some('#') | None) {
            continue;
        }

        match parse_config(trimmed) {
            Ok((rest, item)) if rest.trim().is_empty() => items.push(item),
            _ => {
                return Err(ConfigError::Syntax {
                    line: i + 1,
                    content: line.to_string(),
                })
            }
        }
    }
    Ok(())
}

fn assemble(conf_file: Option<PathBuf>, items: Vec<OneConfig>) -> Result<RuntimeConfig, ConfigError> {
    let mut binds = vec![];
    let mut zones = vec![];
    let mut url = None;
    let mut username = None;
    let mut password = None;
    let mut insecure = false;
    let mut timeout = DEFAULT_TIMEOUT;
    let mut servers = vec![];
    let mut tcp_idle_time = DEFAULT_TCP_IDLE_TIME;
    let mut log_level = None;

    for item in items {
        match item {
            OneConfig::Bind(addr) => binds.push(addr),
            OneConfig::Zone(names) => zones.extend(names),
            OneConfig::MikroTikUrl(v) => url = Some(v),
            OneConfig::MikroTikUsername(v) => username = Some(v),
            OneConfig::MikroTikPassword(v) => password = Some(v),
            OneConfig::MikroTikInsecure(v) => insecure = v,
            OneConfig::MikroTikTimeout(secs) => timeout = Duration::from_secs(secs),
            OneConfig::Server(addr) => servers.push(addr),
            OneConfig::TcpIdleTime(secs) => tcp_idle_time = secs,
            OneConfig::LogLevel(level) => log_level = Some(level),
        }
    }

    let url = url.ok_or(ConfigError::MissingCredential("mikrotik-url"))?;
    let username = username.ok_or(ConfigError::MissingCredential("mikrotik-username"))?;
    let password = password.ok_or(ConfigError::MissingCredential("mikrotik-password"))?;
    let url = Url::parse(&url).map_err(|err| ConfigError::InvalidUrl(url, err))?;

    if zones.is_empty() {
        return Err(ConfigError::MissingZone);
    }

    if binds.is_empty() {
        binds.push(SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), DEFAULT_PORT));
    }

    Ok(RuntimeConfig {
        conf_file,
        binds,
        zones: ZoneSet::new(zones),
        mikrotik: MikroTikConfig {
            url,
            username,
            password,
            insecure,
            timeout,
        },
        servers,
        tcp_idle_time,
        log_level,
    })
}
