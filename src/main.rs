#![allow(dead_code)]

use clap::Parser;
use cli::*;
use std::{path::Path, sync::Arc};
use tokio::{runtime, signal};
use tokio_util::sync::CancellationToken;
use url::Url;

mod cli;
mod config;
mod dns;
mod dns_conf;
mod dns_error;
mod dns_mw;
mod dns_mw_lease;
mod dns_mw_ns;
mod dns_server;
mod error;
mod infra;
mod lease;
mod libdns;
mod log;
mod mikrotik;
mod zone;

use dns_mw::DnsMiddlewareBuilder;
use dns_mw_lease::LeaseMiddleware;
use dns_mw_ns::NameServerMiddleware;
use infra::middleware;

use crate::{
    dns_conf::RuntimeConfig,
    dns_server::{bind_server, DnsRequestHandler},
    lease::{render_table, LeaseSource},
    log::{error, info},
    mikrotik::MikroTikLeaseClient,
};

/// The app name
const NAME: &str = "mikrotik-dhcp-dns";

/// Returns a version as specified in Cargo.toml
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

fn main() {
    Cli::parse().run();
}

impl Cli {
    #[inline]
    pub fn run(self) {
        let console_level = self.log_level();
        let _guard = log::default(console_level.unwrap_or(log::Level::ERROR));

        let result = match self.command {
            Commands::Run { conf } => run_server(&conf, console_level),
            Commands::Test { conf } => test_config(&conf),
            Commands::Leases {
                base_url,
                username,
                password,
                insecure,
            } => print_leases(base_url, username, password, insecure),
        };

        if let Err(err) = result {
            error!("{:#}", err);
            std::process::exit(1);
        }
    }
}

fn run_server(conf: &Path, console_level: Option<log::Level>) -> anyhow::Result<()> {
    info!("{} {} starting", NAME, version());

    let cfg = RuntimeConfig::load(conf)?;

    // a level from the configuration file wins over the command line
    if let Some(level) = cfg.log_level().or(console_level) {
        log::init_global_default(level);
    }

    cfg.summary();

    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("mikrotik-dhcp-dns-runtime")
        .build()?;

    let shutdown = CancellationToken::new();

    // build handle pipeline.
    let handler = {
        let _guard = runtime.enter();

        let client = cfg.mikrotik().client()?;
        info!("reading bound leases from {}", client.endpoint());

        let mut middleware_builder = DnsMiddlewareBuilder::new()
            .with(LeaseMiddleware::new(Arc::new(client), cfg.zones().clone()));

        if !cfg.servers().is_empty() {
            middleware_builder =
                middleware_builder.with(NameServerMiddleware::new(cfg.servers()));
        }

        middleware_builder.build()
    };

    let mut server = runtime.block_on(bind_server(
        DnsRequestHandler::new(handler, shutdown.clone()),
        cfg.binds(),
        cfg.tcp_idle_time(),
    ))?;

    info!("awaiting connections...");

    let result = runtime.block_on(async {
        tokio::select! {
            res = signal::ctrl_c() => res?,
            res = server.block_until_done() => res?,
        }
        anyhow::Ok(())
    });

    // abandon lease requests still in flight
    shutdown.cancel();
    info!("{} {} shutdown", NAME, version());

    drop(runtime);
    result
}

fn test_config(conf: &Path) -> anyhow::Result<()> {
    let cfg = RuntimeConfig::load(conf)?;
    cfg.summary();
    info!("configuration file {:?} test is successful", conf);
    Ok(())
}

fn print_leases(
    base_url: Url,
    username: String,
    password: String,
    insecure: bool,
) -> anyhow::Result<()> {
    let runtime = runtime::Builder::new_current_thread().enable_all().build()?;

    let leases = runtime.block_on(async {
        let client = MikroTikLeaseClient::builder(base_url, username, password)
            .insecure(insecure)
            .build()?;
        client.fetch_bound_leases(&CancellationToken::new()).await
    })?;

    print!("{}", render_table(&leases));
    Ok(())
}
