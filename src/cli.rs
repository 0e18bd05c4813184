use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use url::Url;

use crate::log;

type LogLevelDefault = InfoLevel;

/// Authoritative DNS for the hosts leased by a MikroTik DHCP server.
#[derive(Parser, Debug)]
#[command(author, version=crate::version(), about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    verbose: Verbosity<LogLevelDefault>,
}

impl Cli {
    pub fn log_level(&self) -> Option<log::Level> {
        self.verbose
            .log_level()
            .map(|s| s.to_string())
            .and_then(|s| log::Level::from_str(&s).ok())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the DNS server.
    Run {
        /// Config file
        #[arg(short = 'c', long)]
        conf: PathBuf,
    },

    /// Test configuration and exit
    Test {
        /// Config file
        #[arg(short = 'c', long)]
        conf: PathBuf,
    },

    /// Print the bound DHCP leases of a router.
    Leases {
        /// Base URL of the RouterOS REST API, e.g. https://192.168.88.1
        #[arg(long)]
        base_url: Url,

        #[arg(short = 'u', long)]
        username: String,

        #[arg(short = 'p', long)]
        password: String,

        /// Skip TLS certificate verification
        #[arg(short = 'k', long)]
        insecure: bool,
    },
}
