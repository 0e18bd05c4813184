use std::fmt::Write;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::LeaseError;

/// A DHCP lease in bound state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub address: IpAddr,
    #[serde(rename = "host-name", default)]
    pub hostname: String,
}

impl Lease {
    pub fn new(address: IpAddr, hostname: impl Into<String>) -> Self {
        Self {
            address,
            hostname: hostname.into(),
        }
    }
}

/// Provides the current snapshot of bound leases.
#[async_trait::async_trait]
pub trait LeaseSource: Send + Sync {
    /// Fetches the bound leases, in the order the source reports them.
    ///
    /// The request is abandoned with [`LeaseError::Cancelled`] once `cancel` fires.
    async fn fetch_bound_leases(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Lease>, LeaseError>;
}

const MIN_CELL_WIDTH: usize = 10;
const CELL_PADDING: usize = 5;

/// Renders leases as an `ADDRESS HOSTNAME` table.
pub fn render_table(leases: &[Lease]) -> String {
    const ADDRESS: &str = "ADDRESS";

    let addresses = leases
        .iter()
        .map(|lease| lease.address.to_string())
        .collect::<Vec<_>>();

    let width = addresses
        .iter()
        .map(String::len)
        .chain(Some(ADDRESS.len()))
        .max()
        .unwrap_or_default()
        + CELL_PADDING;
    let width = width.max(MIN_CELL_WIDTH);

    let mut table = String::new();
    let _ = writeln!(table, "{ADDRESS:<width$}HOSTNAME");
    for (address, lease) in addresses.iter().zip(leases) {
        let _ = writeln!(table, "{address:<width$}{}", lease.hostname);
    }
    table
}
