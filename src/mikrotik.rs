use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::{de::DeserializeOwned, Deserialize};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::LeaseError;
use crate::lease::{Lease, LeaseSource};
use crate::log::{debug, trace};

/// RouterOS REST path listing the DHCP server leases.
pub const LEASE_PATH: &str = "/rest/ip/dhcp-server/lease";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const ACCEPT_JSON: &str = "application/json; charset=utf-8";

/// Reads bound leases from the RouterOS REST API.
#[derive(Debug, Clone)]
pub struct MikroTikLeaseClient {
    endpoint: Url,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl MikroTikLeaseClient {
    pub fn builder(
        base_url: Url,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> MikroTikLeaseClientBuilder {
        MikroTikLeaseClientBuilder {
            base_url,
            username: username.into(),
            password: password.into(),
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, LeaseError> {
        let res = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_JSON)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = res.status();
        let body = res.bytes().await?;

        trace!("lease API answered {} with {} bytes", status, body.len());

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ErrorResponse>(&body) {
                Ok(err) => LeaseError::Service {
                    status: status.as_u16(),
                    code: err.error,
                    message: err.message,
                    detail: err.detail,
                },
                Err(source) => LeaseError::UnknownStatus {
                    status: status.as_u16(),
                    source,
                },
            });
        }

        serde_json::from_slice(&body).map_err(LeaseError::Decode)
    }
}

#[async_trait::async_trait]
impl LeaseSource for MikroTikLeaseClient {
    async fn fetch_bound_leases(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<Lease>, LeaseError> {
        debug!("fetching bound leases from {}", self.endpoint);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LeaseError::Cancelled),
            res = self.get(self.endpoint.clone()) => res,
        }
    }
}

pub struct MikroTikLeaseClientBuilder {
    base_url: Url,
    username: String,
    password: String,
    insecure: bool,
    timeout: Duration,
}

impl MikroTikLeaseClientBuilder {
    /// Skip TLS certificate verification, only meant for trusted networks.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<MikroTikLeaseClient, LeaseError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.insecure)
            .build()?;

        Ok(MikroTikLeaseClient {
            endpoint: lease_endpoint(&self.base_url),
            username: self.username,
            password: self.password,
            client,
        })
    }
}

/// Appends [`LEASE_PATH`] to whatever path `base_url` already has and
/// restricts the listing to bound leases.
fn lease_endpoint(base_url: &Url) -> Url {
    let mut url = base_url.clone();
    let path = format!("{}{}", base_url.path().trim_end_matches('/'), LEASE_PATH);
    url.set_path(&path);
    url.query_pairs_mut().clear().append_pair("status", "bound");
    url.set_fragment(None);
    url
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    detail: Option<String>,
}
