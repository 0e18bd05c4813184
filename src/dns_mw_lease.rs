use std::net::IpAddr;
use std::sync::Arc;

use crate::dns::*;
use crate::lease::{Lease, LeaseSource};
use crate::log::{debug, warn};
use crate::middleware::*;
use crate::zone::{relative_label, ZoneSet};

/// TTL of every synthesized address record.
pub const ANSWER_TTL: u32 = 86400;

/// Answers address queries inside the configured zones from the bound DHCP
/// leases, everything else goes down the chain.
pub struct LeaseMiddleware {
    source: Arc<dyn LeaseSource>,
    zones: ZoneSet,
}

impl LeaseMiddleware {
    pub fn new(source: Arc<dyn LeaseSource>, zones: ZoneSet) -> Self {
        Self { source, zones }
    }
}

#[async_trait::async_trait]
impl Middleware<DnsContext, DnsRequest, DnsResponse, DnsError> for LeaseMiddleware {
    async fn handle(
        &self,
        ctx: &mut DnsContext,
        req: &DnsRequest,
        next: Next<'_, DnsContext, DnsRequest, DnsResponse, DnsError>,
    ) -> Result<DnsResponse, DnsError> {
        let query = req.question();
        let name = query.name();

        let Some(zone) = self.zones.matches(name) else {
            return next.run(ctx, req).await;
        };

        if !matches!(query.query_type(), RecordType::A | RecordType::AAAA) {
            debug!("unsupported query type {} for {}", query.query_type(), name);
            return Ok(ResponseCode::ServFail);
        }

        let leases = match self.source.fetch_bound_leases(ctx.cancellation()).await {
            Ok(leases) => leases,
            Err(err) => {
                warn!("fetching bound leases for {} failed: {}", name, err);
                return Err(err.into());
            }
        };

        let label = relative_label(zone, name);
        let answer = lease_record(&leases, &label, query);

        debug!(
            "{} {}: {} from {} bound lease(s) in zone {}",
            name,
            query.query_type(),
            if answer.is_some() { "answered" } else { "no match" },
            leases.len(),
            zone
        );

        // NXDOMAIN would need an SOA for the zone, which is not known here.
        let Some(answer) = answer else {
            return Ok(ResponseCode::ServFail);
        };

        let mut message = req.reply(ResponseCode::NoError);
        message.set_authoritative(true);
        message.add_answer(answer);
        ctx.write_msg(message)?;

        Ok(ResponseCode::NoError)
    }
}

/// Answers `label` from the first lease, in source order, whose hostname
/// equals it ignoring case and whose address fits the query type.
fn lease_record(leases: &[Lease], label: &str, query: &Query) -> Option<Record> {
    let label = label.to_lowercase();

    leases
        .iter()
        .filter(|lease| lease.hostname.to_lowercase() == label)
        .find_map(|lease| address_rdata(lease.address, query.query_type()))
        .map(|rdata| Record::from_rdata(query.name().clone(), ANSWER_TTL, rdata))
}

fn address_rdata(address: IpAddr, query_type: RecordType) -> Option<RData> {
    match (address, query_type) {
        (IpAddr::V4(ip), RecordType::A) => Some(RData::A(ip.into())),
        (IpAddr::V6(ip), RecordType::AAAA) => Some(RData::AAAA(ip.into())),
        _ => None,
    }
}
