use std::net::SocketAddr;

use crate::dns::*;
use crate::libdns::resolver::{
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    error::ResolveErrorKind,
    TokioAsyncResolver,
};
use crate::log::debug;
use crate::middleware::*;

/// Resolves everything the stages before it delegated through the
/// configured upstream servers.
pub struct NameServerMiddleware {
    resolver: TokioAsyncResolver,
}

impl NameServerMiddleware {
    pub fn new(servers: &[SocketAddr]) -> Self {
        let mut nameservers = NameServerConfigGroup::new();
        for server in servers {
            nameservers.merge(NameServerConfigGroup::from_ips_clear(
                &[server.ip()],
                server.port(),
                true,
            ));
        }

        let mut opts = ResolverOpts::default();
        opts.cache_size = 0;

        Self {
            resolver: TokioAsyncResolver::tokio(
                ResolverConfig::from_parts(None, vec![], nameservers),
                opts,
            ),
        }
    }
}

#[async_trait::async_trait]
impl Middleware<DnsContext, DnsRequest, DnsResponse, DnsError> for NameServerMiddleware {
    async fn handle(
        &self,
        ctx: &mut DnsContext,
        req: &DnsRequest,
        _next: Next<'_, DnsContext, DnsRequest, DnsResponse, DnsError>,
    ) -> Result<DnsResponse, DnsError> {
        let name = req.question().name();
        let rtype = req.question().query_type();

        debug!("forwarding lookup: {} {}", name, rtype);

        let lookup = tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => return Err(DnsError::Cancelled),
            res = self.resolver.lookup(name.clone(), rtype) => res,
        };

        match lookup {
            Ok(lookup) => {
                let mut message = req.reply(ResponseCode::NoError);
                message.set_recursion_available(true);
                message.add_answers(lookup.records().iter().cloned());
                ctx.write_msg(message)?;
                Ok(ResponseCode::NoError)
            }
            Err(err) => match err.kind() {
                ResolveErrorKind::NoRecordsFound { response_code, .. } => {
                    let response_code = *response_code;
                    debug!("upstream has no records for {} {}: {}", name, rtype, response_code);
                    let mut message = req.reply(response_code);
                    message.set_recursion_available(true);
                    ctx.write_msg(message)?;
                    Ok(response_code)
                }
                _ => Err(err.into()),
            },
        }
    }
}
