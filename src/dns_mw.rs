use crate::{
    dns::{DnsContext, DnsError, DnsRequest, DnsResponse},
    log::debug,
    middleware::{Middleware, MiddlewareBuilder, MiddlewareDefaultHandler, MiddlewareHost},
};

pub type DnsMiddlewareHost = MiddlewareHost<DnsContext, DnsRequest, DnsResponse, DnsError>;

pub struct DnsMiddlewareHandler {
    host: DnsMiddlewareHost,
}

impl DnsMiddlewareHandler {
    pub async fn search(
        &self,
        ctx: &mut DnsContext,
        req: &DnsRequest,
    ) -> Result<DnsResponse, DnsError> {
        self.host.execute(ctx, req).await
    }
}

pub struct DnsMiddlewareBuilder {
    builder: MiddlewareBuilder<DnsContext, DnsRequest, DnsResponse, DnsError>,
}

impl DnsMiddlewareBuilder {
    pub fn new() -> Self {
        Self::with_default(DnsDefaultHandler)
    }

    /// Uses `handler` in place of the built-in end of chain.
    pub fn with_default(
        handler: impl MiddlewareDefaultHandler<DnsContext, DnsRequest, DnsResponse, DnsError> + 'static,
    ) -> Self {
        Self {
            builder: MiddlewareBuilder::new(handler),
        }
    }

    pub fn with<M: Middleware<DnsContext, DnsRequest, DnsResponse, DnsError> + 'static>(
        mut self,
        middleware: M,
    ) -> Self {
        self.builder = self.builder.with(middleware);
        self
    }

    pub fn build(self) -> DnsMiddlewareHandler {
        DnsMiddlewareHandler {
            host: self.builder.build(),
        }
    }
}

/// Reached when every stage delegated the query.
#[derive(Default)]
struct DnsDefaultHandler;

#[async_trait::async_trait]
impl MiddlewareDefaultHandler<DnsContext, DnsRequest, DnsResponse, DnsError> for DnsDefaultHandler {
    async fn handle(
        &self,
        _ctx: &mut DnsContext,
        req: &DnsRequest,
    ) -> Result<DnsResponse, DnsError> {
        debug!("no handler left for {}", req.question());
        Err(DnsError::NoNextHandler)
    }
}
