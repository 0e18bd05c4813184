use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use std::result::Result;

/// A stage of a handler chain.
///
/// A stage either produces the result itself or hands the request over to
/// the rest of the chain through [`Next`].
#[async_trait::async_trait]
pub trait Middleware<TCtx: Send, TReq: Sync, TRes, TErr>: Send + Sync {
    #[inline]
    async fn handle(
        &self,
        ctx: &mut TCtx,
        req: &TReq,
        next: Next<'_, TCtx, TReq, TRes, TErr>,
    ) -> Result<TRes, TErr> {
        next.run(ctx, req).await
    }
}

/// Terminates the chain when every stage has delegated.
#[async_trait::async_trait]
pub trait MiddlewareDefaultHandler<TCtx, TReq, TRes, TErr>: Send + Sync {
    async fn handle(&self, ctx: &mut TCtx, req: &TReq) -> Result<TRes, TErr>;
}

/// The remaining part of the chain, as seen by the current stage.
#[derive(Clone)]
pub struct Next<'a, TCtx, TReq, TRes, TErr> {
    default: &'a Arc<dyn MiddlewareDefaultHandler<TCtx, TReq, TRes, TErr>>,
    middlewares: &'a [Arc<dyn Middleware<TCtx, TReq, TRes, TErr>>],
}

impl<'a, TCtx: Send, TReq: Sync, TRes, TErr> Next<'a, TCtx, TReq, TRes, TErr> {
    pub(crate) fn new(
        default: &'a Arc<dyn MiddlewareDefaultHandler<TCtx, TReq, TRes, TErr>>,
        middlewares: &'a [Arc<dyn Middleware<TCtx, TReq, TRes, TErr>>],
    ) -> Self {
        Self {
            default,
            middlewares,
        }
    }

    #[inline]
    pub fn run(mut self, ctx: &'a mut TCtx, req: &'a TReq) -> BoxFuture<'a, Result<TRes, TErr>> {
        if let Some((current, rest)) = self.middlewares.split_first() {
            self.middlewares = rest;
            current.handle(ctx, req, self).boxed()
        } else {
            self.default.handle(ctx, req).boxed()
        }
    }
}

pub struct MiddlewareBuilder<TCtx, TReq, TRes, TErr> {
    default: Arc<dyn MiddlewareDefaultHandler<TCtx, TReq, TRes, TErr>>,
    middleware_stack: Vec<Arc<dyn Middleware<TCtx, TReq, TRes, TErr>>>,
}

impl<TCtx: Send, TReq: Sync, TRes, TErr> MiddlewareBuilder<TCtx, TReq, TRes, TErr> {
    #[inline]
    pub fn new(default: impl MiddlewareDefaultHandler<TCtx, TReq, TRes, TErr> + 'static) -> Self {
        Self {
            default: Arc::new(default),
            middleware_stack: Default::default(),
        }
    }

    /// Appends a stage, it runs after every stage added before it.
    #[inline]
    pub fn with<M>(mut self, middleware: M) -> Self
    where
        M: Middleware<TCtx, TReq, TRes, TErr> + 'static,
    {
        self.middleware_stack.push(Arc::new(middleware));
        self
    }

    #[inline]
    pub fn build(self) -> MiddlewareHost<TCtx, TReq, TRes, TErr> {
        MiddlewareHost {
            default: self.default,
            middleware_stack: self.middleware_stack.into_boxed_slice(),
        }
    }
}

pub struct MiddlewareHost<TCtx, TReq, TRes, TErr> {
    default: Arc<dyn MiddlewareDefaultHandler<TCtx, TReq, TRes, TErr>>,
    middleware_stack: Box<[Arc<dyn Middleware<TCtx, TReq, TRes, TErr>>]>,
}

impl<TCtx: Send, TReq: Sync, TRes, TErr> MiddlewareHost<TCtx, TReq, TRes, TErr> {
    pub async fn execute(&self, ctx: &mut TCtx, req: &TReq) -> Result<TRes, TErr> {
        let next = Next::new(&self.default, &self.middleware_stack);
        next.run(ctx, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Trail = Vec<&'static str>;

    struct Terminal;

    #[async_trait::async_trait]
    impl MiddlewareDefaultHandler<Trail, u32, u32, String> for Terminal {
        async fn handle(&self, ctx: &mut Trail, req: &u32) -> Result<u32, String> {
            ctx.push("terminal");
            Ok(*req)
        }
    }

    /// Claims even requests, delegates the rest.
    struct Even;

    #[async_trait::async_trait]
    impl Middleware<Trail, u32, u32, String> for Even {
        async fn handle(
            &self,
            ctx: &mut Trail,
            req: &u32,
            next: Next<'_, Trail, u32, u32, String>,
        ) -> Result<u32, String> {
            ctx.push("even");
            if req % 2 == 0 {
                return Ok(req / 2);
            }
            next.run(ctx, req).await
        }
    }

    struct Reject;

    #[async_trait::async_trait]
    impl Middleware<Trail, u32, u32, String> for Reject {
        async fn handle(
            &self,
            ctx: &mut Trail,
            req: &u32,
            next: Next<'_, Trail, u32, u32, String>,
        ) -> Result<u32, String> {
            ctx.push("reject");
            if *req > 100 {
                return Err(format!("{req} is too large"));
            }
            next.run(ctx, req).await
        }
    }

    struct Passthrough;

    impl Middleware<Trail, u32, u32, String> for Passthrough {}

    fn host() -> MiddlewareHost<Trail, u32, u32, String> {
        MiddlewareBuilder::new(Terminal)
            .with(Even)
            .with(Passthrough)
            .with(Reject)
            .build()
    }

    #[tokio::test]
    async fn test_stage_answers_without_delegating() {
        let mut trail = Trail::new();
        assert_eq!(host().execute(&mut trail, &8).await, Ok(4));
        assert_eq!(trail, vec!["even"]);
    }

    #[tokio::test]
    async fn test_delegation_reaches_terminal() {
        let mut trail = Trail::new();
        assert_eq!(host().execute(&mut trail, &7).await, Ok(7));
        assert_eq!(trail, vec!["even", "reject", "terminal"]);
    }

    #[tokio::test]
    async fn test_error_stops_chain() {
        let mut trail = Trail::new();
        assert_eq!(
            host().execute(&mut trail, &101).await,
            Err("101 is too large".to_string())
        );
        assert_eq!(trail, vec!["even", "reject"]);
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let host = MiddlewareBuilder::new(Terminal).build();
        let mut trail = Trail::new();
        assert_eq!(host.execute(&mut trail, &3).await, Ok(3));
        assert_eq!(trail, vec!["terminal"]);
    }
}
