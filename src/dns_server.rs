use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;

use crate::dns::{DnsContext, DnsRequest, Message};
use crate::dns_mw::DnsMiddlewareHandler;
use crate::libdns::proto::op::{Edns, Header, MessageType, OpCode, ResponseCode};
use crate::libdns::server::{
    authority::MessageResponseBuilder,
    server::{Request, RequestHandler, ResponseHandler, ResponseInfo},
    ServerFuture,
};
use crate::log::{debug, error, info, warn};

/// Feeds every incoming query through the handler chain and sends back
/// whatever the chain produced.
pub struct DnsRequestHandler {
    handler: DnsMiddlewareHandler,
    shutdown: CancellationToken,
}

impl DnsRequestHandler {
    /// Queries still in flight are cancelled together with `shutdown`.
    pub fn new(handler: DnsMiddlewareHandler, shutdown: CancellationToken) -> Self {
        Self { handler, shutdown }
    }

    async fn resolve(&self, req: &DnsRequest) -> Message {
        let mut ctx = DnsContext::new(self.shutdown.child_token());

        let response_code = match self.handler.search(&mut ctx, req).await {
            Ok(code) => code,
            Err(err) => {
                debug!("{} {}: {}", req.question().name(), req.question().query_type(), err);
                err.response_code()
            }
        };

        ctx.take_response().unwrap_or_else(|| req.reply(response_code))
    }
}

#[async_trait::async_trait]
impl RequestHandler for DnsRequestHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let mut builder = MessageResponseBuilder::from_message_request(request);

        if let Some(req_edns) = request.edns() {
            let mut edns = Edns::new();
            edns.set_max_payload(req_edns.max_payload().max(512));
            builder.edns(edns);
        }

        let result = if request.message_type() != MessageType::Query
            || request.op_code() != OpCode::Query
        {
            warn!(
                "unsupported request from {}: {:?} {:?}",
                request.src(),
                request.message_type(),
                request.op_code()
            );
            response_handle
                .send_response(builder.error_msg(request.header(), ResponseCode::NotImp))
                .await
        } else {
            let req = DnsRequest::from(request);
            debug!(
                "query received: {} {} {} from {}",
                request.id(),
                req.question().name(),
                req.question().query_type(),
                req.src()
            );

            let message = self.resolve(&req).await;

            let mut header = Header::response_from_request(request.header());
            header
                .set_authoritative(message.authoritative())
                .set_recursion_available(message.recursion_available())
                .set_response_code(message.response_code());

            let response = builder.build(
                header,
                message.answers().iter(),
                message.name_servers().iter(),
                std::iter::empty(),
                message.additionals().iter(),
            );
            response_handle.send_response(response).await
        };

        match result {
            Ok(info) => info,
            Err(err) => {
                error!("failed to send response: {}", err);
                let mut header = Header::response_from_request(request.header());
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }
}

/// Registers a UDP socket and a TCP listener for every address in `binds`.
pub async fn bind_server(
    handler: DnsRequestHandler,
    binds: &[SocketAddr],
    tcp_idle_time: Duration,
) -> io::Result<ServerFuture<DnsRequestHandler>> {
    let mut server = ServerFuture::new(handler);

    for addr in binds {
        let socket = UdpSocket::bind(addr).await?;
        info!("listening on udp://{}", socket.local_addr()?);
        server.register_socket(socket);

        let listener = TcpListener::bind(addr).await?;
        info!("listening on tcp://{}", listener.local_addr()?);
        server.register_listener(listener, tcp_idle_time);
    }

    Ok(server)
}
