use std::net::{Ipv4Addr, SocketAddr};

use tokio_util::sync::CancellationToken;

use crate::libdns::server::server::Request;

pub use crate::dns_error::DnsError;

pub use crate::libdns::proto::{
    op::{self, Header, Message, MessageType, OpCode, Query, ResponseCode},
    rr::{self, Name, RData, Record, RecordType},
};

/// Per query state shared by every stage of the handler chain.
#[derive(Debug)]
pub struct DnsContext {
    cancel: CancellationToken,
    response: Option<Message>,
}

impl DnsContext {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            response: None,
        }
    }

    /// Cancelled when the caller gives up on this query.
    #[inline]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Response sink, accepts a single message per query.
    pub fn write_msg(&mut self, message: Message) -> Result<(), DnsError> {
        if self.response.is_some() {
            return Err(DnsError::ResponseAlreadyWritten);
        }
        self.response = Some(message);
        Ok(())
    }

    #[inline]
    pub fn response(&self) -> Option<&Message> {
        self.response.as_ref()
    }

    #[inline]
    pub fn take_response(&mut self) -> Option<Message> {
        self.response.take()
    }
}

/// An incoming question.
#[derive(Debug, Clone)]
pub struct DnsRequest {
    header: Header,
    query: Query,
    src: SocketAddr,
}

impl DnsRequest {
    pub fn new(header: Header, query: Query, src: SocketAddr) -> Self {
        Self { header, query, src }
    }

    /// A standalone query for `name`, as a stub resolver would send it.
    pub fn query(name: Name, query_type: RecordType) -> Self {
        let mut header = Header::new();
        header
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true);

        Self::new(
            header,
            Query::query(name, query_type),
            SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0),
        )
    }

    #[inline]
    pub fn question(&self) -> &Query {
        &self.query
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    #[inline]
    pub fn src(&self) -> SocketAddr {
        self.src
    }

    /// Starts a reply carrying the request id, opcode and question.
    pub fn reply(&self, response_code: ResponseCode) -> Message {
        let mut message = Message::new();
        message
            .set_id(self.header.id())
            .set_message_type(MessageType::Response)
            .set_op_code(self.header.op_code())
            .set_recursion_desired(self.header.recursion_desired())
            .set_response_code(response_code);
        message.add_query(self.query.clone());
        message
    }
}

impl From<&Request> for DnsRequest {
    fn from(request: &Request) -> Self {
        let info = request.request_info();
        Self::new(*info.header, info.query.original().clone(), info.src)
    }
}

/// The response code handed back to the chain host. The message itself, if
/// any, travels through [`DnsContext::write_msg`].
pub type DnsResponse = ResponseCode;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_reply_mirrors_request() {
        let req = DnsRequest::query(Name::from_str("host1.example.org.").unwrap(), RecordType::A);
        let reply = req.reply(ResponseCode::ServFail);

        assert_eq!(reply.id(), req.header().id());
        assert_eq!(reply.message_type(), MessageType::Response);
        assert_eq!(reply.response_code(), ResponseCode::ServFail);
        assert!(reply.recursion_desired());
        assert!(!reply.authoritative());
        assert_eq!(reply.queries(), &[req.question().clone()]);
        assert!(reply.answers().is_empty());
    }

    #[test]
    fn test_single_response_write() {
        let req = DnsRequest::query(Name::from_str("a.example.org.").unwrap(), RecordType::A);
        let mut ctx = DnsContext::new(CancellationToken::new());
        assert!(ctx.response().is_none());

        ctx.write_msg(req.reply(ResponseCode::NoError)).unwrap();
        assert!(matches!(
            ctx.write_msg(req.reply(ResponseCode::ServFail)),
            Err(DnsError::ResponseAlreadyWritten)
        ));

        let written = ctx.take_response().unwrap();
        assert_eq!(written.response_code(), ResponseCode::NoError);
        assert!(ctx.response().is_none());
    }
}
