//! Test doubles for code that resolves through [`Resolve`].

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;

use async_trait::async_trait;
use hickory_resolver::proto::op::{Message, MessageType, ResponseCode};
use hickory_resolver::proto::rr::dnssec::rdata::{DNSSECRData, DNSKEY};
use hickory_resolver::proto::rr::dnssec::Algorithm;
use hickory_resolver::proto::rr::rdata::{A, AAAA, CNAME, MX, NS, TXT};
use hickory_resolver::proto::rr::{Name, RData, Record, RecordType};

use super::Resolve;
use crate::error_handling::ResolveError;

/// Builds a reply with the given response code and answer records.
pub fn response(rcode: ResponseCode, answers: Vec<Record>) -> Message {
    let mut message = Message::new();
    message
        .set_message_type(MessageType::Response)
        .set_response_code(rcode)
        .add_answers(answers);
    message
}

pub fn txt_record(owner: &str, text: &str) -> Record {
    Record::from_rdata(
        Name::from_ascii(owner).unwrap(),
        300,
        RData::TXT(TXT::new(vec![text.to_string()])),
    )
}

pub fn mx_record(owner: &str, preference: u16, exchange: &str) -> Record {
    Record::from_rdata(
        Name::from_ascii(owner).unwrap(),
        300,
        RData::MX(MX::new(preference, Name::from_ascii(exchange).unwrap())),
    )
}

pub fn ns_record(owner: &str, host: &str) -> Record {
    Record::from_rdata(
        Name::from_ascii(owner).unwrap(),
        300,
        RData::NS(NS(Name::from_ascii(host).unwrap())),
    )
}

pub fn address_record(owner: &str, ip: IpAddr) -> Record {
    let rdata = match ip {
        IpAddr::V4(v4) => RData::A(A(v4)),
        IpAddr::V6(v6) => RData::AAAA(AAAA(v6)),
    };
    Record::from_rdata(Name::from_ascii(owner).unwrap(), 300, rdata)
}

pub fn cname_record(owner: &str, target: &str) -> Record {
    Record::from_rdata(
        Name::from_ascii(owner).unwrap(),
        300,
        RData::CNAME(CNAME(Name::from_ascii(target).unwrap())),
    )
}

pub fn dnskey_record(owner: &str, secure_entry_point: bool, public_key: &[u8]) -> Record {
    let key = DNSKEY::new(
        true,
        secure_entry_point,
        false,
        Algorithm::RSASHA256,
        public_key.to_vec(),
    );
    Record::from_rdata(
        Name::from_ascii(owner).unwrap(),
        3600,
        RData::DNSSEC(DNSSECRData::DNSKEY(key)),
    )
}

enum Reply {
    Message(Message),
    TransportError,
}

/// Resolver with canned replies. Unknown questions get an empty NOERROR reply.
#[derive(Default)]
pub struct StaticResolver {
    replies: HashMap<(String, RecordType), Reply>,
    queries: Mutex<Vec<(String, RecordType)>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answers(mut self, name: &str, record_type: RecordType, answers: Vec<Record>) -> Self {
        self.replies.insert(
            (name.to_string(), record_type),
            Reply::Message(response(ResponseCode::NoError, answers)),
        );
        self
    }

    pub fn with_rcode(mut self, name: &str, record_type: RecordType, rcode: ResponseCode) -> Self {
        self.replies.insert(
            (name.to_string(), record_type),
            Reply::Message(response(rcode, Vec::new())),
        );
        self
    }

    pub fn with_transport_error(mut self, name: &str, record_type: RecordType) -> Self {
        self.replies
            .insert((name.to_string(), record_type), Reply::TransportError);
        self
    }

    /// Questions asked so far, in order.
    pub fn queries(&self) -> Vec<(String, RecordType)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Resolve for StaticResolver {
    async fn resolve(&self, name: &str, record_type: RecordType) -> Result<Message, ResolveError> {
        self.queries
            .lock()
            .unwrap()
            .push((name.to_string(), record_type));
        match self.replies.get(&(name.to_string(), record_type)) {
            Some(Reply::Message(message)) => Ok(message.clone()),
            Some(Reply::TransportError) => Err(ResolveError::Timeout {
                server: "192.0.2.53:53".parse().unwrap(),
            }),
            None => Ok(response(ResponseCode::NoError, Vec::new())),
        }
    }
}

/// Resolver that fails every query, as if the network were down.
pub struct FailingResolver;

#[async_trait]
impl Resolve for FailingResolver {
    async fn resolve(&self, _name: &str, _record_type: RecordType) -> Result<Message, ResolveError> {
        Err(ResolveError::Timeout {
            server: "192.0.2.53:53".parse().unwrap(),
        })
    }
}

/// Resolver that answers every query with the same non-success response code.
pub struct RcodeResolver(pub ResponseCode);

#[async_trait]
impl Resolve for RcodeResolver {
    async fn resolve(&self, _name: &str, _record_type: RecordType) -> Result<Message, ResolveError> {
        Ok(response(self.0, Vec::new()))
    }
}
