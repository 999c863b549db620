// Shared test helpers: an in-process DNS-over-TCP server and captured output.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use hickory_resolver::proto::op::{Message, MessageType, ResponseCode};
use hickory_resolver::proto::rr::rdata::{MX, NS, TXT};
use hickory_resolver::proto::rr::{Name, RData, Record};
use hickory_resolver::proto::serialize::binary::BinEncodable;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[allow(dead_code)] // Used by other test files
pub fn txt(owner: &str, text: &str) -> Record {
    Record::from_rdata(
        Name::from_ascii(owner).expect("valid owner name"),
        300,
        RData::TXT(TXT::new(vec![text.to_string()])),
    )
}

#[allow(dead_code)] // Used by other test files
pub fn mx(owner: &str, preference: u16, exchange: &str) -> Record {
    Record::from_rdata(
        Name::from_ascii(owner).expect("valid owner name"),
        300,
        RData::MX(MX::new(
            preference,
            Name::from_ascii(exchange).expect("valid exchange name"),
        )),
    )
}

#[allow(dead_code)] // Used by other test files
pub fn ns(owner: &str, host: &str) -> Record {
    Record::from_rdata(
        Name::from_ascii(owner).expect("valid owner name"),
        300,
        RData::NS(NS(Name::from_ascii(host).expect("valid host name"))),
    )
}

/// The records of a small, well-configured zone.
#[allow(dead_code)] // Used by other test files
pub fn example_zone() -> Vec<Record> {
    vec![
        txt("example.com.", "v=spf1 ip4:192.0.2.0/24 -all"),
        txt("_dmarc.example.com.", "v=DMARC1; p=reject"),
        mx("example.com.", 10, "mx.example.com."),
        ns("example.com.", "ns1.example.net."),
    ]
}

/// Answers a query from `records`.
///
/// Names with no records at all get NXDOMAIN; known names get NOERROR with
/// whichever records match the queried type.
fn answer(query: &Message, records: &[Record]) -> Message {
    let mut reply = Message::new();
    reply
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_op_code(query.op_code())
        .add_queries(query.queries().to_vec());

    if let Some(question) = query.queries().first() {
        let known = records.iter().any(|r| r.name() == question.name());
        let matching: Vec<Record> = records
            .iter()
            .filter(|r| r.name() == question.name() && r.record_type() == question.query_type())
            .cloned()
            .collect();
        reply.set_response_code(if known {
            ResponseCode::NoError
        } else {
            ResponseCode::NXDomain
        });
        reply.add_answers(matching);
    }
    reply
}

/// Starts a DNS-over-TCP server on localhost serving `records`.
#[allow(dead_code)] // Used by other test files
pub async fn spawn_dns_server(records: Vec<Record>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test DNS server");
    let addr = listener.local_addr().expect("Bound listener has an address");
    let records = Arc::new(records);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let records = Arc::clone(&records);
            tokio::spawn(async move {
                let len = stream.read_u16().await.expect("query length");
                let mut buf = vec![0u8; usize::from(len)];
                stream.read_exact(&mut buf).await.expect("query body");
                let query = Message::from_vec(&buf).expect("well-formed query");

                let bytes = answer(&query, &records).to_bytes().expect("encodable reply");
                stream
                    .write_u16(bytes.len() as u16)
                    .await
                    .expect("reply length");
                stream.write_all(&bytes).await.expect("reply body");
            });
        }
    });
    addr
}

/// In-memory writer whose contents can be read back after rendering.
#[derive(Clone, Default)]
#[allow(dead_code)] // Used by other test files
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

#[allow(dead_code)] // Used by other test files
impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().expect("buffer lock").clone()).expect("utf-8 output")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
