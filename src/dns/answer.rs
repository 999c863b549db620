//! Classification of answer records.
//!
//! Checks only care about a handful of record types. This module turns raw
//! answer records into an [`Answer`] so every check matches on the same shape
//! and handles unexpected record types the same way.

use std::net::IpAddr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hickory_resolver::proto::op::Message;
use hickory_resolver::proto::rr::dnssec::rdata::DNSSECRData;
use hickory_resolver::proto::rr::{RData, Record, RecordType};

/// An answer record, reduced to what the checks report on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// TXT record; its character-strings joined without separator
    Txt(String),
    /// Mail exchanger
    Mx { preference: u16, exchange: String },
    /// Nameserver
    Ns(String),
    /// A or AAAA address
    Address(IpAddr),
    /// DNSSEC public key
    Dnskey {
        secure_entry_point: bool,
        algorithm: String,
        /// Base64, as in zone files
        public_key: String,
    },
    /// Any record type the checks do not interpret
    Other(RecordType),
}

impl Answer {
    pub fn from_record(record: &Record) -> Self {
        match record.data() {
            Some(RData::TXT(txt)) => Answer::Txt(
                txt.txt_data()
                    .iter()
                    .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                    .collect::<Vec<String>>()
                    .join(""),
            ),
            Some(RData::MX(mx)) => Answer::Mx {
                preference: mx.preference(),
                exchange: mx.exchange().to_utf8(),
            },
            Some(RData::NS(ns)) => Answer::Ns(ns.to_utf8()),
            Some(RData::A(a)) => Answer::Address(IpAddr::V4(a.0)),
            Some(RData::AAAA(aaaa)) => Answer::Address(IpAddr::V6(aaaa.0)),
            Some(RData::DNSSEC(DNSSECRData::DNSKEY(key))) => Answer::Dnskey {
                secure_entry_point: key.secure_entry_point(),
                algorithm: key.algorithm().to_string(),
                public_key: BASE64.encode(key.public_key()),
            },
            _ => Answer::Other(record.record_type()),
        }
    }
}

/// Classifies every record in the answer section, in order.
pub fn answers(message: &Message) -> impl Iterator<Item = Answer> + '_ {
    message.answers().iter().map(Answer::from_record)
}
