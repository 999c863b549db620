//! DNS resolution.
//!
//! This module provides the resolver service every check queries through:
//! - A wire transport (DNS over TCP) behind the [`Transport`] trait
//! - A single worker that serializes all exchanges and retries failures
//! - Classification of answer records into the shapes checks report on
//!
//! Replies are returned raw, including non-success response codes.

mod answer;
mod resolver;
mod transport;

// Re-export public API
pub use answer::{answers, Answer};
pub use hickory_resolver::proto::op::{Message, ResponseCode};
pub use hickory_resolver::proto::rr::RecordType;
pub use resolver::{Resolve, Resolver, RetryPolicy};
pub use transport::{TcpTransport, Transport};

#[cfg(test)]
pub(crate) mod testing;
