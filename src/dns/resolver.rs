//! Serialized DNS resolution service.
//!
//! A single worker task owns the [`Transport`] and processes queries one at a
//! time, in submission order. Callers talk to it through a cloneable
//! [`Resolver`] handle; each request carries its own oneshot reply channel, so
//! a slow or vanished caller can never hold up another caller's answer.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::proto::op::{Message, MessageType, OpCode, Query};
use hickory_resolver::proto::rr::{Name, RecordType};
use log::debug;
use rand::Rng;
use tokio::sync::{mpsc, oneshot};
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;

use super::transport::Transport;
use crate::config::{
    RESOLVER_MAX_RETRIES, RESOLVER_QUEUE_CAPACITY, RETRY_FACTOR, RETRY_MAX_DELAY,
};
use crate::error_handling::{InitializationError, ResolveError};

/// Resolves one question to a raw DNS reply.
///
/// The reply is returned whatever its response code; interpreting NXDOMAIN,
/// SERVFAIL and friends is the caller's business.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidName`] if `name` is not a fully-qualified
    /// domain name, or the last transport error once retries are exhausted.
    async fn resolve(&self, name: &str, record_type: RecordType) -> Result<Message, ResolveError>;
}

/// How failed exchanges are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: usize,
    /// Delay before the first retry, doubling afterwards. `None` retries immediately.
    pub backoff: Option<Duration>,
}

impl RetryPolicy {
    /// Builds a policy from the `--retry-backoff-ms` option (0 disables backoff).
    pub fn from_backoff_ms(backoff_ms: u64) -> Self {
        Self {
            max_retries: RESOLVER_MAX_RETRIES,
            backoff: (backoff_ms > 0).then(|| Duration::from_millis(backoff_ms)),
        }
    }

    /// Delays to wait before each retry; its length bounds the number of retries.
    fn delays(&self) -> Vec<Duration> {
        match self.backoff {
            None => vec![Duration::ZERO; self.max_retries],
            Some(initial) => {
                // from_millis(b).factor(f) yields f*b, f*b^2, ..., so base 2 doubles each step
                let factor = (initial.as_millis() as u64).div_ceil(RETRY_FACTOR).max(1);
                ExponentialBackoff::from_millis(RETRY_FACTOR)
                    .factor(factor)
                    .max_delay(RETRY_MAX_DELAY)
                    .take(self.max_retries)
                    .collect()
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_backoff_ms(0)
    }
}

struct Request {
    name: Name,
    record_type: RecordType,
    reply: oneshot::Sender<Result<Message, ResolveError>>,
}

/// Handle to the resolver worker. Cheap to clone; the worker stops once every
/// handle has been dropped.
#[derive(Debug, Clone)]
pub struct Resolver {
    queue: mpsc::Sender<Request>,
}

impl Resolver {
    /// Spawns the resolver worker on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`InitializationError::NoNameserversError`] if `servers` is empty.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<T: Transport>(
        servers: Vec<SocketAddr>,
        transport: T,
        retry: RetryPolicy,
    ) -> Result<Self, InitializationError> {
        if servers.is_empty() {
            return Err(InitializationError::NoNameserversError);
        }
        debug!(
            "Starting DNS resolver with {} nameserver(s): {:?}",
            servers.len(),
            servers
        );

        let (queue, requests) = mpsc::channel(RESOLVER_QUEUE_CAPACITY);
        let worker = Worker {
            servers,
            transport,
            retry,
        };
        tokio::spawn(worker.run(requests));
        Ok(Self { queue })
    }
}

#[async_trait]
impl Resolve for Resolver {
    async fn resolve(&self, name: &str, record_type: RecordType) -> Result<Message, ResolveError> {
        let invalid = |reason: String| ResolveError::InvalidName {
            name: name.to_string(),
            reason,
        };
        let parsed = Name::from_ascii(name).map_err(|e| invalid(e.to_string()))?;
        if !parsed.is_fqdn() {
            return Err(invalid("not fully qualified".to_string()));
        }

        let (reply, response) = oneshot::channel();
        self.queue
            .send(Request {
                name: parsed,
                record_type,
                reply,
            })
            .await
            .map_err(|_| ResolveError::ServiceUnavailable)?;
        response
            .await
            .map_err(|_| ResolveError::ServiceUnavailable)?
    }
}

struct Worker<T> {
    servers: Vec<SocketAddr>,
    transport: T,
    retry: RetryPolicy,
}

impl<T: Transport> Worker<T> {
    async fn run(self, mut requests: mpsc::Receiver<Request>) {
        while let Some(request) = requests.recv().await {
            let result = self.resolve(&request.name, request.record_type).await;
            if request.reply.send(result).is_err() {
                debug!(
                    "Caller for {} {} went away before the reply was delivered",
                    request.name, request.record_type
                );
            }
        }
        debug!("DNS resolver worker stopped");
    }

    async fn resolve(&self, name: &Name, record_type: RecordType) -> Result<Message, ResolveError> {
        let attempts = AtomicUsize::new(0);
        let attempts = &attempts;
        Retry::spawn(self.retry.delays(), move || async move {
            let n = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            let server = self.pick_server();
            let query = build_query(name, record_type);
            match self.transport.exchange(server, &query).await {
                Ok(reply) => Ok(reply),
                Err(e) => {
                    debug!("Attempt {n} for {name} {record_type} via {server} failed: {e}");
                    Err(e)
                }
            }
        })
        .await
    }

    /// Uniform choice among the configured servers. Not failover-aware.
    fn pick_server(&self) -> SocketAddr {
        let index = rand::rng().random_range(0..self.servers.len());
        self.servers[index]
    }
}

fn build_query(name: &Name, record_type: RecordType) -> Message {
    let mut message = Message::new();
    message
        .set_id(rand::random())
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(name.clone(), record_type));
    message
}
