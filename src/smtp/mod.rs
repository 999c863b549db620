//! SMTP probing of mail servers.
//!
//! This module connects to a mail exchanger and records how it presents itself:
//! - The greeting banner
//! - Its EHLO and HELP replies
//! - Whether it accepts STARTTLS, and the certificate it then presents
//!
//! Uses `tokio-rustls` for the STARTTLS handshake and `x509-parser` to read the
//! certificate subject.

mod reply;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::{SMTP_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS};
use crate::error_handling::ProbeError;

use reply::{read_reply, Reply};

/// What a mail server revealed during one probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    pub banner: Option<String>,
    pub ehlo: Option<String>,
    pub help: Option<String>,
    /// The server answered STARTTLS with 220
    pub starttls: bool,
    pub certificate_subject: Option<String>,
    /// Why the STARTTLS handshake failed, if it did
    pub tls_error: Option<String>,
    /// `None` when not probed
    pub heartbleed_vulnerable: Option<bool>,
}

/// Probes one mail server address.
#[async_trait]
pub trait MailProbe: Send + Sync {
    /// Talks to the server at `addr`, known by the name `host`.
    ///
    /// # Errors
    ///
    /// Returns an error when the conversation could not be completed up to
    /// STARTTLS. TLS failures are reported in [`ProbeReport::tls_error`].
    async fn probe(&self, host: &str, addr: SocketAddr) -> Result<ProbeReport, ProbeError>;
}

/// [`MailProbe`] speaking SMTP over TCP.
pub struct SmtpProbe {
    ehlo_domain: String,
    connector: TlsConnector,
    timeout: Duration,
    handshake_timeout: Duration,
}

impl SmtpProbe {
    /// Creates a probe that announces itself as `ehlo_domain` and verifies
    /// certificates against the webpki root store.
    pub fn new(ehlo_domain: impl Into<String>) -> Self {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self {
            ehlo_domain: ehlo_domain.into(),
            connector: TlsConnector::from(Arc::new(config)),
            timeout: Duration::from_secs(SMTP_TIMEOUT_SECS),
            handshake_timeout: Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        }
    }

    /// Overrides the connect and per-reply timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn read<S>(&self, conn: &mut S, stage: &'static str) -> Result<Reply, ProbeError>
    where
        S: AsyncBufRead + Unpin,
    {
        tokio::time::timeout(self.timeout, read_reply(conn))
            .await
            .map_err(|_| ProbeError::Timeout { stage })?
    }

    async fn command<S>(
        &self,
        conn: &mut S,
        line: &str,
        stage: &'static str,
    ) -> Result<Reply, ProbeError>
    where
        S: AsyncBufRead + AsyncWrite + Unpin,
    {
        conn.write_all(format!("{line}\r\n").as_bytes()).await?;
        conn.flush().await?;
        self.read(conn, stage).await
    }

    async fn quit<S>(&self, conn: &mut S)
    where
        S: AsyncBufRead + AsyncWrite + Unpin,
    {
        if let Err(e) = self.command(conn, "QUIT", "QUIT").await {
            debug!("QUIT not acknowledged: {e}");
        }
    }
}

#[async_trait]
impl MailProbe for SmtpProbe {
    async fn probe(&self, host: &str, addr: SocketAddr) -> Result<ProbeReport, ProbeError> {
        debug!("Probing {host} at {addr}");

        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ProbeError::Timeout { stage: "connect" })?
            .map_err(|source| ProbeError::Connect { addr, source })?;
        let mut conn = BufReader::new(stream);
        let mut report = ProbeReport::default();

        report.banner = Some(self.read(&mut conn, "greeting").await?.text());

        let ehlo = format!("EHLO {}", self.ehlo_domain);
        report.ehlo = Some(self.command(&mut conn, &ehlo, "EHLO").await?.text());
        report.help = Some(self.command(&mut conn, "HELP", "HELP").await?.text());

        let starttls = self.command(&mut conn, "STARTTLS", "STARTTLS").await?;
        if starttls.code != 220 {
            debug!("{host} refused STARTTLS: {} {}", starttls.code, starttls.text());
            self.quit(&mut conn).await;
            return Ok(report);
        }
        report.starttls = true;

        let server_name = match ServerName::try_from(host.trim_end_matches('.').to_string()) {
            Ok(name) => name,
            Err(e) => {
                report.tls_error = Some(format!("invalid server name {host}: {e}"));
                return Ok(report);
            }
        };

        let handshake = self.connector.connect(server_name, conn.into_inner());
        match tokio::time::timeout(self.handshake_timeout, handshake).await {
            Ok(Ok(tls)) => {
                report.certificate_subject = certificate_subject(&tls);
                self.quit(&mut BufReader::new(tls)).await;
            }
            Ok(Err(e)) => report.tls_error = Some(e.to_string()),
            Err(_) => {
                report.tls_error = Some(format!(
                    "TLS handshake timed out after {}s",
                    self.handshake_timeout.as_secs()
                ))
            }
        }

        Ok(report)
    }
}

/// Subject of the server's leaf certificate.
fn certificate_subject(tls: &TlsStream<TcpStream>) -> Option<String> {
    let cert = tls.get_ref().1.peer_certificates()?.first()?;
    match x509_parser::parse_x509_certificate(cert.as_ref()) {
        Ok((_, cert)) => Some(cert.tbs_certificate.subject.to_string()),
        Err(e) => {
            debug!("Failed to parse peer certificate: {e}");
            None
        }
    }
}
