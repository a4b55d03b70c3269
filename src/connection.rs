//! Async TCP/TLS driver.
//!
//! Opens a connection for a [`ClientConfig`] and pumps it: raw reads go to
//! [`Client::receive`] and lines queued in the client's [`Outbox`] are
//! written through a [`LineCodec`], which appends CRLF.
//!
//! The client is not `Send`; run the driver on a current-thread runtime or
//! inside a `LocalSet`.

use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::ClientConfig as TlsConfig;
use tokio_rustls::TlsConnector;
use tokio_util::codec::FramedWrite;
use tracing::{debug, info, warn};

use crate::client::Client;
use crate::error::ClientError;
use crate::line::{decode_utf8_prefix, LineCodec};
use crate::state::ClientConfig;
use crate::transport::Outbox;

const READ_CHUNK: usize = 4096;

/// A byte stream the driver can pump.
pub trait IrcStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> IrcStream for S {}

/// Open a connection to the configured server.
///
/// TLS is used when `config.use_tls` is set, with the caller's rustls
/// configuration (root store, ALPN and so on).
///
/// # Errors
///
/// Returns [`ClientError::Transport`] if TLS is requested without a TLS
/// configuration or the hostname is not a valid server name, and
/// [`ClientError::Protocol`] for socket failures.
pub async fn connect(
    config: &ClientConfig,
    tls: Option<Arc<TlsConfig>>,
) -> Result<Box<dyn IrcStream>, ClientError> {
    let addr = (config.hostname.as_str(), config.port);
    let stream = TcpStream::connect(addr).await?;
    if let Err(e) = enable_keepalive(&stream) {
        warn!("failed to enable TCP keepalive: {}", e);
    }
    info!(host = %config.hostname, port = config.port, tls = config.use_tls, "connected");

    if !config.use_tls {
        return Ok(Box::new(stream));
    }

    let tls = tls.ok_or_else(|| {
        ClientError::Transport("use_tls is set but no TLS configuration was given".to_owned())
    })?;
    let name = ServerName::try_from(config.hostname.as_str())
        .map_err(|e| ClientError::Transport(format!("invalid server name: {}", e)))?
        .to_owned();
    let stream = TlsConnector::from(tls).connect(name, stream).await?;
    debug!("TLS handshake complete");
    Ok(Box::new(stream))
}

fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    SockRef::from(stream).set_tcp_keepalive(&keepalive)
}

/// Pump `stream` until the server closes it.
///
/// Signals [`Client::connected`] first and always signals
/// [`Client::disconnected`] at the end. A read failure is reported through
/// [`Client::errored`] before the disconnect. An error returned while
/// processing input, including an oversized line, ends the session and is
/// returned.
pub async fn run<S>(stream: S, client: &mut Client<Outbox>) -> Result<(), ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, writer) = tokio::io::split(stream);
    let mut sink = FramedWrite::new(writer, LineCodec);

    let outcome = match client.connected() {
        Ok(()) => pump(&mut reader, &mut sink, client).await,
        Err(e) => Err(e),
    };
    if let Err(e) = &outcome {
        warn!("closing session: {}", e);
    }

    let closed = client.disconnected();
    outcome.and(closed)
}

async fn pump<R, W>(
    reader: &mut R,
    sink: &mut FramedWrite<W, LineCodec>,
    client: &mut Client<Outbox>,
) -> Result<(), ClientError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    flush(client, sink).await?;

    let mut buf = vec![0u8; READ_CHUNK];
    let mut partial = Vec::new();
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) => {
                if let Err(handler) = client.errored(e.to_string()) {
                    warn!("error handler failed: {}", handler);
                }
                return Err(e.into());
            }
        };

        partial.extend_from_slice(&buf[..n]);
        let (text, tail) = decode_utf8_prefix(&partial);
        partial = tail.to_vec();

        // Queued replies go out even when a later line failed.
        let received = client.receive(&text);
        let flushed = flush(client, sink).await;
        received.and(flushed)?;
    }
}

async fn flush<W>(
    client: &mut Client<Outbox>,
    sink: &mut FramedWrite<W, LineCodec>,
) -> Result<(), ClientError>
where
    W: AsyncWrite + Unpin,
{
    if client.transport().is_empty() {
        return Ok(());
    }
    let lines: Vec<String> = client.transport_mut().drain().collect();
    for line in lines {
        sink.feed(line).await?;
    }
    sink.flush().await?;
    Ok(())
}
