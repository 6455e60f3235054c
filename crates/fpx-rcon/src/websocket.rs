//! WebRCON over WebSocket.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};
use url::Url;

use crate::error::{RconError, RconResult};
use crate::link::{ConnectFuture, Connector, ControlLink, ExecuteFuture};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Name the server expects on every request frame.
const CLIENT_NAME: &str = "WebRcon";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RequestFrame<'a> {
    identifier: i64,
    message: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResponseFrame {
    #[serde(default)]
    message: String,
    #[serde(default)]
    identifier: i64,
    #[serde(default, rename = "Type")]
    kind: String,
}

/// Build the WebSocket URL for `address`, carrying `password` as the path.
///
/// `address` is `host:port`, or a full `ws://host:port` URL.
pub fn endpoint_url(address: &str, password: &str) -> RconResult<Url> {
    let address = address.trim();
    if address.is_empty() {
        return Err(RconError::InvalidAddress("address is empty".to_string()));
    }

    let base = if address.contains("://") {
        address.to_string()
    } else {
        format!("ws://{address}")
    };
    let mut url =
        Url::parse(&base).map_err(|e| RconError::InvalidAddress(format!("{address}: {e}")))?;

    if url.scheme() != "ws" {
        return Err(RconError::InvalidAddress(format!(
            "{address}: unsupported scheme {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(RconError::InvalidAddress(format!("{address}: missing host")));
    }

    url.path_segments_mut()
        .map_err(|_| RconError::InvalidAddress(address.to_string()))?
        .clear()
        .push(password);
    Ok(url)
}

/// Opens [`WebRconLink`]s with bounded connect and command durations.
#[derive(Debug, Clone)]
pub struct WebRconConnector {
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl WebRconConnector {
    pub fn new(connect_timeout: Duration, command_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            command_timeout,
        }
    }

    pub async fn open(&self, address: &str, password: &str) -> RconResult<WebRconLink> {
        let url = endpoint_url(address, password)?;

        let (stream, _) = tokio::time::timeout(
            self.connect_timeout,
            tokio_tungstenite::connect_async(url.as_str()),
        )
        .await
        .map_err(|_| RconError::Timeout {
            operation: "connect".to_string(),
            after: self.connect_timeout,
        })?
        .map_err(|e| match e {
            tungstenite::Error::Http(resp) => {
                RconError::Auth(format!("{address}: upgrade refused with {}", resp.status()))
            }
            other => RconError::Connect(format!("{address}: {other}")),
        })?;

        debug!(%address, "control link open");
        Ok(WebRconLink {
            address: address.to_string(),
            stream: Some(stream),
            next_id: 0,
            command_timeout: self.command_timeout,
        })
    }
}

impl Default for WebRconConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(5))
    }
}

impl Connector for WebRconConnector {
    fn connect<'a>(&'a self, address: &'a str, password: &'a str) -> ConnectFuture<'a> {
        Box::pin(async move {
            let link = self.open(address, password).await?;
            Ok(Box::new(link) as Box<dyn ControlLink>)
        })
    }
}

/// An open WebRCON session.
pub struct WebRconLink {
    address: String,
    /// `None` once closed.
    stream: Option<WsStream>,
    next_id: i64,
    command_timeout: Duration,
}

impl fmt::Debug for WebRconLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebRconLink")
            .field("address", &self.address)
            .field("open", &self.stream.is_some())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl WebRconLink {
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub async fn run(&mut self, command: &str) -> RconResult<String> {
        if command.trim().is_empty() {
            return Err(RconError::EmptyCommand);
        }
        let stream = self.stream.as_mut().ok_or(RconError::Closed)?;

        self.next_id += 1;
        let id = self.next_id;
        let frame = serde_json::to_string(&RequestFrame {
            identifier: id,
            message: command,
            name: CLIENT_NAME,
        })
        .map_err(|e| RconError::Protocol(e.to_string()))?;

        debug!(address = %self.address, %command, id, "running command");

        let exchange = async {
            stream
                .send(Message::Text(frame.into()))
                .await
                .map_err(|e| RconError::Send(e.to_string()))?;
            await_response(stream, id).await
        };

        tokio::time::timeout(self.command_timeout, exchange)
            .await
            .map_err(|_| RconError::Timeout {
                operation: command.to_string(),
                after: self.command_timeout,
            })?
    }

    pub async fn shutdown(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                trace!(address = %self.address, error = %e, "close frame not delivered");
            }
            debug!(address = %self.address, "control link closed");
        }
    }
}

/// Read frames until the response carrying `id` arrives.
///
/// Console broadcasts (chat, log lines) share the socket and carry other
/// identifiers; they are skipped.
async fn await_response(stream: &mut WsStream, id: i64) -> RconResult<String> {
    loop {
        let msg = match stream.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => return Err(RconError::Receive(e.to_string())),
            None => return Err(RconError::Closed),
        };

        match msg {
            Message::Text(text) => {
                let resp: ResponseFrame = serde_json::from_str(text.as_str())
                    .map_err(|e| RconError::Protocol(format!("bad frame: {e}")))?;
                if resp.identifier == id {
                    return Ok(resp.message);
                }
                trace!(identifier = resp.identifier, kind = %resp.kind, "skipping unrelated frame");
            }
            Message::Close(_) => return Err(RconError::Closed),
            _ => {}
        }
    }
}

impl ControlLink for WebRconLink {
    fn execute<'a>(&'a mut self, command: &'a str) -> ExecuteFuture<'a> {
        Box::pin(self.run(command))
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.shutdown())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;

    use crate::fake::FakeServer;

    const PASSWORD: &str = "s3cret";

    async fn spawn_server() -> FakeServer {
        FakeServer::start(PASSWORD, &[]).await.unwrap()
    }

    fn connector() -> WebRconConnector {
        WebRconConnector::new(Duration::from_secs(2), Duration::from_millis(300))
    }

    #[test]
    fn url_from_host_port() {
        let url = endpoint_url("10.0.0.5:28016", "pw").unwrap();
        assert_eq!(url.as_str(), "ws://10.0.0.5:28016/pw");
    }

    #[test]
    fn url_keeps_explicit_scheme() {
        let url = endpoint_url("ws://rust.example:28016", "pw").unwrap();
        assert_eq!(url.as_str(), "ws://rust.example:28016/pw");
    }

    #[test]
    fn url_escapes_password() {
        let url = endpoint_url("host:1", "a b/c").unwrap();
        assert_eq!(url.as_str(), "ws://host:1/a%20b%2Fc");
    }

    #[test]
    fn url_rejects_bad_input() {
        assert!(matches!(endpoint_url("", "pw"), Err(RconError::InvalidAddress(_))));
        assert!(matches!(
            endpoint_url("http://host:1", "pw"),
            Err(RconError::InvalidAddress(_))
        ));
        assert!(matches!(
            endpoint_url("host:notaport", "pw"),
            Err(RconError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn execute_round_trip_skips_broadcasts() {
        let server = spawn_server().await;
        let addr = server.addr();
        let mut link = connector().open(&addr.to_string(), PASSWORD).await.unwrap();

        assert_eq!(link.run("echo first").await.unwrap(), "first");
        assert_eq!(link.run("echo second").await.unwrap(), "second");

        link.shutdown().await;
        assert!(!link.is_open());
    }

    #[tokio::test]
    async fn wrong_password_is_auth_error() {
        let server = spawn_server().await;
        let addr = server.addr();
        let err = connector().open(&addr.to_string(), "nope").await.unwrap_err();
        assert!(matches!(err, RconError::Auth(_)), "got {err:?}");
        assert!(err.is_connect());
    }

    #[tokio::test]
    async fn refused_connection_is_connect_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = connector().open(&addr.to_string(), PASSWORD).await.unwrap_err();
        assert!(matches!(err, RconError::Connect(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unanswered_command_times_out() {
        let server = spawn_server().await;
        let addr = server.addr();
        let mut link = connector().open(&addr.to_string(), PASSWORD).await.unwrap();

        let err = link.run("hang").await.unwrap_err();
        assert!(matches!(err, RconError::Timeout { .. }), "got {err:?}");
        assert!(!err.is_connect());
    }

    #[tokio::test]
    async fn malformed_frame_is_protocol_error() {
        let server = spawn_server().await;
        let addr = server.addr();
        let mut link = connector().open(&addr.to_string(), PASSWORD).await.unwrap();

        let err = link.run("garbage").await.unwrap_err();
        assert!(matches!(err, RconError::Protocol(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_command_rejected_locally() {
        let server = spawn_server().await;
        let addr = server.addr();
        let mut link = connector().open(&addr.to_string(), PASSWORD).await.unwrap();
        assert!(matches!(link.run("  ").await, Err(RconError::EmptyCommand)));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let server = spawn_server().await;
        let addr = server.addr();
        let mut link: Box<dyn ControlLink> = connector()
            .connect(&addr.to_string(), PASSWORD)
            .await
            .unwrap();

        link.close().await;
        link.close().await;
        assert!(matches!(link.execute("echo x").await, Err(RconError::Closed)));
    }
}
