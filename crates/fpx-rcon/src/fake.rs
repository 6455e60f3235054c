//! In-process WebRCON server for tests.
//!
//! Accepts upgrades only on `/<password>`, precedes every reply with a chat
//! broadcast carrying identifier `-1`, and answers:
//! - a scripted command with its scripted body,
//! - `echo <x>` with `<x>`,
//! - `garbage` with a non-JSON frame,
//! - `hang` never.
//!
//! Anything else gets an empty message.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;

/// A listening fake server; stops accepting when dropped.
#[derive(Debug)]
pub struct FakeServer {
    addr: SocketAddr,
    accept: JoinHandle<()>,
}

impl FakeServer {
    pub async fn start(password: &str, replies: &[(&str, &str)]) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let path = format!("/{password}");
        let replies: Arc<HashMap<String, String>> = Arc::new(
            replies
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );

        let accept = tokio::spawn(async move {
            while let Ok((tcp, _)) = listener.accept().await {
                tokio::spawn(serve(tcp, path.clone(), Arc::clone(&replies)));
            }
        });

        Ok(Self { addr, accept })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.accept.abort();
    }
}

async fn serve(tcp: TcpStream, path: String, replies: Arc<HashMap<String, String>>) {
    let check = move |req: &Request, resp: Response| {
        if req.uri().path() == path {
            Ok(resp)
        } else {
            let mut err = ErrorResponse::new(None);
            *err.status_mut() = StatusCode::UNAUTHORIZED;
            Err(err)
        }
    };
    let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(tcp, check).await else {
        return;
    };

    while let Some(Ok(msg)) = ws.next().await {
        let Message::Text(text) = msg else { continue };
        let Ok(req) = serde_json::from_str::<serde_json::Value>(text.as_str()) else {
            continue;
        };
        if req["Name"] != "WebRcon" {
            continue;
        }
        let id = req["Identifier"].as_i64().unwrap_or_default();
        let command = req["Message"].as_str().unwrap_or_default().to_string();

        let chat = json!({
            "Message": "[CHAT] someone: hi",
            "Identifier": -1,
            "Type": "Chat",
            "Stacktrace": ""
        });
        if ws.send(Message::Text(chat.to_string().into())).await.is_err() {
            return;
        }

        let reply = match command.as_str() {
            "hang" => continue,
            "garbage" => {
                let _ = ws.send(Message::Text("not json".to_string().into())).await;
                continue;
            }
            c => match replies.get(c) {
                Some(body) => body.clone(),
                None => c.strip_prefix("echo ").unwrap_or_default().to_string(),
            },
        };
        let resp = json!({
            "Message": reply,
            "Identifier": id,
            "Type": "Generic",
            "Stacktrace": ""
        });
        if ws.send(Message::Text(resp.to_string().into())).await.is_err() {
            return;
        }
    }
}
