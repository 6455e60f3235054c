//! Scripted control links for coordinator and dispatcher tests.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fpx_core::SnapshotSource;
use fpx_rcon::{ConnectFuture, Connector, ControlLink, ExecuteFuture, RconError};

use crate::coordinator::ScrapeOptions;

pub const SERVER_INFO: &str = r#"{
    "Hostname": "test server",
    "MaxPlayers": 100,
    "Players": 42,
    "Queued": 3,
    "Joining": 1,
    "EntityCount": 183211,
    "Uptime": 86400,
    "Framerate": 59.5,
    "Memory": 7811,
    "Collections": 211,
    "NetworkIn": 123456,
    "NetworkOut": 654321,
    "Restarting": true
}"#;

pub const BUILD_INFO: &str = r#"{
    "Date": 1715600000,
    "Scm": {"Type": "git", "ChangeId": "a1b2c3", "Branch": "main", "Repo": "rust",
            "Comment": "weekly", "Author": "ci", "Date": "2024-05-13"},
    "Build": {"Id": "8812", "Number": "1455", "Tag": "release", "Url": "https://ci/8812",
              "Name": "Rust", "Node": "ci-04"},
    "Valid": true
}"#;

pub const PLAYERS: &str = "id name ping\n1 \"alice\" 30\n2 \"bob\" 40\n";

/// Shared counters observed by the tests.
#[derive(Debug, Default)]
pub struct Probe {
    pub connects: AtomicUsize,
    pub closes: AtomicUsize,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub commands: Mutex<Vec<String>>,
}

impl Probe {
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone)]
pub struct ScriptedConnector {
    pub refuse: bool,
    /// command → body; `None` makes the command fail.
    pub responses: HashMap<&'static str, Option<&'static str>>,
    pub delay: Duration,
    pub probe: Arc<Probe>,
}

impl ScriptedConnector {
    pub fn healthy() -> Self {
        let mut responses = HashMap::new();
        responses.insert("buildinfo", Some(BUILD_INFO));
        responses.insert("serverinfo", Some(SERVER_INFO));
        responses.insert("players", Some(PLAYERS));
        Self {
            refuse: false,
            responses,
            delay: Duration::ZERO,
            probe: Arc::new(Probe::default()),
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::healthy()
        }
    }

    pub fn failing(mut self, command: &'static str) -> Self {
        self.responses.insert(command, None);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn options(&self, source: SnapshotSource) -> ScrapeOptions {
        ScrapeOptions {
            password: "pw".to_string(),
            namespace: String::new(),
            snapshot_source: source,
            connector: Arc::new(self.clone()),
        }
    }
}

impl Connector for ScriptedConnector {
    fn connect<'a>(&'a self, address: &'a str, _password: &'a str) -> ConnectFuture<'a> {
        Box::pin(async move {
            self.probe.connects.fetch_add(1, Ordering::SeqCst);
            if self.refuse {
                return Err(RconError::Connect(format!("{address}: connection refused")));
            }
            let now = self.probe.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.probe.max_active.fetch_max(now, Ordering::SeqCst);
            Ok(Box::new(ScriptedLink {
                script: self.clone(),
                closed: false,
            }) as Box<dyn ControlLink>)
        })
    }
}

#[derive(Debug)]
struct ScriptedLink {
    script: ScriptedConnector,
    closed: bool,
}

impl ControlLink for ScriptedLink {
    fn execute<'a>(&'a mut self, command: &'a str) -> ExecuteFuture<'a> {
        Box::pin(async move {
            if self.closed {
                return Err(RconError::Closed);
            }
            self.script
                .probe
                .commands
                .lock()
                .unwrap()
                .push(command.to_string());
            if !self.script.delay.is_zero() {
                tokio::time::sleep(self.script.delay).await;
            }
            match self.script.responses.get(command) {
                Some(Some(body)) => Ok(body.to_string()),
                Some(None) => Err(RconError::Timeout {
                    operation: command.to_string(),
                    after: Duration::from_secs(5),
                }),
                None => Err(RconError::Protocol(format!("unknown command {command}"))),
            }
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if !self.closed {
                self.closed = true;
                self.script.probe.active.fetch_sub(1, Ordering::SeqCst);
                self.script.probe.closes.fetch_add(1, Ordering::SeqCst);
            }
        })
    }
}
