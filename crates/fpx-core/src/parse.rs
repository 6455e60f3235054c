//! Decoders for the game server's command responses.
//!
//! Decoding never fails. Unknown keys are ignored and a missing or
//! mistyped key leaves its field at the zero value; the names of those
//! fields are returned alongside the value so the caller can log them.

use serde_json::{Map, Value};

use crate::types::{BuildFingerprint, PlayerRoster, ServerSnapshot};

/// A decoded value plus the fields that fell back to their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    /// Dotted field paths (e.g. `Build.Id`) that were absent or mistyped.
    pub defaulted: Vec<String>,
}

impl<T> Decoded<T> {
    /// True when every known field was present with the expected type.
    pub fn is_complete(&self) -> bool {
        self.defaulted.is_empty()
    }
}

/// Read-only view over one JSON object level.
#[derive(Clone, Copy)]
struct Fields<'a> {
    object: Option<&'a Map<String, Value>>,
    scope: &'static str,
}

impl<'a> Fields<'a> {
    fn root(value: Option<&'a Value>) -> Self {
        Self {
            object: value.and_then(Value::as_object),
            scope: "",
        }
    }

    /// Exact key first, then an ASCII case-insensitive match.
    fn get(&self, key: &str) -> Option<&'a Value> {
        let object = self.object?;
        object.get(key).or_else(|| {
            object
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    fn nested(&self, key: &'static str) -> Fields<'a> {
        Fields {
            object: self.get(key).and_then(Value::as_object),
            scope: key,
        }
    }

    fn path(&self, key: &str) -> String {
        if self.scope.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.scope)
        }
    }

    fn int(&self, key: &str, defaulted: &mut Vec<String>) -> i64 {
        match self.get(key) {
            Some(v) if v.is_i64() => v.as_i64().unwrap_or_default(),
            Some(v) if v.is_number() => v.as_f64().map(|f| f as i64).unwrap_or_default(),
            _ => {
                defaulted.push(self.path(key));
                0
            }
        }
    }

    fn float(&self, key: &str, defaulted: &mut Vec<String>) -> f64 {
        match self.get(key).and_then(Value::as_f64) {
            Some(f) => f,
            None => {
                defaulted.push(self.path(key));
                0.0
            }
        }
    }

    fn text(&self, key: &str, defaulted: &mut Vec<String>) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                defaulted.push(self.path(key));
                String::new()
            }
        }
    }

    fn flag(&self, key: &str, defaulted: &mut Vec<String>) -> bool {
        match self.get(key).and_then(Value::as_bool) {
            Some(b) => b,
            None => {
                defaulted.push(self.path(key));
                false
            }
        }
    }
}

fn parse_json(body: &str) -> Option<Value> {
    serde_json::from_str(body.trim()).ok()
}

/// Decode a `serverinfo` response body.
pub fn parse_server_info(body: &str) -> Decoded<ServerSnapshot> {
    let root = parse_json(body);
    let f = Fields::root(root.as_ref());
    let mut d = Vec::new();

    let value = ServerSnapshot {
        hostname: f.text("Hostname", &mut d),
        map: f.text("Map", &mut d),
        game_time: f.text("GameTime", &mut d),
        save_created_time: f.text("SaveCreatedTime", &mut d),
        players: f.int("Players", &mut d),
        queued: f.int("Queued", &mut d),
        joining: f.int("Joining", &mut d),
        max_players: f.int("MaxPlayers", &mut d),
        entity_count: f.int("EntityCount", &mut d),
        uptime: f.int("Uptime", &mut d),
        framerate: f.float("Framerate", &mut d),
        memory: f.int("Memory", &mut d),
        collections: f.int("Collections", &mut d),
        network_in: f.int("NetworkIn", &mut d),
        network_out: f.int("NetworkOut", &mut d),
        restarting: f.flag("Restarting", &mut d),
    };

    Decoded {
        value,
        defaulted: d,
    }
}

/// Decode a `buildinfo` response body.
pub fn parse_build_info(body: &str) -> Decoded<BuildFingerprint> {
    let root = parse_json(body);
    let f = Fields::root(root.as_ref());
    let scm = f.nested("Scm");
    let build = f.nested("Build");
    let mut d = Vec::new();

    let value = BuildFingerprint {
        date: f.int("Date", &mut d),
        build_id: build.text("Id", &mut d),
        build_number: build.text("Number", &mut d),
        build_tag: build.text("Tag", &mut d),
        build_url: build.text("Url", &mut d),
        build_name: build.text("Name", &mut d),
        build_node: build.text("Node", &mut d),
        valid: f.flag("Valid", &mut d),
        scm_type: scm.text("Type", &mut d),
        scm_change_id: scm.text("ChangeId", &mut d),
        scm_branch: scm.text("Branch", &mut d),
        scm_repo: scm.text("Repo", &mut d),
        scm_comment: scm.text("Comment", &mut d),
        scm_author: scm.text("Author", &mut d),
        scm_date: scm.text("Date", &mut d),
    };

    Decoded {
        value,
        defaulted: d,
    }
}

/// Decode a `players` response: a header line, then one line per player.
///
/// Blank lines are not counted, so a header-only or empty body yields an
/// empty roster.
pub fn parse_player_roster(body: &str) -> PlayerRoster {
    let entries = body
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .map(str::to_string)
        .collect();
    PlayerRoster { entries }
}

impl BuildFingerprint {
    /// Build time rendered as an absolute UTC timestamp.
    pub fn date_string(&self) -> String {
        match chrono::DateTime::from_timestamp(self.date, 0) {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S +0000 UTC").to_string(),
            None => self.date.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_INFO: &str = r#"{
        "Hostname": "My Rust Server",
        "MaxPlayers": 100,
        "Players": 42,
        "Queued": 3,
        "Joining": 1,
        "EntityCount": 183211,
        "GameTime": "05/14/2024 13:22:01",
        "Uptime": 86400,
        "Map": "Procedure Map",
        "Framerate": 59.5,
        "Memory": 7811,
        "Collections": 211,
        "NetworkIn": 123456,
        "NetworkOut": 654321,
        "Restarting": true,
        "SaveCreatedTime": "05/13/2024 23:00:00",
        "Version": 2510,
        "Protocol": "2510.244.1"
    }"#;

    const BUILD_INFO: &str = r#"{
        "Date": 1715600000,
        "Scm": {
            "Type": "git",
            "ChangeId": "a1b2c3",
            "Branch": "main",
            "Repo": "rust_reboot",
            "Comment": "fix \"quoted\" thing",
            "Author": "builder",
            "Date": "2024-05-13"
        },
        "Build": {
            "Id": "8812",
            "Number": 1455,
            "Tag": "release",
            "Url": "https://ci.example/8812",
            "Name": "Rust Dedicated",
            "Node": "ci-04"
        },
        "Valid": true
    }"#;

    #[test]
    fn server_info_full() {
        let decoded = parse_server_info(SERVER_INFO);
        assert!(decoded.is_complete(), "defaulted: {:?}", decoded.defaulted);

        let s = decoded.value;
        assert_eq!(s.hostname, "My Rust Server");
        assert_eq!(s.players, 42);
        assert_eq!(s.queued, 3);
        assert_eq!(s.joining, 1);
        assert_eq!(s.max_players, 100);
        assert_eq!(s.entity_count, 183211);
        assert_eq!(s.uptime, 86400);
        assert_eq!(s.framerate, 59.5);
        assert_eq!(s.memory, 7811);
        assert_eq!(s.collections, 211);
        assert_eq!(s.network_in, 123456);
        assert_eq!(s.network_out, 654321);
        assert!(s.restarting);
    }

    #[test]
    fn server_info_missing_fields_default() {
        let decoded = parse_server_info(r#"{"Players": 7, "Unknown": "x"}"#);
        assert_eq!(decoded.value.players, 7);
        assert_eq!(decoded.value.max_players, 0);
        assert!(!decoded.value.restarting);
        assert!(decoded.defaulted.contains(&"MaxPlayers".to_string()));
        assert!(!decoded.defaulted.contains(&"Players".to_string()));
    }

    #[test]
    fn server_info_wrong_type_defaults_field() {
        let decoded = parse_server_info(r#"{"Players": "many", "Restarting": "yes"}"#);
        assert_eq!(decoded.value.players, 0);
        assert!(!decoded.value.restarting);
        assert!(decoded.defaulted.contains(&"Players".to_string()));
        assert!(decoded.defaulted.contains(&"Restarting".to_string()));
    }

    #[test]
    fn server_info_fractional_int_truncates() {
        let decoded = parse_server_info(r#"{"Memory": 7811.9}"#);
        assert_eq!(decoded.value.memory, 7811);
    }

    #[test]
    fn server_info_garbage_body() {
        let decoded = parse_server_info("Unknown command: serverinfo");
        assert_eq!(decoded.value, ServerSnapshot::default());
        assert_eq!(decoded.defaulted.len(), 16);
    }

    #[test]
    fn server_info_case_insensitive_keys() {
        let decoded = parse_server_info(r#"{"players": 5, "maxplayers": 50}"#);
        assert_eq!(decoded.value.players, 5);
        assert_eq!(decoded.value.max_players, 50);
    }

    #[test]
    fn build_info_full() {
        let decoded = parse_build_info(BUILD_INFO);
        assert!(decoded.is_complete(), "defaulted: {:?}", decoded.defaulted);

        let b = decoded.value;
        assert_eq!(b.date, 1715600000);
        assert_eq!(b.build_id, "8812");
        assert_eq!(b.build_number, "1455");
        assert_eq!(b.build_tag, "release");
        assert_eq!(b.build_node, "ci-04");
        assert!(b.valid);
        assert_eq!(b.scm_type, "git");
        assert_eq!(b.scm_change_id, "a1b2c3");
        assert_eq!(b.scm_comment, "fix \"quoted\" thing");
        assert_eq!(b.scm_date, "2024-05-13");
    }

    #[test]
    fn build_info_lowercase_keys() {
        let decoded = parse_build_info(r#"{"date": 10, "build": {"id": "x"}, "valid": false}"#);
        assert_eq!(decoded.value.date, 10);
        assert_eq!(decoded.value.build_id, "x");
        assert!(decoded.defaulted.contains(&"Scm.Branch".to_string()));
        assert!(!decoded.defaulted.contains(&"Valid".to_string()));
    }

    #[test]
    fn build_date_string() {
        let b = BuildFingerprint {
            date: 1715600000,
            ..Default::default()
        };
        assert_eq!(b.date_string(), "2024-05-13 11:33:20 +0000 UTC");

        let epoch = BuildFingerprint::default();
        assert_eq!(epoch.date_string(), "1970-01-01 00:00:00 +0000 UTC");
    }

    #[test]
    fn roster_header_only_is_zero() {
        let roster = parse_player_roster("id name ping snap updt posi dist\n");
        assert_eq!(roster.count(), 0);
    }

    #[test]
    fn roster_empty_body_is_zero() {
        assert_eq!(parse_player_roster("").count(), 0);
        assert_eq!(parse_player_roster("\n\n").count(), 0);
    }

    #[test]
    fn roster_counts_player_lines() {
        let body = "id                name   ping snap\n\
                    76561198000000001 \"alice\" 32 0\n\
                    76561198000000002 \"bob\"   48 0\n\
                    76561198000000003 \"carol\" 12 0\n";
        let roster = parse_player_roster(body);
        assert_eq!(roster.count(), 3);
        assert!(roster.entries[0].contains("alice"));
    }

    #[test]
    fn roster_ignores_trailing_blank_lines() {
        let roster = parse_player_roster("header\r\nplayer-one\r\n\r\n  \n");
        assert_eq!(roster.count(), 1);
        assert_eq!(roster.entries[0], "player-one");
    }
}
