//! Clock & Config: a monotonic time source and the read-only typed bundle of
//! every tunable the server exposes.
//!
//! Splitting the clock out as a trait (rather than calling `Utc::now()`
//! directly from handlers) is what lets the periodic-sweep tests fast-forward
//! time without a real `sleep` — see `tests/idle_sweeps.rs`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::{Arc, Mutex};

/// A source of "now". The production clock is the wall clock; tests inject a
/// [`FakeClock`] they can advance deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to, for deterministic sweeper tests.
pub struct FakeClock {
    current: Mutex<DateTime<Utc>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self { current: Mutex::new(start) })
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.current.lock().expect("fake clock poisoned");
        *guard += delta;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().expect("fake clock poisoned")
    }
}

/// The complete, read-only configuration bundle. Deserialized from a TOML
/// file and then overridden field-by-field by `--set KEY=VALUE` CLI
/// arguments; see [`Config::apply_override`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    #[serde(default = "default_close_timeout_sec")]
    pub close_timeout_sec: u64,

    #[serde(default = "default_websocket_limit")]
    pub websocket_limit: usize,
    #[serde(default = "default_total_game_limit")]
    pub total_game_limit: usize,
    #[serde(default = "default_in_progress_game_limit")]
    pub in_progress_game_limit: usize,
    #[serde(default = "default_registered_player_limit")]
    pub registered_player_limit: usize,

    #[serde(default = "default_websocket_idle_thresh_min")]
    pub websocket_idle_thresh_min: u64,
    #[serde(default = "default_websocket_inactive_thresh_min")]
    pub websocket_inactive_thresh_min: u64,
    #[serde(default = "default_player_idle_thresh_min")]
    pub player_idle_thresh_min: u64,
    #[serde(default = "default_player_inactive_thresh_min")]
    pub player_inactive_thresh_min: u64,
    #[serde(default = "default_game_idle_thresh_min")]
    pub game_idle_thresh_min: u64,
    #[serde(default = "default_game_inactive_thresh_min")]
    pub game_inactive_thresh_min: u64,
    #[serde(default = "default_game_retention_thresh_min")]
    pub game_retention_thresh_min: u64,

    #[serde(default = "default_check_period_sec")]
    pub idle_websocket_check_period_sec: u64,
    #[serde(default = "default_check_delay_sec")]
    pub idle_websocket_check_delay_sec: u64,
    #[serde(default = "default_check_period_sec")]
    pub idle_player_check_period_sec: u64,
    #[serde(default = "default_check_delay_sec")]
    pub idle_player_check_delay_sec: u64,
    #[serde(default = "default_check_period_sec")]
    pub idle_game_check_period_sec: u64,
    #[serde(default = "default_check_delay_sec")]
    pub idle_game_check_delay_sec: u64,
    #[serde(default = "default_check_period_sec")]
    pub obsolete_game_check_period_sec: u64,
    #[serde(default = "default_check_delay_sec")]
    pub obsolete_game_check_delay_sec: u64,

    #[serde(default = "default_send_message_scope")]
    pub send_message_scope: SendMessageScope,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendMessageScope {
    Game,
    Server,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_close_timeout_sec() -> u64 {
    30
}
fn default_websocket_limit() -> usize {
    1000
}
fn default_total_game_limit() -> usize {
    1000
}
fn default_in_progress_game_limit() -> usize {
    500
}
fn default_registered_player_limit() -> usize {
    1000
}
fn default_websocket_idle_thresh_min() -> u64 {
    10
}
fn default_websocket_inactive_thresh_min() -> u64 {
    20
}
fn default_player_idle_thresh_min() -> u64 {
    10
}
fn default_player_inactive_thresh_min() -> u64 {
    20
}
fn default_game_idle_thresh_min() -> u64 {
    10
}
fn default_game_inactive_thresh_min() -> u64 {
    20
}
fn default_game_retention_thresh_min() -> u64 {
    60
}
fn default_check_period_sec() -> u64 {
    60
}
fn default_check_delay_sec() -> u64 {
    5
}
fn default_send_message_scope() -> SendMessageScope {
    SendMessageScope::Server
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Loads the TOML file at `path`. Missing optional fields fall back to
    /// their defaults; unknown keys are a fatal error (`deny_unknown_fields`)
    /// so typos in a config file are caught at startup rather than silently
    /// ignored.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Applies a single `KEY=VALUE` override on top of an already-loaded
    /// config, by round-tripping through a JSON merge. Unknown keys are
    /// rejected the same way an unknown TOML key is.
    pub fn apply_override(&mut self, raw: &str) -> anyhow::Result<()> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("override '{raw}' is not in KEY=VALUE form"))?;

        let mut as_json = serde_json::to_value(&*self)?;
        let Some(map) = as_json.as_object_mut() else {
            unreachable!("Config always serializes to a JSON object");
        };
        if !map.contains_key(key) {
            anyhow::bail!("unknown config key '{key}'");
        }
        let parsed_value: serde_json::Value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        map.insert(key.to_string(), parsed_value);

        *self = serde_json::from_value(as_json)
            .map_err(|e| anyhow::anyhow!("override '{raw}' produced an invalid config: {e}"))?;
        Ok(())
    }

    /// All per-seat/per-game/per-player overrides, expressed as a single
    /// `HashMap`, for tests that want to assert on the whole bundle at once.
    #[cfg(test)]
    pub fn as_map(&self) -> std::collections::HashMap<String, serde_json::Value> {
        let value = serde_json::to_value(self).expect("Config always serializes");
        value
            .as_object()
            .expect("Config always serializes to an object")
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl serde::Serialize for Config {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Config", 24)?;
        s.serialize_field("server_host", &self.server_host)?;
        s.serialize_field("server_port", &self.server_port)?;
        s.serialize_field("close_timeout_sec", &self.close_timeout_sec)?;
        s.serialize_field("websocket_limit", &self.websocket_limit)?;
        s.serialize_field("total_game_limit", &self.total_game_limit)?;
        s.serialize_field("in_progress_game_limit", &self.in_progress_game_limit)?;
        s.serialize_field("registered_player_limit", &self.registered_player_limit)?;
        s.serialize_field("websocket_idle_thresh_min", &self.websocket_idle_thresh_min)?;
        s.serialize_field(
            "websocket_inactive_thresh_min",
            &self.websocket_inactive_thresh_min,
        )?;
        s.serialize_field("player_idle_thresh_min", &self.player_idle_thresh_min)?;
        s.serialize_field(
            "player_inactive_thresh_min",
            &self.player_inactive_thresh_min,
        )?;
        s.serialize_field("game_idle_thresh_min", &self.game_idle_thresh_min)?;
        s.serialize_field("game_inactive_thresh_min", &self.game_inactive_thresh_min)?;
        s.serialize_field(
            "game_retention_thresh_min",
            &self.game_retention_thresh_min,
        )?;
        s.serialize_field(
            "idle_websocket_check_period_sec",
            &self.idle_websocket_check_period_sec,
        )?;
        s.serialize_field(
            "idle_websocket_check_delay_sec",
            &self.idle_websocket_check_delay_sec,
        )?;
        s.serialize_field(
            "idle_player_check_period_sec",
            &self.idle_player_check_period_sec,
        )?;
        s.serialize_field(
            "idle_player_check_delay_sec",
            &self.idle_player_check_delay_sec,
        )?;
        s.serialize_field(
            "idle_game_check_period_sec",
            &self.idle_game_check_period_sec,
        )?;
        s.serialize_field(
            "idle_game_check_delay_sec",
            &self.idle_game_check_delay_sec,
        )?;
        s.serialize_field(
            "obsolete_game_check_period_sec",
            &self.obsolete_game_check_period_sec,
        )?;
        s.serialize_field(
            "obsolete_game_check_delay_sec",
            &self.obsolete_game_check_delay_sec,
        )?;
        s.serialize_field("send_message_scope", &self.send_message_scope)?;
        s.serialize_field("log_level", &self.log_level)?;
        s.end()
    }
}

impl serde::Serialize for SendMessageScope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(match self {
            SendMessageScope::Game => "game",
            SendMessageScope::Server => "server",
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str("").expect("empty TOML document satisfies all Config defaults")
    }
}
