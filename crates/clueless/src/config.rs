//! Client configuration.
//!
//! Everything has a default, so `ClientConfig::default()` talks to a
//! server on localhost. Override in code with the `with_*` methods, or
//! from the environment with [`ClientConfig::from_env`]:
//!
//! | Variable                      | Default               |
//! |-------------------------------|-----------------------|
//! | `CLUELESS_WS_URL`             | `ws://localhost:8081` |
//! | `CLUELESS_RECONNECT_DELAY_MS` | `2000`                |
//! | `CLUELESS_RECONNECT_ATTEMPTS` | `5`                   |
//! | `CLUELESS_PING_INTERVAL_SECS` | `0` (no keepalive)    |
//! | `CLUELESS_QUEUE_CAPACITY`     | `256`                 |
//! | `CLUELESS_EVENT_LOG_CAPACITY` | `200`                 |
//! | `CLUELESS_GAME_ID`            | `default`             |

use std::str::FromStr;
use std::time::Duration;

use clueless_protocol::GameId;
use clueless_session::SessionConfig;
use clueless_transport::{DEFAULT_QUEUE_CAPACITY, ReconnectPolicy};

use crate::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8081";

const ENV_WS_URL: &str = "CLUELESS_WS_URL";
const ENV_RECONNECT_DELAY_MS: &str = "CLUELESS_RECONNECT_DELAY_MS";
const ENV_RECONNECT_ATTEMPTS: &str = "CLUELESS_RECONNECT_ATTEMPTS";
const ENV_PING_INTERVAL_SECS: &str = "CLUELESS_PING_INTERVAL_SECS";
const ENV_QUEUE_CAPACITY: &str = "CLUELESS_QUEUE_CAPACITY";
const ENV_EVENT_LOG_CAPACITY: &str = "CLUELESS_EVENT_LOG_CAPACITY";
const ENV_GAME_ID: &str = "CLUELESS_GAME_ID";

/// Settings for one [`ClueClient`](crate::ClueClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the game server.
    pub endpoint: String,
    /// How the link retries after an unclean drop.
    pub reconnect: ReconnectPolicy,
    /// Send PING this often while connected. `None` disables keepalive.
    pub ping_interval: Option<Duration>,
    /// Intents held while the link is not open. Past this, dispatch fails.
    pub queue_capacity: usize,
    /// Event-log size and default game.
    pub session: SessionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reconnect: ReconnectPolicy::default(),
            ping_interval: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            session: SessionConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Reads the process environment. Unset variables keep their defaults.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if a variable is set to something that
    /// doesn't parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env), but reads variables through
    /// `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_WS_URL) {
            config.endpoint = url.trim().to_string();
        }
        if let Some(ms) = parse::<u64>(ENV_RECONNECT_DELAY_MS, get(ENV_RECONNECT_DELAY_MS))? {
            config.reconnect.delay = Duration::from_millis(ms);
        }
        if let Some(n) = parse::<u32>(ENV_RECONNECT_ATTEMPTS, get(ENV_RECONNECT_ATTEMPTS))? {
            config.reconnect.max_attempts = n;
        }
        if let Some(secs) = parse::<u64>(ENV_PING_INTERVAL_SECS, get(ENV_PING_INTERVAL_SECS))? {
            config.ping_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(n) = parse::<usize>(ENV_QUEUE_CAPACITY, get(ENV_QUEUE_CAPACITY))? {
            config.queue_capacity = n;
        }
        if let Some(n) = parse::<usize>(ENV_EVENT_LOG_CAPACITY, get(ENV_EVENT_LOG_CAPACITY))? {
            config.session.event_log_capacity = n;
        }
        if let Some(game) = get(ENV_GAME_ID) {
            config.session.game_id = GameId::from(game.trim());
        }

        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect.delay = delay;
        self
    }

    pub fn with_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.reconnect.max_attempts = attempts;
        self
    }

    pub fn with_ping_interval(mut self, every: Duration) -> Self {
        self.ping_interval = (!every.is_zero()).then_some(every);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_event_log_capacity(mut self, capacity: usize) -> Self {
        self.session.event_log_capacity = capacity;
        self
    }

    pub fn with_game_id(mut self, game_id: impl Into<GameId>) -> Self {
        self.session.game_id = game_id.into();
        self
    }
}

fn parse<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value: raw,
            })
        })
        .transpose()
}
