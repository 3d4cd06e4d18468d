// MIT License - Copyright (c) 2026 The dahua-cam Authors

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::constants::DEFAULT_PORT;
use crate::error::{CamError, Result};

/// TCP keep-alive probing applied to every socket the client opens.
///
/// The defaults are aggressive: a dead peer is noticed about two seconds
/// after the line goes quiet, at the cost of occasional false positives on
/// lossy links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeepAlivePolicy {
    /// Idle time before the first probe, in milliseconds
    pub idle_ms: u64,
    /// Interval between probes, in milliseconds
    pub interval_ms: u64,
    /// Unanswered probes before the connection is dropped
    pub retries: u32,
}

impl Default for KeepAlivePolicy {
    fn default() -> Self {
        Self {
            idle_ms: 1000,
            interval_ms: 1000,
            retries: 1,
        }
    }
}

impl KeepAlivePolicy {
    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// How the event listener waits between connection attempts.
///
/// The delay doubles with every consecutive failed attempt, starting at
/// `delay_ms` and capped at `max_delay_ms`. With the defaults both are 30s,
/// i.e. a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect attempt, in milliseconds
    pub delay_ms: u64,
    /// Upper bound for the backoff delay, in milliseconds
    pub max_delay_ms: u64,
    /// Consecutive failed attempts before the listener gives up (0 = never)
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay_ms: 30_000,
            max_delay_ms: 30_000,
            max_attempts: 0,
        }
    }
}

impl ReconnectPolicy {
    /// Computes the delay to apply before the given reconnect attempt.
    ///
    /// `attempt` is 1-based and counts attempts since the last successful
    /// connection.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let max = self.max_delay_ms.max(self.delay_ms);
        let mut delay = self.delay_ms;
        for _ in 1..attempt {
            if delay == 0 || delay >= max {
                break;
            }
            delay = delay.saturating_mul(2).min(max);
        }
        Duration::from_millis(delay)
    }

    /// Whether another attempt is allowed after `failed` consecutive failures.
    pub fn allows(&self, failed: u32) -> bool {
        self.max_attempts == 0 || failed < self.max_attempts
    }
}

/// Configuration for talking to one camera.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CamConfig {
    /// Camera hostname or IP address
    pub hostname: String,
    /// HTTP port (default: 80)
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Bound on one-shot requests (name, snapshot) and on the wait for the
    /// event stream's response headers, in milliseconds
    pub request_timeout_ms: u64,
    /// TCP connect timeout for every request, including the event stream
    pub connect_timeout_ms: u64,
    /// Capacity of the notification broadcast channel
    pub event_channel_capacity: usize,
    pub keep_alive: KeepAlivePolicy,
    pub reconnect: ReconnectPolicy,
}

impl Default for CamConfig {
    fn default() -> Self {
        Self {
            hostname: "192.168.1.108".to_string(),
            port: DEFAULT_PORT,
            username: "admin".to_string(),
            password: String::new(),
            request_timeout_ms: 10_000,
            connect_timeout_ms: 10_000,
            event_channel_capacity: 256,
            keep_alive: KeepAlivePolicy::default(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl CamConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> CamConfigBuilder {
        CamConfigBuilder::default()
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| CamError::Config {
            details: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CamError::Config {
            details: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject configs that can never work.
    pub fn validate(&self) -> Result<()> {
        if self.hostname.trim().is_empty() {
            return Err(CamError::Config {
                details: "hostname is empty".to_string(),
            });
        }
        if self.port == 0 {
            return Err(CamError::Config {
                details: "port must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// `http://{hostname}:{port}`
    pub fn base_uri(&self) -> String {
        format!("http://{}:{}", self.hostname, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Builder for CamConfig.
#[derive(Debug, Clone, Default)]
pub struct CamConfigBuilder {
    config: CamConfig,
}

impl CamConfigBuilder {
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.hostname = hostname.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    pub fn event_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.event_channel_capacity = capacity;
        self
    }

    pub fn keep_alive(mut self, policy: KeepAlivePolicy) -> Self {
        self.config.keep_alive = policy;
        self
    }

    pub fn reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.config.reconnect = policy;
        self
    }

    /// Shorthand for a fixed reconnect delay.
    pub fn reconnect_delay_ms(mut self, ms: u64) -> Self {
        self.config.reconnect.delay_ms = ms;
        self.config.reconnect.max_delay_ms = ms;
        self
    }

    pub fn build(self) -> CamConfig {
        self.config
    }
}
