//! Bridge configuration
//!
//! Loaded from YAML. Every field has a default, so an empty file (or no
//! file at all) is a valid configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use hidbridge_protocol::{CaptureFormat, FrameLayout};
use hidbridge_scheduler::{MAX_TICK_HZ, MIN_TICK_HZ};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use tracing::level_filters::LevelFilter;

pub const DEFAULT_COMMAND_PORT: u16 = 8808;
pub const DEFAULT_CAPTURE_PORT: u16 = 8809;
pub const DEFAULT_TICK_HZ: u32 = 100;

/// One problem found by [`BridgeConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("output.tick_hz = {0} is outside 1..=1000")]
    TickRate(u32),

    #[error("auth.expected_mac {0:?} is not a 32-bit hex value")]
    ExpectedMac(String),

    #[error("output.sink is udp but output.sink_addr is not set")]
    MissingSinkAddr,

    #[error("output.send_timeout_ms must be greater than zero")]
    ZeroSendTimeout,

    #[error("capture.port {0} is the same as network.command_port")]
    PortConflict(u16),

    #[error("logging.level {0:?} is not a log level")]
    LogLevel(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub network: NetworkConfig,
    pub auth: AuthConfig,
    pub sequence: SequenceConfig,
    pub output: OutputConfig,
    pub capture: CaptureConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub listen_addr: IpAddr,
    pub command_port: u16,
    /// Echo the header of each accepted frame back to its sender.
    pub ack_replies: bool,
    pub frame_layout: FrameLayout,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            command_port: DEFAULT_COMMAND_PORT,
            ack_replies: true,
            frame_layout: FrameLayout::Compact,
        }
    }
}

impl NetworkConfig {
    pub fn command_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_addr, self.command_port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Hex device tag, e.g. `"1A2B3C4D"`. Frames with another `mac` are dropped.
    pub expected_mac: Option<String>,
    /// Drop everything but `connect` until a session exists.
    pub require_connect: bool,
}

impl AuthConfig {
    pub fn expected_mac(&self) -> Result<Option<u32>, ConfigError> {
        self.expected_mac
            .as_deref()
            .map(|raw| parse_hex_u32(raw).ok_or_else(|| ConfigError::ExpectedMac(raw.to_string())))
            .transpose()
    }
}

fn parse_hex_u32(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > 8 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub drop_stale: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    Log,
    Udp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub tick_hz: u32,
    pub sink: SinkKind,
    pub sink_addr: Option<SocketAddr>,
    pub send_timeout_ms: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            tick_hz: DEFAULT_TICK_HZ,
            sink: SinkKind::Log,
            sink_addr: None,
            send_timeout_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    #[default]
    None,
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub source: CaptureKind,
    pub port: u16,
    pub format: CaptureFormat,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: CaptureKind::None,
            port: DEFAULT_CAPTURE_PORT,
            format: CaptureFormat::Boot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse bridge config")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize bridge config")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Every problem with this configuration; empty when it is usable.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !(MIN_TICK_HZ..=MAX_TICK_HZ).contains(&self.output.tick_hz) {
            errors.push(ConfigError::TickRate(self.output.tick_hz));
        }
        if let Err(e) = self.auth.expected_mac() {
            errors.push(e);
        }
        if self.output.sink == SinkKind::Udp && self.output.sink_addr.is_none() {
            errors.push(ConfigError::MissingSinkAddr);
        }
        if self.output.send_timeout_ms == 0 {
            errors.push(ConfigError::ZeroSendTimeout);
        }
        if self.capture.source == CaptureKind::Udp
            && self.capture.port != 0
            && self.capture.port == self.network.command_port
        {
            errors.push(ConfigError::PortConflict(self.capture.port));
        }
        if LevelFilter::from_str(&self.logging.level).is_err() {
            errors.push(ConfigError::LogLevel(self.logging.level.clone()));
        }

        errors
    }

    /// `validate` as a single error listing every problem.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let listing = errors
            .iter()
            .map(|e| format!("  - {e}"))
            .collect::<Vec<_>>()
            .join("\n");
        anyhow::bail!("Invalid configuration:\n{listing}")
    }
}
