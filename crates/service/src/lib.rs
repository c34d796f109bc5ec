//! `hidbridged` service: configuration, CLI, logging and the bridge loop.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod cli;
pub mod config;
pub mod logging;
pub mod runtime;

pub use cli::Cli;
pub use config::{
    AuthConfig, BridgeConfig, CaptureConfig, CaptureKind, ConfigError, LoggingConfig,
    NetworkConfig, OutputConfig, SequenceConfig, SinkKind,
};
pub use runtime::{
    Bridge, BridgeStats, authenticator_from_config, capture_from_config, sink_from_config,
};
