//! Command-line flags for `hidbridged`. Flags override the config file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::BridgeConfig;

#[derive(Debug, Parser)]
#[command(name = "hidbridged")]
#[command(about = "Bridge UDP mouse/keyboard commands to USB HID reports")]
#[command(version)]
pub struct Cli {
    /// YAML config file; built-in defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// UDP port for command frames
    #[arg(long)]
    pub port: Option<u16>,

    /// Report rate in Hz
    #[arg(long)]
    pub tick_hz: Option<u32>,

    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the default configuration as YAML and exit
    #[arg(long)]
    pub print_default_config: bool,
}

impl Cli {
    pub fn apply_overrides(&self, config: &mut BridgeConfig) {
        if let Some(port) = self.port {
            config.network.command_port = port;
        }
        if let Some(tick_hz) = self.tick_hz {
            config.output.tick_hz = tick_hz;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
    }

    /// File (or defaults), then flags, then validation.
    pub fn resolve_config(&self) -> Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::load_from_path(path)?,
            None => BridgeConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.ensure_valid()?;
        Ok(config)
    }
}
