//! Outbound report sinks.
//!
//! A sink delivers one report per call: no batching, no reordering. Send
//! failures come back as [`TransportError`] for the loop to log; the sink
//! keeps no report state of its own.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::{debug, trace};

use crate::error::{TransportError, TransportResult};

/// Render bytes as space-separated hex for log lines.
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Downstream end of the bridge.
#[async_trait]
pub trait ReportSink: Send {
    /// Deliver one encoded report.
    async fn send(&mut self, report: &[u8]) -> TransportResult<()>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Writes every report to the log and nowhere else.
#[derive(Debug, Default)]
pub struct LogSink {
    sent: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

#[async_trait]
impl ReportSink for LogSink {
    async fn send(&mut self, report: &[u8]) -> TransportResult<()> {
        self.sent = self.sent.saturating_add(1);
        trace!(seq = self.sent, report = %hex_bytes(report), "report");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Sends each report as one UDP datagram to a fixed target.
#[derive(Debug)]
pub struct UdpReportSink {
    socket: UdpSocket,
    target: SocketAddr,
    timeout: Duration,
}

impl UdpReportSink {
    pub async fn connect(target: SocketAddr, timeout: Duration) -> TransportResult<Self> {
        let local = match target {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };
        let socket = UdpSocket::bind(local).await?;
        debug!(%target, "UDP report sink ready");
        Ok(Self {
            socket,
            target,
            timeout,
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

#[async_trait]
impl ReportSink for UdpReportSink {
    async fn send(&mut self, report: &[u8]) -> TransportResult<()> {
        match tokio::time::timeout(self.timeout, self.socket.send_to(report, self.target)).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_elapsed) => Err(TransportError::timeout(self.timeout)),
        }
    }

    fn name(&self) -> &'static str {
        "udp"
    }
}

/// Point-to-point synchronous link to the USB side (an SPI bus on the
/// reference hardware).
///
/// `transfer` resolves when the hardware signals completion.
#[async_trait]
pub trait SpiBus: Send {
    async fn transfer(&mut self, bytes: &[u8]) -> TransportResult<()>;
}

/// [`ReportSink`] over an [`SpiBus`] with a bounded wait per transfer.
#[derive(Debug)]
pub struct SpiReportSink<B> {
    bus: B,
    timeout: Duration,
}

impl<B: SpiBus> SpiReportSink<B> {
    pub fn new(bus: B, timeout: Duration) -> Self {
        Self { bus, timeout }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

#[async_trait]
impl<B: SpiBus> ReportSink for SpiReportSink<B> {
    async fn send(&mut self, report: &[u8]) -> TransportResult<()> {
        match tokio::time::timeout(self.timeout, self.bus.transfer(report)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(TransportError::timeout(self.timeout)),
        }
    }

    fn name(&self) -> &'static str {
        "spi"
    }
}
