//! Captured input from the physical mouse.
//!
//! Sources are polled once per tick and never block. Reports that fail to
//! parse are dropped here, so the multiplexer only ever sees valid input.

use std::net::SocketAddr;
use std::sync::Arc;

use hidbridge_protocol::{CaptureFormat, CapturedMouseReport};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::TransportResult;
use crate::source::spawn_receiver;

const CHANNEL_CAPACITY: usize = 1024;

pub trait CaptureSource: Send {
    /// Next pending report, if any, without waiting.
    fn poll_report(&mut self) -> Option<CapturedMouseReport>;

    /// Everything pending right now, in arrival order.
    fn drain(&mut self) -> Vec<CapturedMouseReport> {
        std::iter::from_fn(|| self.poll_report()).collect()
    }
}

/// No physical device attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl CaptureSource for NoCapture {
    fn poll_report(&mut self) -> Option<CapturedMouseReport> {
        None
    }
}

/// Raw HID mouse reports forwarded over UDP, one report per datagram.
#[derive(Debug)]
pub struct UdpCaptureSource {
    local_addr: SocketAddr,
    format: CaptureFormat,
    rx: mpsc::Receiver<CapturedMouseReport>,
    task: JoinHandle<()>,
}

impl UdpCaptureSource {
    pub async fn bind(addr: SocketAddr, format: CaptureFormat) -> TransportResult<Self> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        let local_addr = socket.local_addr()?;
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let task = spawn_receiver(socket, tx, move |bytes, from| {
            match CapturedMouseReport::parse(bytes, format) {
                Ok(report) => Some(report),
                Err(e) => {
                    debug!(%from, error = %e, "dropping captured report");
                    None
                }
            }
        });
        info!(%local_addr, ?format, "capture listener bound");

        Ok(Self {
            local_addr,
            format,
            rx,
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn format(&self) -> CaptureFormat {
        self.format
    }
}

impl CaptureSource for UdpCaptureSource {
    fn poll_report(&mut self) -> Option<CapturedMouseReport> {
        self.rx.try_recv().ok()
    }
}

impl Drop for UdpCaptureSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}
