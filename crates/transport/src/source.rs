//! Inbound command datagrams.
//!
//! One UDP payload is one raw buffer. A background task owns the receive
//! side of the socket and hands datagrams to the bridge loop over a bounded
//! channel, so the loop can poll without blocking.

use std::net::SocketAddr;
use std::sync::Arc;

use hidbridge_protocol::{FULL_FRAME_SIZE, HEADER_SIZE};
use tokio::net::UdpSocket;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{TransportError, TransportResult};

const CHANNEL_CAPACITY: usize = 256;
/// Oversized datagrams must arrive whole so the codec can reject them.
const RECV_BUFFER_SIZE: usize = FULL_FRAME_SIZE + 64;

/// One inbound UDP payload and its sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub bytes: Vec<u8>,
    pub from: SocketAddr,
}

/// Command listener bound to one UDP port.
///
/// Not restartable: once the channel closes, bind a new source. Moving the
/// listener to another port (the `monitor` opcode) is done the same way.
#[derive(Debug)]
pub struct UdpCommandSource {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    rx: mpsc::Receiver<Datagram>,
    task: JoinHandle<()>,
}

impl UdpCommandSource {
    pub async fn bind(addr: SocketAddr) -> TransportResult<Self> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        let local_addr = socket.local_addr()?;
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let task = spawn_receiver(Arc::clone(&socket), tx, |bytes, from| {
            if bytes.len() < HEADER_SIZE {
                debug!(len = bytes.len(), %from, "dropping datagram shorter than frame header");
                return None;
            }
            Some(Datagram {
                bytes: bytes.to_vec(),
                from,
            })
        });
        info!(%local_addr, "command listener bound");

        Ok(Self {
            socket,
            local_addr,
            rx,
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Next queued datagram without waiting. `Ok(None)` when nothing is
    /// pending, `Err(Closed)` once the receive task has stopped.
    pub fn try_recv(&mut self) -> TransportResult<Option<Datagram>> {
        match self.rx.try_recv() {
            Ok(datagram) => Ok(Some(datagram)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TransportError::Closed),
        }
    }

    /// Wait for the next datagram; `None` once the channel is closed.
    pub async fn recv(&mut self) -> Option<Datagram> {
        self.rx.recv().await
    }

    /// Send `bytes` back to a peer from the listening socket.
    pub async fn reply(&self, to: SocketAddr, bytes: &[u8]) -> TransportResult<()> {
        let sent = self.socket.send_to(bytes, to).await?;
        if sent != bytes.len() {
            return Err(TransportError::Hardware(format!(
                "short send: {sent} of {} bytes",
                bytes.len()
            )));
        }
        Ok(())
    }
}

impl Drop for UdpCommandSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the receive task shared by the UDP sources. `parse` decides what,
/// if anything, is forwarded for each datagram.
pub(crate) fn spawn_receiver<T, F>(
    socket: Arc<UdpSocket>,
    tx: mpsc::Sender<T>,
    parse: F,
) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Fn(&[u8], SocketAddr) -> Option<T> + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        loop {
            let (len, from) = match socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                    debug!("peer unreachable; ignoring");
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "UDP receive failed; closing channel");
                    break;
                }
            };
            let Some(bytes) = buf.get(..len) else {
                continue;
            };
            if let Some(item) = parse(bytes, from) {
                if tx.send(item).await.is_err() {
                    debug!("receiver dropped; stopping UDP task");
                    break;
                }
            }
        }
    })
}
