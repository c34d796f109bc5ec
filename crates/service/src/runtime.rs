//! The bridge loop.
//!
//! One cooperative loop owns everything that changes: it polls the command
//! listener and the capture source, feeds the dispatcher and the
//! multiplexer, and emits exactly one report per tick. Transport errors are
//! logged and the loop moves on to the next tick.

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};
use hidbridge_engine::{
    AcceptAll, Authenticator, ConfigMutation, Dispatch, Dispatcher, MacFilter, MultiplexerState,
    ReportMultiplexer, SequenceTracker, SessionGate, TickOutput,
};
use hidbridge_protocol::{FrameCodec, HEADER_SIZE};
use hidbridge_scheduler::TickClock;
use hidbridge_transport::{
    CaptureSource, Datagram, LogSink, NoCapture, ReportSink, TransportError, UdpCaptureSource,
    UdpCommandSource, UdpReportSink, hex_bytes,
};
use tracing::{debug, info, warn};

use crate::config::{AuthConfig, BridgeConfig, CaptureConfig, CaptureKind, OutputConfig, SinkKind};

/// Upper bound on frames handled in one tick, so a flood cannot stall output.
const MAX_FRAMES_PER_TICK: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub ticks: u64,
    pub frames: u64,
    pub acks_sent: u64,
    pub send_failures: u64,
    pub rebinds: u64,
}

/// Authenticator chain described by the `auth` section.
pub fn authenticator_from_config(auth: &AuthConfig) -> Result<Box<dyn Authenticator>> {
    let expected = auth.expected_mac()?;
    let authenticator: Box<dyn Authenticator> = match (expected, auth.require_connect) {
        (None, false) => Box::new(AcceptAll),
        (Some(mac), false) => Box::new(MacFilter::new(mac)),
        (None, true) => Box::new(SessionGate::new(AcceptAll)),
        (Some(mac), true) => Box::new(SessionGate::new(MacFilter::new(mac))),
    };
    Ok(authenticator)
}

pub async fn sink_from_config(output: &OutputConfig) -> Result<Box<dyn ReportSink>> {
    match output.sink {
        SinkKind::Log => Ok(Box::new(LogSink::new())),
        SinkKind::Udp => {
            let target = output
                .sink_addr
                .context("output.sink_addr is required for the udp sink")?;
            let sink =
                UdpReportSink::connect(target, Duration::from_millis(output.send_timeout_ms))
                    .await
                    .with_context(|| format!("Failed to open UDP report sink to {target}"))?;
            Ok(Box::new(sink))
        }
    }
}

pub async fn capture_from_config(
    capture: &CaptureConfig,
    listen_addr: IpAddr,
) -> Result<Box<dyn CaptureSource>> {
    match capture.source {
        CaptureKind::None => Ok(Box::new(NoCapture)),
        CaptureKind::Udp => {
            let addr = SocketAddr::new(listen_addr, capture.port);
            let source = UdpCaptureSource::bind(addr, capture.format)
                .await
                .with_context(|| format!("Failed to bind capture listener on {addr}"))?;
            Ok(Box::new(source))
        }
    }
}

pub struct Bridge {
    config: BridgeConfig,
    listener: Option<UdpCommandSource>,
    dispatcher: Dispatcher,
    mux: ReportMultiplexer,
    sink: Box<dyn ReportSink>,
    capture: Box<dyn CaptureSource>,
    clock: TickClock,
    verbose: bool,
    network_update: Option<(Ipv4Addr, u16)>,
    stats: BridgeStats,
}

impl Bridge {
    /// Bind the command listener and assemble the pipeline. Failures here
    /// are initialization failures and are fatal to the caller.
    pub async fn new(
        config: BridgeConfig,
        sink: Box<dyn ReportSink>,
        capture: Box<dyn CaptureSource>,
    ) -> Result<Self> {
        let addr = config.network.command_addr();
        let listener = UdpCommandSource::bind(addr)
            .await
            .with_context(|| format!("Failed to bind command listener on {addr}"))?;
        let dispatcher = Dispatcher::new(
            authenticator_from_config(&config.auth)?,
            FrameCodec::new(config.network.frame_layout),
            SequenceTracker::new(config.sequence.drop_stale),
        );
        let clock = TickClock::new(config.output.tick_hz).context("Invalid tick rate")?;

        info!(
            listen = %listener.local_addr(),
            sink = sink.name(),
            tick_hz = config.output.tick_hz,
            layout = ?config.network.frame_layout,
            "bridge ready"
        );

        Ok(Self {
            config,
            listener: Some(listener),
            dispatcher,
            mux: ReportMultiplexer::new(),
            sink,
            capture,
            clock,
            verbose: false,
            network_update: None,
            stats: BridgeStats::default(),
        })
    }

    /// Address of the command listener; `None` while it is being replaced.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(UdpCommandSource::local_addr)
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn state(&self) -> MultiplexerState {
        self.mux.state()
    }

    pub fn multiplexer(&self) -> &ReportMultiplexer {
        &self.mux
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Settings received through `set_config`, applied on next start.
    pub fn network_update(&self) -> Option<(Ipv4Addr, u16)> {
        self.network_update
    }

    /// Run on the tick clock until `shutdown` resolves.
    pub async fn run_until<F>(mut self, shutdown: F) -> BridgeStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = self.clock.tick() => {
                    self.step().await;
                }
            }
        }

        let metrics = self.clock.metrics_mut();
        let p99_jitter_ns = metrics.p99_jitter_ns();
        info!(
            ticks = metrics.total_ticks,
            missed = metrics.missed_ticks,
            p99_jitter_ns,
            "bridge stopped"
        );
        self.stats
    }

    /// One tick of work: commands, captured input, then exactly one report.
    pub async fn step(&mut self) -> TickOutput {
        self.poll_commands().await;
        for report in self.capture.drain() {
            self.mux.merge_captured(&report);
        }

        let output = self.mux.tick(self.clock.period_ms());
        self.stats.ticks = self.stats.ticks.saturating_add(1);
        self.emit(&output).await;
        output
    }

    async fn poll_commands(&mut self) {
        if self.listener.is_none() {
            self.rebind(self.config.network.command_port).await;
        }
        for _ in 0..MAX_FRAMES_PER_TICK {
            let Some(listener) = self.listener.as_mut() else {
                return;
            };
            match listener.try_recv() {
                Ok(Some(datagram)) => self.handle_datagram(datagram).await,
                Ok(None) => return,
                Err(e) => {
                    // the port is only released once the old listener is gone
                    warn!(error = %e, "command listener closed; rebinding next tick");
                    self.listener = None;
                    return;
                }
            }
        }
        debug!(limit = MAX_FRAMES_PER_TICK, "frame limit reached for this tick");
    }

    async fn handle_datagram(&mut self, datagram: Datagram) {
        self.stats.frames = self.stats.frames.saturating_add(1);
        let outcome = self.dispatcher.dispatch_bytes(&datagram.bytes);

        if outcome.is_accepted() && self.config.network.ack_replies {
            self.acknowledge(&datagram).await;
        }
        match outcome {
            Dispatch::Motion(command) => self.mux.apply(command),
            Dispatch::Config(mutation) => self.apply_config(mutation).await,
            Dispatch::Rejected { .. } => {}
        }
    }

    async fn acknowledge(&mut self, datagram: &Datagram) {
        let Some(header) = datagram.bytes.get(..HEADER_SIZE) else {
            return;
        };
        let Some(listener) = self.listener.as_ref() else {
            return;
        };
        match listener.reply(datagram.from, header).await {
            Ok(()) => self.stats.acks_sent = self.stats.acks_sent.saturating_add(1),
            Err(e) => debug!(to = %datagram.from, error = %e, "ack not sent"),
        }
    }

    async fn apply_config(&mut self, mutation: ConfigMutation) {
        match mutation {
            ConfigMutation::Connect { mac, rand } => {
                info!("session connected: mac {mac:#010x}, rand {rand:#010x}");
            }
            ConfigMutation::Monitor { port } => self.rebind(port).await,
            ConfigMutation::Debug { port, enabled } => {
                self.verbose = enabled;
                info!(port, enabled, "verbose report logging toggled");
            }
            ConfigMutation::SetConfig { ip, port } => {
                self.network_update = Some((ip, port));
                info!(%ip, port, "network settings received; applied on restart");
            }
            ConfigMutation::Reboot => {
                self.mux.reset();
                self.dispatcher.reset_session();
                info!("reboot: mouse, keyboard and session state cleared");
            }
            ConfigMutation::ShowPicture { pixels } => {
                debug!(pixels, "picture received; no display attached");
            }
        }
    }

    /// Move the command listener to `port`. The current listener stays in
    /// place if the new bind fails.
    async fn rebind(&mut self, port: u16) {
        let current = self.local_addr();
        if port != 0 && current.is_some_and(|addr| addr.port() == port) {
            debug!(port, "command listener already on this port");
            return;
        }
        let addr = SocketAddr::new(self.config.network.listen_addr, port);
        match UdpCommandSource::bind(addr).await {
            Ok(listener) => {
                info!(from = ?current, to = %listener.local_addr(), "command listener moved");
                self.listener = Some(listener);
                self.config.network.command_port = port;
                self.stats.rebinds = self.stats.rebinds.saturating_add(1);
            }
            Err(e) => warn!(%addr, error = %e, "rebind failed; keeping current listener"),
        }
    }

    async fn emit(&mut self, output: &TickOutput) {
        let mouse = output.mouse.to_bytes();
        if self.verbose {
            info!(report = %hex_bytes(&mouse), "mouse report");
        }
        if let Err(e) = self.sink.send(&mouse).await {
            self.send_failed(&e);
        }

        if let Some(keyboard) = output.keyboard {
            let bytes = keyboard.to_bytes();
            if self.verbose {
                info!(report = %hex_bytes(&bytes), "keyboard report");
            }
            if let Err(e) = self.sink.send(&bytes).await {
                self.send_failed(&e);
            }
        }
    }

    fn send_failed(&mut self, error: &TransportError) {
        self.stats.send_failures = self.stats.send_failures.saturating_add(1);
        warn!(
            sink = self.sink.name(),
            error = %error,
            recoverable = error.is_recoverable(),
            "report send failed; state kept for next tick"
        );
    }
}
