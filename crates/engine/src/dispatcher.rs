//! Command dispatcher: decode, authenticate, sequence-check, translate.

use hidbridge_protocol::{CommandFrame, FrameCodec, Opcode};
use tracing::{debug, trace};

use crate::auth::{AcceptAll, Authenticator};
use crate::command::Dispatch;
use crate::error::RejectReason;
use crate::sequence::{SequenceStats, SequenceTracker};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub accepted: u64,
    pub rejected_frame: u64,
    pub rejected_auth: u64,
    pub rejected_stale: u64,
}

impl DispatchStats {
    fn record(&mut self, outcome: &Dispatch) {
        let counter = match outcome {
            Dispatch::Rejected {
                reason: RejectReason::Frame(_),
            } => &mut self.rejected_frame,
            Dispatch::Rejected {
                reason: RejectReason::Auth(_),
            } => &mut self.rejected_auth,
            Dispatch::Rejected {
                reason: RejectReason::StaleSequence { .. },
            } => &mut self.rejected_stale,
            Dispatch::Motion(_) | Dispatch::Config(_) => &mut self.accepted,
        };
        *counter = counter.saturating_add(1);
    }
}

/// One dispatcher per command connection.
///
/// Holds only the session context used for authentication and the
/// sequence tracker; it never touches mouse state.
#[derive(Debug)]
pub struct Dispatcher<A = Box<dyn Authenticator>> {
    codec: FrameCodec,
    auth: A,
    sequence: SequenceTracker,
    stats: DispatchStats,
}

impl Default for Dispatcher<AcceptAll> {
    fn default() -> Self {
        Self::new(AcceptAll, FrameCodec::default(), SequenceTracker::default())
    }
}

impl<A: Authenticator> Dispatcher<A> {
    pub fn new(auth: A, codec: FrameCodec, sequence: SequenceTracker) -> Self {
        Self {
            codec,
            auth,
            sequence,
            stats: DispatchStats::default(),
        }
    }

    pub fn codec(&self) -> FrameCodec {
        self.codec
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn sequence_stats(&self) -> SequenceStats {
        self.sequence.stats()
    }

    pub fn authenticator(&self) -> &A {
        &self.auth
    }

    /// Decode a raw datagram and dispatch it.
    pub fn dispatch_bytes(&mut self, bytes: &[u8]) -> Dispatch {
        match self.codec.decode(bytes) {
            Ok(frame) => self.dispatch(&frame),
            Err(e) => {
                debug!(len = bytes.len(), error = %e, "dropping malformed frame");
                let outcome = Dispatch::rejected(e);
                self.stats.record(&outcome);
                outcome
            }
        }
    }

    /// Dispatch an already decoded frame.
    pub fn dispatch(&mut self, frame: &CommandFrame) -> Dispatch {
        let outcome = self.evaluate(frame);
        self.stats.record(&outcome);
        match &outcome {
            Dispatch::Rejected { reason } => {
                debug!(
                    opcode = %frame.opcode(),
                    indexpts = frame.indexpts,
                    %reason,
                    "frame rejected"
                );
            }
            _ => {
                trace!(opcode = %frame.opcode(), indexpts = frame.indexpts, "frame accepted");
            }
        }
        outcome
    }

    fn evaluate(&mut self, frame: &CommandFrame) -> Dispatch {
        if let Err(e) = self.auth.authenticate(frame) {
            return Dispatch::rejected(e);
        }

        let is_connect = frame.opcode() == Opcode::Connect;
        if is_connect {
            self.sequence.restart();
        }
        let last = self.sequence.last();
        if !self.sequence.observe(frame.indexpts) {
            return Dispatch::rejected(RejectReason::StaleSequence {
                indexpts: frame.indexpts,
                last: last.unwrap_or_default(),
            });
        }

        if is_connect {
            self.auth.on_connect(frame);
        }
        Dispatch::from(frame)
    }

    /// Forget session and sequence state, as after a reboot.
    pub fn reset_session(&mut self) {
        self.auth.reset();
        self.sequence.restart();
    }
}
