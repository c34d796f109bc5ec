//! Pluggable frame authentication.
//!
//! The `mac`/`rand` header fields are an identity tag, not a cryptographic
//! guarantee. Deployments pick a predicate that fits: accept everything,
//! pin a MAC, or require a `connect` handshake first.

use hidbridge_protocol::{CommandFrame, Opcode};
use tracing::debug;

use crate::error::{AuthError, AuthResult};

/// Capability check run on every decoded frame before it is dispatched.
pub trait Authenticator: Send {
    fn authenticate(&mut self, frame: &CommandFrame) -> AuthResult;

    /// Called after a `connect` frame passed [`authenticate`](Self::authenticate).
    fn on_connect(&mut self, _frame: &CommandFrame) {}

    /// Drop any session state.
    fn reset(&mut self) {}
}

impl<A: Authenticator + ?Sized> Authenticator for Box<A> {
    fn authenticate(&mut self, frame: &CommandFrame) -> AuthResult {
        (**self).authenticate(frame)
    }

    fn on_connect(&mut self, frame: &CommandFrame) {
        (**self).on_connect(frame);
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// No checks at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Authenticator for AcceptAll {
    fn authenticate(&mut self, _frame: &CommandFrame) -> AuthResult {
        Ok(())
    }
}

/// Only frames whose `mac` equals the configured device tag.
#[derive(Debug, Clone, Copy)]
pub struct MacFilter {
    expected: u32,
}

impl MacFilter {
    pub fn new(expected: u32) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> u32 {
        self.expected
    }
}

impl Authenticator for MacFilter {
    fn authenticate(&mut self, frame: &CommandFrame) -> AuthResult {
        if frame.mac == self.expected {
            Ok(())
        } else {
            Err(AuthError::MacMismatch {
                expected: self.expected,
                actual: frame.mac,
            })
        }
    }
}

/// Session established by a `connect` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub mac: u32,
    pub rand: u32,
}

/// Requires a `connect` before anything else, then pins the session MAC.
///
/// Wraps another authenticator, which still sees every frame first.
#[derive(Debug, Clone, Default)]
pub struct SessionGate<A> {
    inner: A,
    session: Option<Session>,
}

impl<A: Authenticator> SessionGate<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            session: None,
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.session
    }
}

impl<A: Authenticator> Authenticator for SessionGate<A> {
    fn authenticate(&mut self, frame: &CommandFrame) -> AuthResult {
        self.inner.authenticate(frame)?;

        if frame.opcode() == Opcode::Connect {
            return Ok(());
        }
        match self.session {
            None => Err(AuthError::SessionNotEstablished),
            Some(session) if session.mac != frame.mac => Err(AuthError::MacMismatch {
                expected: session.mac,
                actual: frame.mac,
            }),
            Some(_) => Ok(()),
        }
    }

    fn on_connect(&mut self, frame: &CommandFrame) {
        self.inner.on_connect(frame);
        debug!("session established for mac {:#010x}", frame.mac);
        self.session = Some(Session {
            mac: frame.mac,
            rand: frame.rand,
        });
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.session = None;
    }
}

/// Adapts a closure into an [`Authenticator`].
pub struct Predicate<F>(pub F);

impl<F> Authenticator for Predicate<F>
where
    F: FnMut(&CommandFrame) -> AuthResult + Send,
{
    fn authenticate(&mut self, frame: &CommandFrame) -> AuthResult {
        (self.0)(frame)
    }
}

impl<F> std::fmt::Debug for Predicate<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Predicate")
    }
}
