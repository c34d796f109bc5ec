//! Command dispatch and report multiplexing for the HID bridge
//!
//! Two halves, joined only by [`MotionCommand`]:
//!
//! - [`Dispatcher`] turns decoded frames into internal events. It runs the
//!   configured [`Authenticator`], tracks `indexpts` and never touches mouse
//!   state.
//! - [`ReportMultiplexer`] owns the mouse and keyboard state. It folds in
//!   captured device input and accepted commands, and yields exactly one
//!   report per tick.
//!
//! # Example
//!
//! ```
//! use hidbridge_engine::{Dispatch, Dispatcher, AcceptAll, ReportMultiplexer};
//! use hidbridge_protocol::{Command, CommandFrame, MouseMove, encode};
//!
//! let mut dispatcher = Dispatcher::<AcceptAll>::default();
//! let mut mux = ReportMultiplexer::new();
//!
//! let frame = CommandFrame::new(0, 0, 1, Command::MouseMove(MouseMove { x: 10, y: -5 }));
//! if let Dispatch::Motion(command) = dispatcher.dispatch_bytes(&encode(&frame)) {
//!     mux.apply(command);
//! }
//! let report = mux.tick(10).mouse;
//! assert_eq!((report.x, report.y), (10, -5));
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod auth;
pub mod command;
pub mod dispatcher;
pub mod error;
pub mod multiplexer;
pub mod sequence;
pub mod state;

pub use auth::{AcceptAll, Authenticator, MacFilter, Predicate, Session, SessionGate};
pub use command::{ConfigMutation, Dispatch, MotionCommand};
pub use dispatcher::{DispatchStats, Dispatcher};
pub use error::{AuthError, AuthResult, RejectReason};
pub use multiplexer::{MultiplexerState, ReportMultiplexer, TickOutput};
pub use sequence::{SequenceStats, SequenceTracker, SequenceVerdict};
pub use state::{CapturedState, KeyboardState, MaskFlags, MouseState};
