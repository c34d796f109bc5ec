//! I/O boundary of the HID bridge
//!
//! - [`UdpCommandSource`]: inbound command datagrams, one frame per packet
//! - [`ReportSink`]: outbound reports, with log, UDP and SPI-link sinks
//! - [`CaptureSource`]: raw reports from the physical mouse
//!
//! Nothing here holds mouse or motion state. Errors are returned as
//! [`TransportError`] and are never fatal to the loop that called in.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod capture;
pub mod error;
pub mod mock;
pub mod sink;
pub mod source;

pub use capture::{CaptureSource, NoCapture, UdpCaptureSource};
pub use error::{TransportError, TransportResult};
pub use mock::{MockCaptureSource, MockReportSink, MockSpiBus};
pub use sink::{LogSink, ReportSink, SpiBus, SpiReportSink, UdpReportSink, hex_bytes};
pub use source::{Datagram, UdpCommandSource};
