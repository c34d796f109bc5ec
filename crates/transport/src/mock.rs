//! In-memory transports for tests.
//!
//! The mocks hand out cloneable handles so a test can keep inspecting what
//! was sent after the sink itself has moved into the bridge loop.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hidbridge_protocol::CapturedMouseReport;
use parking_lot::Mutex;

use crate::capture::CaptureSource;
use crate::error::{TransportError, TransportResult};
use crate::sink::{ReportSink, SpiBus};

#[derive(Debug, Default)]
struct Recorded {
    sent: Vec<Vec<u8>>,
    fail_next: usize,
}

/// Records every report; can be told to fail the next few sends.
#[derive(Debug, Clone, Default)]
pub struct MockReportSink {
    inner: Arc<Mutex<Recorded>>,
}

impl MockReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports delivered so far, oldest first.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.inner.lock().sent.clone()
    }

    /// Make the next `count` sends fail with a hardware error.
    pub fn fail_next(&self, count: usize) {
        self.inner.lock().fail_next = count;
    }
}

#[async_trait]
impl ReportSink for MockReportSink {
    async fn send(&mut self, report: &[u8]) -> TransportResult<()> {
        let mut inner = self.inner.lock();
        if inner.fail_next > 0 {
            inner.fail_next -= 1;
            return Err(TransportError::Hardware("mock send failure".to_string()));
        }
        inner.sent.push(report.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// SPI bus that completes after a fixed latency.
#[derive(Debug, Clone, Default)]
pub struct MockSpiBus {
    latency: Duration,
    transfers: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockSpiBus {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            transfers: Arc::default(),
        }
    }

    /// Transfers that completed.
    pub fn transfers(&self) -> Vec<Vec<u8>> {
        self.transfers.lock().clone()
    }
}

#[async_trait]
impl SpiBus for MockSpiBus {
    async fn transfer(&mut self, bytes: &[u8]) -> TransportResult<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.transfers.lock().push(bytes.to_vec());
        Ok(())
    }
}

/// Capture source fed by the test.
#[derive(Debug, Clone, Default)]
pub struct MockCaptureSource {
    queue: Arc<Mutex<VecDeque<CapturedMouseReport>>>,
}

impl MockCaptureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, report: CapturedMouseReport) {
        self.queue.lock().push_back(report);
    }
}

impl CaptureSource for MockCaptureSource {
    fn poll_report(&mut self) -> Option<CapturedMouseReport> {
        self.queue.lock().pop_front()
    }
}
