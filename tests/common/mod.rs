//! Shared utilities for integration testing.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wiretap::sink::MemorySink;

/// Install the test tracing subscriber; safe to call repeatedly.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wiretap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Gzip-compress a payload the way a real peer would.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Wait until the sink has recorded the expected number of entries of any
/// kind, or give up. The middleware finishes logging off the request path,
/// so tests poll instead of assuming ordering.
#[allow(dead_code)]
pub async fn wait_for_entries(sink: &Arc<MemorySink>, requests: usize, responses: usize) {
    for _ in 0..100 {
        if sink.requests().len() >= requests && sink.responses().len() >= responses {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "sink never reached {requests} request / {responses} response entries; saw {} / {}",
        sink.requests().len(),
        sink.responses().len()
    );
}

/// Wait for at least one incomplete-exchange entry.
#[allow(dead_code)]
pub async fn wait_for_incomplete(sink: &Arc<MemorySink>) {
    for _ in 0..100 {
        if !sink.incompletes().is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("sink never recorded an incomplete exchange");
}
