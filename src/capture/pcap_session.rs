//! Live capture backed by libpcap.

use std::sync::Arc;

use pcap::{Active, Capture};
use tokio::sync::mpsc;

use super::{CaptureSession, RawFrame, SessionProvider};
use crate::error::{Error, Result};
use crate::interface;

/// Snapshot length for captured frames.
const SNAPLEN: i32 = 65_535;
/// Read timeout so the reader can observe the closed flag between packets.
const READ_TIMEOUT_MS: i32 = 100;
/// Frames buffered between the blocking reader and the dispatcher task.
const PUMP_CHANNEL_CAPACITY: usize = 64;

/// Opens live pcap sessions with a fixed BPF filter.
pub struct PcapSessionProvider {
    filter: String,
}

impl PcapSessionProvider {
    /// Provider applying `filter` to every session it opens.
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
        }
    }
}

impl SessionProvider for PcapSessionProvider {
    /// Open a live capture session on `interface`.
    ///
    /// Must be called from within a tokio runtime; the capture pump is
    /// spawned onto it.
    fn open(&self, interface: &str) -> Result<Arc<CaptureSession>> {
        if !interface::interface_exists(interface) {
            return Err(Error::InterfaceNotFound(interface.to_string()));
        }

        let mut capture = Capture::from_device(interface)?
            .promisc(true)
            .snaplen(SNAPLEN)
            .timeout(READ_TIMEOUT_MS)
            .immediate_mode(true)
            .open()?;
        capture.filter(&self.filter, true)?;

        let session = CaptureSession::new(interface);
        spawn_pump(capture, Arc::clone(&session));
        tracing::debug!(interface, filter = %self.filter, "live capture opened");

        Ok(session)
    }
}

/// Bridge blocking pcap reads onto the async runtime.
///
/// A blocking reader forwards frames over a bounded channel to a dispatcher
/// task; both exit once the session is closed or the other side is gone.
fn spawn_pump(mut capture: Capture<Active>, session: Arc<CaptureSession>) {
    let (tx, mut rx) = mpsc::channel::<RawFrame>(PUMP_CHANNEL_CAPACITY);

    let reader_session = Arc::clone(&session);
    tokio::task::spawn_blocking(move || {
        while !reader_session.is_closed() {
            match capture.next_packet() {
                Ok(packet) => {
                    let frame = RawFrame::new(packet.data.to_vec());
                    if tx.blocking_send(frame).is_err() {
                        break;
                    }
                }
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(e) => {
                    tracing::error!(
                        interface = %reader_session.interface(),
                        "capture read failed: {}",
                        e
                    );
                    break;
                }
            }
        }
    });

    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if session.is_closed() {
                break;
            }
            session.dispatch(&frame);
        }
    });
}
