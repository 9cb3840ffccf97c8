//! Capture session layer.
//!
//! A `CaptureSession` is the single shared frame stream for one network
//! interface. Buttons attach frame handlers to it and the session delivers
//! every frame to a snapshot of the handlers attached at that moment. The
//! `SessionProvider` trait hides how frames are produced, so tests feed
//! synthetic frames through the same dispatch path the live pcap pump uses.

mod pcap_session;

pub use pcap_session::PcapSessionProvider;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::error::Result;

/// A raw link-layer frame as delivered by the capture layer.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// When the frame was captured.
    pub timestamp: SystemTime,
    /// Frame bytes, starting at the Ethernet header.
    pub data: Vec<u8>,
}

impl RawFrame {
    /// Wrap captured bytes, timestamped now.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            data,
        }
    }
}

/// Identifies one attached frame handler for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(u64);

type FrameHandlerFn = dyn Fn(&RawFrame) + Send + Sync;

struct HandlerEntry {
    id: HandlerId,
    handler: Arc<FrameHandlerFn>,
}

/// Source of capture sessions.
///
/// Implemented by the live pcap backend; tests substitute providers that
/// hand out bare sessions and record what was opened.
pub trait SessionProvider: Send + Sync {
    /// Open a session producing frames from `interface`.
    ///
    /// Fails if the interface does not exist or capture cannot be
    /// initialized (permissions, device state).
    fn open(&self, interface: &str) -> Result<Arc<CaptureSession>>;
}

/// The shared frame stream for one interface.
///
/// Handler membership may change freely while frames are being dispatched;
/// `dispatch` iterates over a snapshot, so a change takes effect with the
/// next frame.
pub struct CaptureSession {
    interface: String,
    handlers: Mutex<Vec<HandlerEntry>>,
    next_handler: AtomicU64,
    closed: AtomicBool,
}

impl CaptureSession {
    /// Create a session with no frame source attached.
    ///
    /// The live provider pairs this with a pcap pump; tests call
    /// [`dispatch`](Self::dispatch) directly.
    pub fn new(interface: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            interface: interface.into(),
            handlers: Mutex::new(Vec::new()),
            next_handler: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Interface this session captures on.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Attach a frame handler that receives every dispatched frame.
    pub fn add_handler<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&RawFrame) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_handler.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push(HandlerEntry {
            id,
            handler: Arc::new(handler),
        });
        tracing::debug!(interface = %self.interface, ?id, "frame handler attached");
        id
    }

    /// Detach a handler, reporting whether it was attached. Unknown ids
    /// are ignored.
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        let removed = {
            let mut handlers = self.handlers.lock();
            let before = handlers.len();
            handlers.retain(|entry| entry.id != id);
            handlers.len() < before
        };
        if removed {
            tracing::debug!(interface = %self.interface, ?id, "frame handler detached");
        }
        removed
    }

    /// Number of currently attached handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Deliver one frame to every handler attached at call time.
    ///
    /// No-op once the session is closed.
    pub fn dispatch(&self, frame: &RawFrame) {
        if self.is_closed() {
            return;
        }
        let snapshot: Vec<Arc<FrameHandlerFn>> = self
            .handlers
            .lock()
            .iter()
            .map(|entry| Arc::clone(&entry.handler))
            .collect();
        for handler in snapshot {
            handler(frame);
        }
    }

    /// Mark the session closed and stop its frame source. Idempotent.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!(interface = %self.interface, "capture session closed");
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("interface", &self.interface)
            .field("handlers", &self.handler_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}
