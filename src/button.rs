//! Buttons: per-device watchers that dispatch presses to listeners.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use macaddr::MacAddr6;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::capture::{CaptureSession, HandlerId, RawFrame};
use crate::error::{Error, ListenerError, ListenerFault, Result};
use crate::frame::{self, DecodedFrame};
use crate::interface;
use crate::listener::{self, GuardedListener};
use crate::mac;
use crate::registry::SessionRegistry;

/// Watches one hardware address and dispatches matching frames to its
/// listeners.
///
/// A button holds no capture resources until its first listener is added.
/// Removing the last listener detaches it again and closes the shared
/// session once no button uses it. While a dispatch round is running,
/// further frames for this button are dropped, not queued.
pub struct Button {
    inner: Arc<ButtonInner>,
}

struct ButtonInner {
    mac: MacAddr6,
    interface: String,
    registry: SessionRegistry,
    listeners: Mutex<Vec<ListenerEntry>>,
    next_listener: AtomicU64,
    attachment: Mutex<Option<Attachment>>,
    dispatching: AtomicBool,
    idle: Notify,
}

struct ListenerEntry {
    id: u64,
    guarded: GuardedListener,
}

struct Attachment {
    session: Arc<CaptureSession>,
    handler: HandlerId,
}

impl Button {
    /// Watch `mac` on the default network interface.
    pub fn new(registry: &SessionRegistry, mac: &str) -> Result<Self> {
        let interface = interface::default_interface().ok_or(Error::NoDefaultInterface)?;
        Self::on_interface(registry, mac, &interface)
    }

    /// Watch `mac` on a specific interface.
    pub fn on_interface(registry: &SessionRegistry, mac: &str, interface: &str) -> Result<Self> {
        let mac = mac::parse_mac(mac)?;
        Ok(Self {
            inner: Arc::new(ButtonInner {
                mac,
                interface: interface.to_string(),
                registry: registry.clone(),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(0),
                attachment: Mutex::new(None),
                dispatching: AtomicBool::new(false),
                idle: Notify::new(),
            }),
        })
    }

    /// The hardware address this button watches.
    pub fn mac(&self) -> MacAddr6 {
        self.inner.mac
    }

    /// The interface this button listens on.
    pub fn interface(&self) -> &str {
        &self.inner.interface
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    /// Whether a press dispatch round is currently in flight.
    pub fn is_dispatching(&self) -> bool {
        self.inner.dispatching.load(Ordering::Acquire)
    }

    /// Wait until no dispatch round is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_dispatching() {
                return;
            }
            notified.await;
        }
    }

    /// Register a listener invoked on every press of this button.
    ///
    /// The first listener attaches the button to the shared capture session
    /// for its interface, opening the session if needed; that attach can
    /// fail and is the only error source here. The listener stays
    /// registered until the returned [`Subscription`] is removed; dropping
    /// the subscription keeps it registered.
    pub fn add_listener<F, Fut>(&self, listener: F) -> Result<Subscription>
    where
        F: Fn(DecodedFrame) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), ListenerError>> + Send + 'static,
    {
        let guarded = listener::guard(listener);

        let mut listeners = self.inner.listeners.lock();
        if listeners.is_empty() {
            ButtonInner::attach(&self.inner)?;
        }

        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        listeners.push(ListenerEntry { id, guarded });
        drop(listeners);

        Ok(Subscription {
            entry: Some((Arc::clone(&self.inner), id)),
        })
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("mac", &self.inner.mac)
            .field("interface", &self.inner.interface)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl ButtonInner {
    /// Attach the frame handler to the shared session for our interface.
    fn attach(inner: &Arc<ButtonInner>) -> Result<()> {
        let session = inner.registry.get_or_create(&inner.interface)?;
        let handler_inner = Arc::clone(inner);
        let handler =
            session.add_handler(move |raw| ButtonInner::handle_frame(&handler_inner, raw));
        *inner.attachment.lock() = Some(Attachment { session, handler });
        tracing::debug!(
            button = %mac::format_mac(inner.mac.as_bytes()),
            interface = %inner.interface,
            "button attached"
        );
        Ok(())
    }

    /// Frame handler: drop while dispatching, match, then fan out on a
    /// spawned round so the capture pump is never blocked.
    fn handle_frame(inner: &Arc<ButtonInner>, raw: &RawFrame) {
        if inner.dispatching.load(Ordering::Acquire) {
            return;
        }

        let packet = match frame::decode(raw) {
            Ok(packet) => packet,
            Err(err) => {
                tracing::debug!(
                    interface = %inner.interface,
                    "ignoring undecodable frame: {}",
                    err
                );
                return;
            }
        };

        if packet.source != inner.mac {
            return;
        }

        if inner.dispatching.swap(true, Ordering::AcqRel) {
            return;
        }

        let snapshot: Vec<GuardedListener> = inner
            .listeners
            .lock()
            .iter()
            .map(|entry| Arc::clone(&entry.guarded))
            .collect();

        let round = Arc::clone(inner);
        tokio::spawn(async move {
            let _guard = DispatchGuard {
                inner: Arc::clone(&round),
            };
            let address = mac::format_mac(round.mac.as_bytes());
            for fault in run_round(&snapshot, packet).await {
                tracing::error!(button = %address, "press listener fault: {}", fault);
            }
        });
    }

    fn remove_listener(&self, id: u64) {
        let mut listeners = self.listeners.lock();
        listeners.retain(|entry| entry.id != id);
        if listeners.is_empty() {
            self.detach();
        }
    }

    /// Detach from the session; close it if we were the last button.
    fn detach(&self) {
        let attachment = match self.attachment.lock().take() {
            Some(attachment) => attachment,
            None => return,
        };
        attachment.session.remove_handler(attachment.handler);
        if attachment.session.handler_count() == 0 {
            attachment.session.close();
        }
        tracing::debug!(
            button = %mac::format_mac(self.mac.as_bytes()),
            interface = %self.interface,
            "button detached"
        );
    }
}

/// Invoke every listener in the snapshot concurrently; collect the faults
/// in snapshot order once all of them have settled.
async fn run_round(snapshot: &[GuardedListener], packet: DecodedFrame) -> Vec<ListenerFault> {
    let outcomes = join_all(snapshot.iter().map(|guarded| guarded(packet.clone()))).await;
    outcomes.into_iter().flatten().collect()
}

/// Clears the dispatching flag when a round ends, even if it panics.
struct DispatchGuard {
    inner: Arc<ButtonInner>,
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        self.inner.dispatching.store(false, Ordering::Release);
        self.inner.idle.notify_waiters();
    }
}

/// Removal token for one registered listener.
///
/// The first `remove` call detaches the listener; later calls do nothing.
#[must_use = "dropping a Subscription without calling remove leaves the listener registered"]
pub struct Subscription {
    entry: Option<(Arc<ButtonInner>, u64)>,
}

impl Subscription {
    /// Remove the listener this subscription stands for. Idempotent.
    pub fn remove(&mut self) {
        if let Some((inner, id)) = self.entry.take() {
            inner.remove_listener(id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.entry.is_some())
            .finish()
    }
}
