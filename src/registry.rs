//! Shared capture session registry.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::capture::{CaptureSession, PcapSessionProvider, SessionProvider};
use crate::error::{Error, Result};
use crate::filters;

/// Hands out the shared capture session, one live session at a time.
///
/// Buttons hold a clone of the registry. The first listener attach opens
/// the session; it stays cached until the last detaching button closes it,
/// after which the next attach opens a fresh one. Every button on one
/// registry must agree on the interface.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    provider: Arc<dyn SessionProvider>,
    active: Mutex<Option<Arc<CaptureSession>>>,
}

impl SessionRegistry {
    /// Registry backed by live pcap sessions with the press filter.
    pub fn new() -> Self {
        Self::with_provider(Arc::new(PcapSessionProvider::new(filters::press_filter())))
    }

    /// Registry backed by a custom session provider.
    pub fn with_provider(provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                provider,
                active: Mutex::new(None),
            }),
        }
    }

    /// Get the shared session for `interface`, opening one if needed.
    ///
    /// Fails with [`Error::InterfaceMismatch`] while a live session exists
    /// on a different interface.
    pub fn get_or_create(&self, interface: &str) -> Result<Arc<CaptureSession>> {
        let mut active = self.inner.active.lock();

        if let Some(session) = active.as_ref() {
            if !session.is_closed() {
                if session.interface() != interface {
                    return Err(Error::InterfaceMismatch {
                        requested: interface.to_string(),
                        active: session.interface().to_string(),
                    });
                }
                return Ok(Arc::clone(session));
            }
        }

        let session = self.inner.provider.open(interface)?;
        tracing::debug!(interface, "shared capture session created");
        *active = Some(Arc::clone(&session));
        Ok(session)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
