//! pencet - detect Dash button presses on your network.
//!
//! When one of these buttons is pressed it joins the network and announces
//! itself with an ARP probe and a DHCP request, both sent from an all-zero
//! sender IP. This library sniffs those broadcasts with libpcap, matches
//! them against the hardware addresses you register, and invokes your
//! listeners on every press.
//!
//! Buttons watching the same interface share one capture session; it is
//! opened when the first listener is added and closed when the last one is
//! removed. While a button's listeners are running, further frames from it
//! are dropped rather than queued, so one physical press maps to one
//! dispatch round.
//!
//! # Example
//!
//! ```no_run
//! use pencet::{Button, SessionRegistry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = SessionRegistry::new();
//!     let button = Button::new(&registry, "ac:63:be:2a:7f:4e")?;
//!
//!     let mut subscription = button.add_listener(|packet| async move {
//!         println!("button {} pressed", packet.source);
//!         Ok(())
//!     })?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     subscription.remove();
//!     Ok(())
//! }
//! ```

pub mod button;
pub mod capture;
pub mod error;
pub mod filters;
pub mod frame;
pub mod interface;
mod listener;
pub mod mac;
pub mod registry;

pub use button::{Button, Subscription};
pub use capture::{CaptureSession, HandlerId, PcapSessionProvider, RawFrame, SessionProvider};
pub use error::{Error, ListenerError, ListenerFault, Result};
pub use frame::DecodedFrame;
pub use registry::SessionRegistry;
