use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by button construction, session setup, and frame decoding.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid MAC address '{addr}'")]
    InvalidMac {
        addr: String,
        #[source]
        source: macaddr::ParseError,
    },

    #[error("no suitable network interface found")]
    NoDefaultInterface,

    #[error("interface '{0}' not found")]
    InterfaceNotFound(String),

    #[error("capture session is bound to '{active}', cannot watch '{requested}'")]
    InterfaceMismatch { requested: String, active: String },

    #[error("packet capture error: {0}")]
    Capture(#[from] pcap::Error),

    #[error("frame too short for an Ethernet header: {0} bytes")]
    TruncatedFrame(usize),
}

/// Error type a press listener may return.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// One listener's failed outcome within a dispatch round.
///
/// Faults never propagate out of a round; they are collected while every
/// listener for the frame settles and logged afterwards.
#[derive(Error, Debug)]
pub enum ListenerFault {
    #[error("listener failed: {0}")]
    Failed(#[source] ListenerError),

    #[error("listener panicked: {0}")]
    Panicked(String),
}
