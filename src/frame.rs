//! Ethernet frame decoding.

use std::time::SystemTime;

use macaddr::MacAddr6;
use pnet::packet::ethernet::EthernetPacket;
use pnet::packet::Packet;

use crate::capture::RawFrame;
use crate::error::{Error, Result};

/// A decoded Ethernet frame, as handed to press listeners.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Source hardware address.
    pub source: MacAddr6,
    /// Destination hardware address.
    pub destination: MacAddr6,
    /// EtherType field.
    pub ethertype: u16,
    /// Payload after the Ethernet header.
    pub payload: Vec<u8>,
    /// Capture timestamp carried over from the raw frame.
    pub timestamp: SystemTime,
}

/// Decode the Ethernet header of a raw frame.
pub fn decode(frame: &RawFrame) -> Result<DecodedFrame> {
    let ethernet =
        EthernetPacket::new(&frame.data).ok_or(Error::TruncatedFrame(frame.data.len()))?;

    Ok(DecodedFrame {
        source: MacAddr6::from(ethernet.get_source().octets()),
        destination: MacAddr6::from(ethernet.get_destination().octets()),
        ethertype: ethernet.get_ethertype().0,
        payload: ethernet.payload().to_vec(),
        timestamp: frame.timestamp,
    })
}

/// Extract just the source hardware address of a raw frame.
pub fn source_address(frame: &RawFrame) -> Result<MacAddr6> {
    let ethernet =
        EthernetPacket::new(&frame.data).ok_or(Error::TruncatedFrame(frame.data.len()))?;

    Ok(MacAddr6::from(ethernet.get_source().octets()))
}
