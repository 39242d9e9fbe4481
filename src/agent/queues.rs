//! The two entry shapes that flow through the dispatch loop: one per inbound channel frame, one
//! per outbound async/reply event headed to a bridge's event queues.
//!
//! Grounded on lagopus's `channelq_data.h` / `eventq_data.h`.

use std::sync::Arc;

use agent::channel::Channel;
use agent::error::MAX_OFFENDING_LEN;

/// One frame read off a channel's transport, paired with the channel it arrived on. Consumed by
/// the dispatch loop's per-type handler lookup.
pub struct ChannelQueueEntry {
    pub channel: Arc<Channel>,
    pub body: Vec<u8>,
}

impl ChannelQueueEntry {
    pub fn new(channel: Arc<Channel>, body: Vec<u8>) -> Self {
        ChannelQueueEntry { channel, body }
    }
}

/// An outbound event, tagged by the OFPT_* it will be encoded as. Each variant carries its
/// wire-ready body and the channel-id it should be routed to (or fanned out from, for the
/// dpid-wide async kinds).
pub enum EventQueueEntry {
    PacketOut { channel_id: u64, body: Vec<u8> },
    PacketIn { dpid: u64, body: Vec<u8> },
    BarrierRequest { channel_id: u64, xid: u32 },
    BarrierReply { channel_id: u64, xid: u32 },
    FlowRemoved { dpid: u64, body: Vec<u8> },
    PortStatus { dpid: u64, body: Vec<u8> },
    Error {
        channel_id: u64,
        error_type: u16,
        code: u16,
        offending: Vec<u8>,
    },
}

impl EventQueueEntry {
    /// Build an `Error` entry, truncating the echoed request to `MAX_OFFENDING_LEN` bytes as
    /// every `OFPT_ERROR` body must.
    pub fn error(channel_id: u64, error_type: u16, code: u16, offending_request: &[u8]) -> Self {
        let len = offending_request.len().min(MAX_OFFENDING_LEN);
        EventQueueEntry::Error {
            channel_id,
            error_type,
            code,
            offending: offending_request[..len].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_entry_truncates_offending_bytes() {
        let long = vec![0xabu8; 200];
        match EventQueueEntry::error(1, 1, 2, &long) {
            EventQueueEntry::Error { offending, .. } => {
                assert_eq!(offending.len(), MAX_OFFENDING_LEN);
            }
            _ => panic!("wrong variant"),
        }
    }
}
