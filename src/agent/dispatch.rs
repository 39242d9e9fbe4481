//! The single cooperative loop (C7): multiplexes the channel queue and every registered bridge's
//! data/event queues, decodes and dispatches each channel frame, and fans out the asynchronous
//! events a datapath posts upward.
//!
//! Grounded on lagopus's `ofp_handler.c` main loop: each iteration snapshots the bridge-queue
//! registry, waits on the channel queue up to `MUXER_TIMEOUT`, then batch-drains everything that
//! is ready. `crossbeam_channel::Receiver::recv_timeout` stands in for the source's
//! poll-multiplexer wake; since every bridge queue is already drained through its own
//! batch-limited, non-blocking method rather than a registered `mio::Evented`, there is nothing
//! left for a `Select` to multiplex beyond the channel queue itself.

use std::time::Duration;

use agent::bridgeq::BridgeQueueManager;
use agent::channel_manager::ChannelManager;
use agent::datapath::Datapath;
use agent::handlers;
use agent::queues::ChannelQueueEntry;
use agent::role::{self, AsyncKind};
use packets::openflow::{self, Kind as OfKind};

/// How long one iteration waits for the first channel-queue entry before falling through to the
/// per-bridge drain step regardless. Mirrors the source's `MUXER_TIMEOUT`.
pub const MUXER_TIMEOUT: Duration = Duration::from_millis(100);

/// Per-iteration batch caps, mirroring the source's `channelq_max_batches` /
/// `eventq_max_batches` / `dataq_max_batches`.
#[derive(Debug, Clone, Copy)]
pub struct DispatchLimits {
    pub channelq_max_batches: usize,
    pub eventq_max_batches: usize,
    pub dataq_max_batches: usize,
}

impl Default for DispatchLimits {
    fn default() -> Self {
        DispatchLimits {
            channelq_max_batches: 32,
            eventq_max_batches: 16,
            dataq_max_batches: 16,
        }
    }
}

/// Run the loop until `status` observes a shutdown. `SHUTDOWN_GRACEFULLY` keeps draining until
/// the channel queue and every bridge queue have gone empty in the same iteration;
/// `SHUTDOWN_RIGHT_NOW` breaks out immediately, abandoning whatever is still queued.
pub fn run(
    manager: &ChannelManager,
    bridgeqs: &BridgeQueueManager,
    datapath: &Datapath,
    status: &::agent::facade::StatusHandle,
    limits: DispatchLimits,
) {
    use agent::facade::status as s;
    loop {
        match status.get() {
            s::SHUTDOWN_RIGHT_NOW => break,
            s::SHUTDOWN_GRACEFULLY => {
                let drained = step(manager, bridgeqs, datapath, &limits);
                if !drained {
                    break;
                }
            }
            _ => {
                step(manager, bridgeqs, datapath, &limits);
            }
        }
    }
    status.set(s::SHUTDOWNED);
}

/// One iteration of the loop. Returns whether anything at all was drained, so a graceful shutdown
/// can tell when it has quiesced.
pub fn step(
    manager: &ChannelManager,
    bridgeqs: &BridgeQueueManager,
    datapath: &Datapath,
    limits: &DispatchLimits,
) -> bool {
    let channel_queue = manager.channel_queue_receiver();
    let snapshot = bridgeqs.bridgeqs_to_array();
    let mut drained_anything = false;

    if let Ok(first) = channel_queue.recv_timeout(MUXER_TIMEOUT) {
        dispatch_entry(manager, datapath, first);
        drained_anything = true;
        let mut drained = 1;
        while drained < limits.channelq_max_batches {
            match channel_queue.try_recv() {
                Ok(entry) => {
                    dispatch_entry(manager, datapath, entry);
                    drained += 1;
                }
                Err(_) => break,
            }
        }
    }

    for bq in &snapshot {
        let dpid = bq.dpid;
        let mut saw_event = false;
        bq.event_q_drain(limits.eventq_max_batches.min(bq.event_q_max_batches()), |frame| {
            saw_event = true;
            route_async_event(manager, dpid, &frame);
        });
        let mut saw_data = false;
        bq.data_q_drain(limits.dataq_max_batches.min(bq.data_q_max_batches()), |frame| {
            saw_data = true;
            route_async_event(manager, dpid, &frame);
        });
        drained_anything = drained_anything || saw_event || saw_data;
    }

    bridgeqs.bridgeqs_free(snapshot, false);
    drained_anything
}

fn dispatch_entry(manager: &ChannelManager, datapath: &Datapath, entry: ChannelQueueEntry) {
    let replies = handlers::dispatch(&entry.channel, manager, datapath, &entry.body);
    if !replies.is_empty() {
        if entry.channel.send_packet_list(replies).is_err() {
            warn!(
                "write queue full for channel {}, dropping reply batch",
                entry.channel.channel_id
            );
        }
    }
}

/// Decode just enough of an already wire-encoded async frame (kind + reason byte) to run it
/// through the role/async-mask fan-out, re-stamping a fresh per-channel XID on every copy sent.
fn route_async_event(manager: &ChannelManager, dpid: u64, frame: &[u8]) {
    let packet = match openflow::Packet::new_checked(frame) {
        Ok(p) => p,
        Err(e) => {
            warn!("dropping malformed async event for dpid {}: {}", dpid, e);
            return;
        }
    };
    let kind = packet.kind();
    let payload = packet.payload();
    let (async_kind, reason_offset) = match kind {
        OfKind::PacketIn => (AsyncKind::PacketIn, 6),
        OfKind::PortStatus => (AsyncKind::PortStatus, 0),
        OfKind::FlowRemoved => (AsyncKind::FlowRemoved, 10),
        other => {
            warn!("dropping unexpected event-queue frame kind {:?} for dpid {}", other, dpid);
            return;
        }
    };
    let reason = match payload.get(reason_offset) {
        Some(r) => *r,
        None => {
            warn!("dropping truncated {:?} event for dpid {}", async_kind, dpid);
            return;
        }
    };
    role::fan_out_async(manager, dpid, async_kind, reason, |xid| {
        let mut restamped = frame.to_vec();
        openflow::Packet::new(&mut restamped[..]).set_xid(xid);
        restamped
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent::bridgeq::{BridgeInfo, QueueInfo};
    use agent::channel::{AsyncMask, AsyncSlotMask, Channel, Transport};
    use agent::datapath::fake::FakeDatapath;
    use agent::facade::StatusHandle;
    use byteorder::{ByteOrder, NetworkEndian};
    use packets::openflow::Version;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use tracing_test::traced_test;

    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 6653)
    }

    fn q_info() -> QueueInfo {
        QueueInfo {
            data_q_capacity: 8,
            event_q_capacity: 8,
            event_data_q_capacity: 8,
            data_q_max_batches: 4,
            event_q_max_batches: 4,
            event_data_q_max_batches: 4,
        }
    }

    fn port_status_frame(xid: u32) -> Vec<u8> {
        let len = 8 + 8 + 64;
        let mut buf = vec![0u8; len];
        buf[0] = u8::from(Version::OpenFlow1Dot3);
        buf[1] = 12; // OFPT_PORT_STATUS
        NetworkEndian::write_u16(&mut buf[2..4], len as u16);
        NetworkEndian::write_u32(&mut buf[4..8], xid);
        buf[8] = 0; // reason = ADD
        buf
    }

    #[test]
    fn echo_request_through_channel_queue_gets_replied_and_enqueued_for_write() {
        let manager = ChannelManager::new();
        let bridgeqs = BridgeQueueManager::new();
        let dp = FakeDatapath::new();
        let ch = Channel::new(1, addr(), Transport::Tcp4, 0, 4, 4);

        let mut body = vec![0u8; 8];
        body[0] = u8::from(Version::OpenFlow1Dot3);
        body[1] = 2; // OFPT_ECHO_REQUEST
        NetworkEndian::write_u16(&mut body[2..4], 8);
        NetworkEndian::write_u32(&mut body[4..8], 99);
        manager
            .channel_queue_put(ChannelQueueEntry::new(ch.clone(), body))
            .unwrap();

        let limits = DispatchLimits::default();
        step(&manager, &bridgeqs, &dp, &limits);

        let mut written = Vec::new();
        ch.drain_writes(|b| written.push(b));
        assert_eq!(written.len(), 1);
        assert_eq!(written[0][1], 3); // OFPT_ECHO_REPLY
    }

    #[test]
    fn port_status_fans_out_to_masked_channel_with_fresh_xid() {
        let manager = ChannelManager::new();
        let bridgeqs = BridgeQueueManager::new();
        bridgeqs
            .register(1, BridgeInfo { name: "br0".into() }, q_info())
            .unwrap();
        let dp = FakeDatapath::new();

        let ch = Channel::new(1, addr(), Transport::Tcp4, 0, 4, 4);
        manager.bind_dpid(1, ch.clone());
        ch.set_async_mask(AsyncMask {
            port_status: AsyncSlotMask {
                master_or_equal: 1 << 0,
                slave: 0,
            },
            ..Default::default()
        });

        let bq = bridgeqs.lookup(1).unwrap();
        bq.event_q_put(port_status_frame(0xdead_beef)).unwrap();
        bridgeqs.bridgeq_free(bq, false);

        let limits = DispatchLimits::default();
        step(&manager, &bridgeqs, &dp, &limits);

        let mut written = Vec::new();
        ch.drain_writes(|b| written.push(b));
        assert_eq!(written.len(), 1);
        assert_eq!(written[0][1], 12);
        assert_ne!(NetworkEndian::read_u32(&written[0][4..8]), 0xdead_beef);
    }

    #[test]
    #[traced_test]
    fn full_write_queue_logs_a_warning_and_drops_the_reply() {
        let manager = ChannelManager::new();
        let bridgeqs = BridgeQueueManager::new();
        let dp = FakeDatapath::new();
        let ch = Channel::new(1, addr(), Transport::Tcp4, 0, 4, 1);

        let mut body = vec![0u8; 8];
        body[0] = u8::from(Version::OpenFlow1Dot3);
        body[1] = 2; // OFPT_ECHO_REQUEST
        NetworkEndian::write_u16(&mut body[2..4], 8);
        NetworkEndian::write_u32(&mut body[4..8], 1);
        manager
            .channel_queue_put(ChannelQueueEntry::new(ch.clone(), body.clone()))
            .unwrap();
        manager
            .channel_queue_put(ChannelQueueEntry::new(ch.clone(), body))
            .unwrap();

        let limits = DispatchLimits::default();
        step(&manager, &bridgeqs, &dp, &limits);

        let mut written = Vec::new();
        ch.drain_writes(|b| written.push(b));
        assert_eq!(written.len(), 1);
        assert!(logs_contain("write queue full"));
    }

    #[test]
    fn shutdown_right_now_stops_the_run_loop_promptly() {
        let manager = ChannelManager::new();
        let bridgeqs = BridgeQueueManager::new();
        let dp = FakeDatapath::new();
        let status = StatusHandle::new();
        status.set(::agent::facade::status::SHUTDOWN_RIGHT_NOW);

        run(&manager, &bridgeqs, &dp, &status, DispatchLimits::default());
        assert_eq!(status.get(), ::agent::facade::status::SHUTDOWNED);
    }
}
