//! Role-based write gating and the async-event fan-out mask check.
//!
//! Grounded on lagopus's `ofp_role.c` / `channel.c` async-mask logic: a channel's role gates
//! which request types it may send, and separately gates which async events it receives, via a
//! 2-slot-per-kind bitmap (master/equal share a slot, slave has its own).

use agent::channel::{AsyncMask, Channel};
use agent::channel_manager::ChannelManager;
use agent::error::{AgentError, OfpErrorKind, Result};
use packets::openflow::Kind;
use packets::role::Role;

/// Message types a `SLAVE` channel is forbidden to send, per the slave-write restriction.
const SLAVE_FORBIDDEN: &[Kind] = &[
    Kind::SetConfig,
    Kind::TableMod,
    Kind::FlowMod,
    Kind::GroupMod,
    Kind::PortMod,
    Kind::MeterMod,
    Kind::PacketOut,
    Kind::PacketIn,
    Kind::FlowRemoved,
];

/// Whether `channel` (at its current role) is permitted to send `kind`.
pub fn role_check(channel: &Channel, kind: Kind) -> bool {
    if channel.role() != Role::Slave {
        return true;
    }
    !SLAVE_FORBIDDEN.contains(&kind)
}

/// Reject a disallowed request with the wire error this restriction always produces.
pub fn role_check_or_err(channel: &Channel, kind: Kind, offending: &[u8]) -> Result<()> {
    if role_check(channel, kind) {
        Ok(())
    } else {
        Err(AgentError::ofp(OfpErrorKind::BadRequestIsSlave, offending))
    }
}

/// Apply a ROLE_REQUEST to `channel`, bound to `dpid` in `manager`. Returns the role and
/// generation-id to echo back in ROLE_REPLY.
pub fn apply_role_request(
    manager: &ChannelManager,
    dpid: u64,
    channel: &::std::sync::Arc<Channel>,
    requested: Role,
    generation_id: u64,
) -> Result<(Role, u64)> {
    match requested {
        Role::NoChange => {}
        Role::Master => {
            manager.generation_id_set(dpid, generation_id)?;
            manager.promote_master(dpid, channel);
        }
        Role::Equal => {
            channel.set_role(requested);
        }
        Role::Slave => {
            manager.generation_id_set(dpid, generation_id)?;
            channel.set_role(requested);
        }
        Role::Unknown(_) => return Err(AgentError::InvalidArgs),
    }
    Ok((
        channel.role(),
        manager.generation_id_get(dpid).unwrap_or(0),
    ))
}

/// Whether an async event of `reason` (a small bit position within its kind's mask) should be
/// delivered to a channel currently holding `role`.
pub fn role_channel_check_mask(mask: &AsyncMask, role: Role, kind: AsyncKind, reason: u8) -> bool {
    let slot_mask = match kind {
        AsyncKind::PacketIn => &mask.packet_in,
        AsyncKind::PortStatus => &mask.port_status,
        AsyncKind::FlowRemoved => &mask.flow_removed,
    };
    slot_mask.passes(role, reason)
}

/// The three asynchronous message kinds gated by a channel's async-mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncKind {
    PacketIn,
    PortStatus,
    FlowRemoved,
}

/// Fan `encode(channel.xid_get())` out to every live channel on `dpid`'s list whose async-mask
/// admits `(kind, reason)`. Channels that reject delivery, and dead channels, are silently
/// skipped; if the list itself is empty or entirely dead, nothing is sent.
pub fn fan_out_async<F: Fn(u32) -> Vec<u8>>(
    manager: &ChannelManager,
    dpid: u64,
    kind: AsyncKind,
    reason: u8,
    encode: F,
) {
    manager.dpid_iterate(dpid, |channel| {
        let mask = channel.async_mask();
        if role_channel_check_mask(&mask, channel.role(), kind, reason) {
            let xid = channel.xid_get();
            let _ = channel.send_packet_by_event(encode(xid));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent::channel::{AsyncSlotMask, Transport};
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), port)
    }

    #[test]
    fn slave_is_blocked_from_flow_mod_but_not_packet_in() {
        let ch = Channel::new(1, addr(1), Transport::Tcp4, 0, 4, 4);
        ch.set_role(Role::Slave);
        assert!(!role_check(&ch, Kind::FlowMod));
        assert!(role_check(&ch, Kind::EchoRequest));
    }

    #[test]
    fn master_role_request_demotes_peers() {
        let manager = ChannelManager::new();
        let a = Channel::new(1, addr(1), Transport::Tcp4, 0, 4, 4);
        let b = Channel::new(2, addr(2), Transport::Tcp4, 0, 4, 4);
        manager.bind_dpid(7, a.clone());
        manager.bind_dpid(7, b.clone());
        a.set_role(Role::Master);

        let (role, gen) = apply_role_request(&manager, 7, &b, Role::Master, 10).unwrap();
        assert_eq!(role, Role::Master);
        assert_eq!(gen, 10);
        assert_eq!(a.role(), Role::Slave);
    }

    #[test]
    fn stale_generation_id_is_rejected() {
        let manager = ChannelManager::new();
        let a = Channel::new(1, addr(1), Transport::Tcp4, 0, 4, 4);
        manager.bind_dpid(9, a.clone());
        apply_role_request(&manager, 9, &a, Role::Slave, 20).unwrap();
        assert!(apply_role_request(&manager, 9, &a, Role::Slave, 5).is_err());
    }

    #[test]
    fn equal_role_ignores_generation_id_staleness() {
        let manager = ChannelManager::new();
        let a = Channel::new(1, addr(1), Transport::Tcp4, 0, 4, 4);
        manager.bind_dpid(9, a.clone());
        apply_role_request(&manager, 9, &a, Role::Slave, 20).unwrap();

        let (role, gen) = apply_role_request(&manager, 9, &a, Role::Equal, 5).unwrap();
        assert_eq!(role, Role::Equal);
        assert_eq!(gen, 20, "EQUAL must not overwrite the stored generation-id");
    }

    #[test]
    fn async_fan_out_respects_mask_and_role() {
        let manager = ChannelManager::new();
        let ch = Channel::new(1, addr(1), Transport::Tcp4, 0, 4, 4);
        manager.bind_dpid(1, ch.clone());
        ch.set_role(Role::Master);
        ch.set_async_mask(AsyncMask {
            packet_in: AsyncSlotMask {
                master_or_equal: 1 << 0,
                slave: 0,
            },
            ..Default::default()
        });

        fan_out_async(&manager, 1, AsyncKind::PacketIn, 0, |_xid| vec![1, 2, 3]);
        let mut sent = Vec::new();
        ch.drain_writes(|b| sent.push(b));
        assert_eq!(sent.len(), 1);

        fan_out_async(&manager, 1, AsyncKind::PacketIn, 1, |_xid| vec![9]);
        let mut sent2 = Vec::new();
        ch.drain_writes(|b| sent2.push(b));
        assert!(sent2.is_empty());
    }
}
