//! Per-`OFPT_*` handlers (C6): one function per message type, each validating its request and
//! either building the reply body or delegating the state change to a [`Datapath`].
//!
//! Grounded on lagopus's `ofp_*_handler.c` family: every handler receives the already
//! version/role-checked request body and returns either nothing (purely async messages), a
//! single reply, or propagates an [`AgentError`] the caller turns into `OFPT_ERROR`.

use std::sync::Arc;

use byteorder::{ByteOrder, NetworkEndian};

use agent::channel::Channel;
use agent::channel_manager::ChannelManager;
use agent::datapath::Datapath;
use agent::error::{AgentError, OfpErrorKind, Result};
use agent::role;
use oxm::RawExperimenter;
use packets::openflow::{self, Kind as OfKind, Packet as OfPacket, Version};
use packets::{async_config, features_reply, get_config_reply, hello, meter_mod,
              multipart, packet_out, queue_get_config};
use packets::error as error_msg;
use port::PortNumber;
use Repr;

/// `OFPCML_MAX`: the largest `miss_send_len` a `SET_CONFIG` may request short of "send whole
/// packet" (`OFPCML_NO_BUFFER`).
pub const OFPCML_MAX: u16 = 0xffe5;
pub const OFPCML_NO_BUFFER: u16 = 0xffff;

fn emit_body<T: Repr>(repr: &T) -> Vec<u8> {
    let mut buf = vec![0u8; repr.buffer_len()];
    repr.emit(&mut buf).expect("buffer sized from buffer_len");
    buf
}

/// Wrap `body` in an OpenFlow header addressed to `xid`.
fn encode(version: Version, xid: u32, kind: OfKind, body: &[u8]) -> Vec<u8> {
    let len = 8 + body.len();
    let mut buf = vec![0u8; len];
    {
        let mut packet = openflow::Packet::new(&mut buf[..]);
        packet.set_version(version);
        packet.set_kind(kind);
        packet.set_length(len as u16);
        packet.set_xid(xid);
    }
    buf[8..].copy_from_slice(body);
    buf
}

/// Build a raw `OFPT_ERROR` from a `(type, code, offending)` triple without going through
/// `packets::error::PacketRepr`'s `Header` taxonomy, since the agent's own error kinds already
/// carry the numeric pair.
fn encode_ofp_error(version: Version, xid: u32, error_type: u16, code: u16, offending: &[u8]) -> Vec<u8> {
    let mut body = vec![0u8; error_msg::Packet::<&[u8]>::header_len() + offending.len()];
    {
        let mut packet = error_msg::Packet::new(&mut body[..]);
        packet.set_kind(error_msg::Kind::from(error_type));
        packet.set_code(code);
    }
    body[error_msg::Packet::<&[u8]>::header_len()..].copy_from_slice(offending);
    encode(version, xid, OfKind::Error, &body)
}

/// Translate an [`AgentError`] into the wire bytes of the `OFPT_ERROR` it must surface as. Only
/// `AgentError::Ofp` reaches the peer; every other kind is the caller's to log and drop.
fn encode_agent_error(version: Version, xid: u32, err: &AgentError) -> Option<Vec<u8>> {
    match *err {
        AgentError::Ofp(ref detail) => Some(encode_ofp_error(
            version,
            xid,
            detail.error_type,
            detail.code,
            &detail.offending,
        )),
        _ => None,
    }
}

/// Dispatch one decoded channel frame to its handler, returning every reply that must be written
/// back to `channel`. Non-OFP failures are logged and produce no reply, per the propagation
/// policy: only `OFP_ERROR` kinds are wire-visible.
pub fn dispatch(
    channel: &Arc<Channel>,
    manager: &ChannelManager,
    datapath: &Datapath,
    raw: &[u8],
) -> Vec<Vec<u8>> {
    let packet = match OfPacket::new_checked(raw) {
        Ok(p) => p,
        Err(e) => {
            warn!("dropping truncated channel frame: {}", e);
            return Vec::new();
        }
    };
    let version = packet.version();
    let xid = packet.xid();
    let kind = packet.kind();
    let payload = packet.payload();

    // HELLO carries the sender's own highest supported version in the header, which is what the
    // bitmap negotiation in `handle_hello` exists to reconcile; every other message must already
    // be on the one version this core speaks.
    if kind != OfKind::Hello && version != Version::OpenFlow1Dot3 {
        let err = AgentError::ofp(OfpErrorKind::BadRequestBadVersion, raw);
        return encode_agent_error(version, xid, &err).into_iter().collect();
    }

    if !role::role_check(channel, kind) {
        let err = AgentError::ofp(OfpErrorKind::BadRequestIsSlave, raw);
        return encode_agent_error(version, xid, &err).into_iter().collect();
    }

    let result = match kind {
        OfKind::Hello => handle_hello(channel, version, payload, raw).map(|_| Vec::new()),
        OfKind::EchoRequest => Ok(vec![encode(version, xid, OfKind::EchoReply, payload)]),
        OfKind::FeaturesRequest => handle_features_request(channel, datapath)
            .map(|body| vec![encode(version, xid, OfKind::FeaturesReply, &body)]),
        OfKind::GetConfigRequest => {
            let body = emit_body(&get_config_reply::PacketRepr {
                flags: get_config_reply::Flags::FragmentNormal,
                miss_send_len: OFPCML_NO_BUFFER,
            });
            Ok(vec![encode(version, xid, OfKind::GetConfigReply, &body)])
        }
        OfKind::SetConfig => handle_set_config(payload, raw).map(|_| Vec::new()),
        OfKind::FlowMod => handle_flow_mod(channel, datapath, payload, raw).map(|_| Vec::new()),
        OfKind::GroupMod => handle_group_mod(channel, datapath, payload, raw).map(|_| Vec::new()),
        OfKind::MeterMod => handle_meter_mod(channel, datapath, payload, raw).map(|_| Vec::new()),
        OfKind::PacketOut => handle_packet_out(channel, datapath, payload, raw).map(|_| Vec::new()),
        OfKind::PortMod => handle_port_mod(channel, datapath, payload, raw).map(|_| Vec::new()),
        OfKind::TableMod => handle_table_mod(channel, datapath, payload, raw).map(|_| Vec::new()),
        OfKind::BarrierRequest => handle_barrier_request(channel)
            .map(|_| vec![encode(version, xid, OfKind::BarrierReply, &[])]),
        OfKind::RoleRequest => handle_role_request(channel, manager, payload, raw)
            .map(|body| vec![encode(version, xid, OfKind::RoleReply, &body)]),
        OfKind::GetAsynRequest => {
            let mask = channel.async_mask();
            let body = emit_body(&async_config::PacketRepr {
                packet_in_mask: [mask.packet_in.master_or_equal, mask.packet_in.slave],
                port_status_mask: [mask.port_status.master_or_equal, mask.port_status.slave],
                flow_removed_mask: [mask.flow_removed.master_or_equal, mask.flow_removed.slave],
            });
            Ok(vec![encode(version, xid, OfKind::GetAsyncReply, &body)])
        }
        OfKind::SetAsync => handle_set_async(channel, payload, raw).map(|_| Vec::new()),
        OfKind::QueueGetConfigRequest => {
            handle_queue_get_config_request(channel, datapath, payload, raw)
                .map(|body| vec![encode(version, xid, OfKind::QueueGetConfigReply, &body)])
        }
        OfKind::MultipartRequest => {
            handle_multipart_request(channel, datapath, version, xid, payload, raw)
        }
        _ => Err(AgentError::ofp(OfpErrorKind::BadRequestBadType, raw)),
    };

    match result {
        Ok(replies) => replies,
        Err(err) => {
            match encode_agent_error(version, xid, &err) {
                Some(bytes) => vec![bytes],
                None => {
                    warn!("handler failure for {:?}: {}", kind, err);
                    Vec::new()
                }
            }
        }
    }
}

fn handle_hello(channel: &Channel, version: Version, payload: &[u8], offending: &[u8]) -> Result<()> {
    let parsed = hello::PacketRepr::parse(payload)
        .map_err(|e| AgentError::from_codec(e, offending))?;

    let mut combined: u32 = 0;
    let mut has_bitmap = false;
    for element in parsed.elements() {
        if let hello::ElementData::Bitmap(bitmap) = &element.payload {
            has_bitmap = true;
            combined |= bitmap.0;
        }
    }
    let target = u8::from(Version::OpenFlow1Dot3) as u32;
    let supports_1_3 = if has_bitmap {
        (combined >> target) & 1 != 0
    } else {
        u8::from(version) >= u8::from(Version::OpenFlow1Dot3)
    };
    if !supports_1_3 {
        return Err(AgentError::ofp(OfpErrorKind::HelloIncompatible, offending));
    }
    channel.set_version(u8::from(Version::OpenFlow1Dot3));
    channel.set_hello_received(true);
    Ok(())
}

fn handle_features_request(channel: &Channel, datapath: &Datapath) -> Result<Vec<u8>> {
    let dpid = channel.dpid().ok_or(AgentError::NotDefined)?;
    let (datapath_id, n_buffers, n_tables, capabilities) = datapath.features(dpid)?;
    Ok(emit_body(&features_reply::PacketRepr {
        datapath_id,
        n_buffers,
        n_tables,
        auxiliary_id: channel.aux_id,
        capabilities: features_reply::Capabilities::new(capabilities),
        reserved: 0,
    }))
}

fn handle_set_config(payload: &[u8], offending: &[u8]) -> Result<()> {
    let parsed = get_config_reply::PacketRepr::parse(payload)
        .map_err(|e| AgentError::from_codec(e, offending))?;
    if let get_config_reply::Flags::Invalid(_) = parsed.flags {
        return Err(AgentError::ofp(
            OfpErrorKind::SwitchConfigFailedBadFlags,
            offending,
        ));
    }
    if parsed.miss_send_len != OFPCML_NO_BUFFER && parsed.miss_send_len > OFPCML_MAX {
        return Err(AgentError::ofp(
            OfpErrorKind::SwitchConfigFailedBadFlags,
            offending,
        ));
    }
    Ok(())
}

fn handle_flow_mod(
    channel: &Channel,
    datapath: &Datapath,
    payload: &[u8],
    offending: &[u8],
) -> Result<()> {
    use packets::flow_mod::{Command, PacketRepr};
    let dpid = channel.dpid().ok_or(AgentError::NotDefined)?;
    let parsed = PacketRepr::<RawExperimenter>::parse(payload)
        .map_err(|e| AgentError::from_codec(e, offending))?;
    if parsed.flags.has_unknown_bits() {
        return Err(AgentError::ofp(
            OfpErrorKind::FlowModFailedBadFlags,
            offending,
        ));
    }
    match parsed.command {
        Command::Add => datapath.flow_add(dpid, &parsed),
        Command::Modify | Command::ModifyStrict => datapath.flow_modify(dpid, &parsed),
        Command::Delete | Command::DeleteStrict => datapath.flow_delete(dpid, &parsed),
        Command::Unknown(_) => Err(AgentError::ofp(
            OfpErrorKind::FlowModFailedBadCommand,
            offending,
        )),
    }
}

fn handle_group_mod(
    channel: &Channel,
    datapath: &Datapath,
    payload: &[u8],
    offending: &[u8],
) -> Result<()> {
    use packets::group_mod::{Command, GroupType, PacketRepr};
    let dpid = channel.dpid().ok_or(AgentError::NotDefined)?;
    let parsed =
        PacketRepr::parse(payload).map_err(|e| AgentError::from_codec(e, offending))?;
    if let GroupType::Unknown(_) = parsed.group_type {
        return Err(AgentError::ofp(
            OfpErrorKind::GroupModFailedBadType,
            offending,
        ));
    }
    match parsed.command {
        Command::Add => datapath.group_add(dpid, &parsed),
        Command::Modify => datapath.group_modify(dpid, &parsed),
        Command::Delete => datapath.group_delete(dpid, &parsed),
        Command::Unknown(_) => Err(AgentError::ofp(
            OfpErrorKind::GroupModFailedBadCommand,
            offending,
        )),
    }
}

/// Every meter band opens with a common `{type: u16, length: u16, ...}` header; validating band
/// type only needs those four bytes; the rest is left opaque like the band list itself.
fn meter_band_types_ok(bands: &[u8]) -> bool {
    const DROP: u16 = 1;
    const DSCP_REMARK: u16 = 2;
    let mut offset = 0;
    while offset + 4 <= bands.len() {
        let band_type = NetworkEndian::read_u16(&bands[offset..offset + 2]);
        let band_len = NetworkEndian::read_u16(&bands[offset + 2..offset + 4]) as usize;
        if band_type != DROP && band_type != DSCP_REMARK {
            return false;
        }
        if band_len == 0 || offset + band_len > bands.len() {
            return false;
        }
        offset += band_len;
    }
    true
}

fn meter_id_valid(meter_id: u32) -> bool {
    (meter_id >= 1 && meter_id <= meter_mod::OFPM_MAX)
        || meter_id == meter_mod::OFPM_SLOWPATH
        || meter_id == meter_mod::OFPM_CONTROLLER
        || meter_id == meter_mod::OFPM_ALL
}

fn handle_meter_mod(
    channel: &Channel,
    datapath: &Datapath,
    payload: &[u8],
    offending: &[u8],
) -> Result<()> {
    use packets::meter_mod::{Command, PacketRepr};
    let dpid = channel.dpid().ok_or(AgentError::NotDefined)?;
    let parsed =
        PacketRepr::parse(payload).map_err(|e| AgentError::from_codec(e, offending))?;
    if parsed.flags.has_unknown_bits() {
        return Err(AgentError::ofp(
            OfpErrorKind::MeterModFailedBadFlags,
            offending,
        ));
    }
    if !meter_id_valid(parsed.meter_id) {
        return Err(AgentError::ofp(
            OfpErrorKind::MeterModFailedInvalidMeter,
            offending,
        ));
    }
    if !meter_band_types_ok(&parsed.bands) {
        return Err(AgentError::ofp(
            OfpErrorKind::MeterModFailedBadBand,
            offending,
        ));
    }
    match parsed.command {
        Command::Add => datapath.meter_add(dpid, &parsed),
        Command::Modify => datapath.meter_modify(dpid, &parsed),
        Command::Delete => datapath.meter_delete(dpid, &parsed),
        Command::Unknown(_) => Err(AgentError::InvalidArgs),
    }
}

fn handle_packet_out(
    channel: &Channel,
    datapath: &Datapath,
    payload: &[u8],
    offending: &[u8],
) -> Result<()> {
    let dpid = channel.dpid().ok_or(AgentError::NotDefined)?;
    let parsed = packet_out::PacketRepr::parse(payload).map_err(|e| match e {
        ::Error::Malformed => AgentError::ofp(OfpErrorKind::BadRequestBufferUnknown, offending),
        other => AgentError::from_codec(other, offending),
    })?;
    datapath.packet_out(dpid, &parsed)
}

fn handle_port_mod(
    channel: &Channel,
    datapath: &Datapath,
    payload: &[u8],
    offending: &[u8],
) -> Result<()> {
    use packets::port_mod::PacketRepr;
    let dpid = channel.dpid().ok_or(AgentError::NotDefined)?;
    let parsed =
        PacketRepr::parse(payload).map_err(|e| AgentError::from_codec(e, offending))?;
    datapath.port_mod(dpid, &parsed)
}

fn handle_table_mod(
    channel: &Channel,
    datapath: &Datapath,
    payload: &[u8],
    offending: &[u8],
) -> Result<()> {
    use packets::table_mod::{PacketRepr, OFPTT_ALL};
    let dpid = channel.dpid().ok_or(AgentError::NotDefined)?;
    let parsed =
        PacketRepr::parse(payload).map_err(|e| AgentError::from_codec(e, offending))?;
    if parsed.table_id != OFPTT_ALL && parsed.config != 0 && parsed.config != 3 {
        return Err(AgentError::ofp(
            OfpErrorKind::TableModFailedBadConfig,
            offending,
        ));
    }
    datapath.table_mod(dpid, &parsed)
}

/// `BARRIER_REQUEST` has nothing left to wait for by the time it reaches this function: every
/// request ahead of it on this channel already ran to completion on the single dispatch thread,
/// synchronously, before this one was read. The only thing left to check is that the channel is
/// still bound to a bridge at all.
fn handle_barrier_request(channel: &Channel) -> Result<()> {
    channel.dpid().ok_or(AgentError::NotDefined)?;
    Ok(())
}

fn handle_role_request(
    channel: &Arc<Channel>,
    manager: &ChannelManager,
    payload: &[u8],
    offending: &[u8],
) -> Result<Vec<u8>> {
    use packets::role::PacketRepr;
    let dpid = channel.dpid().ok_or(AgentError::NotDefined)?;
    let parsed =
        PacketRepr::parse(payload).map_err(|e| AgentError::from_codec(e, offending))?;
    let (role, generation_id) =
        role::apply_role_request(manager, dpid, channel, parsed.role, parsed.generation_id)?;
    Ok(emit_body(&PacketRepr {
        role,
        generation_id,
    }))
}

fn handle_set_async(channel: &Channel, payload: &[u8], offending: &[u8]) -> Result<()> {
    use agent::channel::{AsyncMask, AsyncSlotMask};
    let parsed = async_config::PacketRepr::parse(payload)
        .map_err(|e| AgentError::from_codec(e, offending))?;
    channel.set_async_mask(AsyncMask {
        packet_in: AsyncSlotMask {
            master_or_equal: parsed.packet_in_mask[0],
            slave: parsed.packet_in_mask[1],
        },
        port_status: AsyncSlotMask {
            master_or_equal: parsed.port_status_mask[0],
            slave: parsed.port_status_mask[1],
        },
        flow_removed: AsyncSlotMask {
            master_or_equal: parsed.flow_removed_mask[0],
            slave: parsed.flow_removed_mask[1],
        },
    });
    Ok(())
}

fn queue_get_config_port_ok(port: PortNumber) -> bool {
    match port {
        PortNumber::Regular(n) => n < 0xffff_ff00,
        PortNumber::Any => true,
        _ => false,
    }
}

fn handle_queue_get_config_request(
    channel: &Channel,
    datapath: &Datapath,
    payload: &[u8],
    offending: &[u8],
) -> Result<Vec<u8>> {
    use packets::queue_get_config::RequestRepr;
    let dpid = channel.dpid().ok_or(AgentError::NotDefined)?;
    let parsed =
        RequestRepr::parse(payload).map_err(|e| AgentError::from_codec(e, offending))?;
    if !queue_get_config_port_ok(parsed.port) {
        return Err(AgentError::ofp(OfpErrorKind::BadRequestBadPort, offending));
    }
    let reply = datapath.queue_get_config(dpid, &parsed)?;
    Ok(emit_body(&reply))
}

/// Split an encoded multipart reply body into `≤ MAX_BODY`-byte chunks, flagging every chunk but
/// the last with `REPLY_MORE`.
const MULTIPART_MAX_BODY: usize = 0xffff - 16;

fn split_multipart_reply(mtype: multipart::Kind, body: &[u8], version: Version, xid: u32) -> Vec<Vec<u8>> {
    if body.is_empty() {
        let repr = multipart::ReplyRepr {
            mtype,
            flags: multipart::Flags(0),
            body: multipart::ReplyBody::Raw(Vec::new()),
        };
        return vec![encode(version, xid, OfKind::MultipartReply, &emit_body(&repr))];
    }
    let chunks: Vec<&[u8]> = body.chunks(MULTIPART_MAX_BODY).collect();
    let last = chunks.len() - 1;
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let flags = if i == last { 0 } else { multipart::Flags::MORE };
            let repr = multipart::ReplyRepr {
                mtype,
                flags: multipart::Flags(flags),
                body: multipart::ReplyBody::Raw(chunk.to_vec()),
            };
            encode(version, xid, OfKind::MultipartReply, &emit_body(&repr))
        })
        .collect()
}

/// A multipart request's logical body may arrive split across several `OFPT_MULTIPART_REQUEST`
/// frames, threaded by `OFPMPF_REQ_MORE`; every fragment is folded into `channel`'s reassembly
/// table before anything is decoded, and only the frame that completes the table entry produces
/// a decode attempt and a reply.
fn handle_multipart_request(
    channel: &Channel,
    datapath: &Datapath,
    version: Version,
    xid: u32,
    payload: &[u8],
    offending: &[u8],
) -> Result<Vec<Vec<u8>>> {
    use packets::multipart::{Flags, ReplyBody, RequestRepr};

    if payload.len() < 8 {
        return Err(AgentError::from_codec(::Error::Exhausted, offending));
    }
    let mtype_raw = NetworkEndian::read_u16(&payload[0..2]);
    let flags = Flags(NetworkEndian::read_u16(&payload[2..4]));
    let fragment_body = &payload[8..];

    channel.multipart_put(xid, mtype_raw, fragment_body, flags.more())?;
    let assembled = match channel.multipart_get(xid, mtype_raw) {
        Ok(body) => body,
        Err(AgentError::NotFound) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut buf = vec![0u8; 8 + assembled.len()];
    NetworkEndian::write_u16(&mut buf[0..2], mtype_raw);
    buf[8..].copy_from_slice(&assembled);

    let dpid = channel.dpid().ok_or(AgentError::NotDefined)?;
    let parsed = RequestRepr::<RawExperimenter>::parse(&buf)
        .map_err(|e| AgentError::from_codec(e, offending))?;
    let reply_body = datapath.multipart_stats(dpid, &parsed)?;
    match reply_body {
        ReplyBody::Desc(ref desc) => {
            let repr = multipart::ReplyRepr {
                mtype: parsed.mtype,
                flags: multipart::Flags(0),
                body: ReplyBody::Desc(desc.clone()),
            };
            Ok(vec![encode(version, xid, OfKind::MultipartReply, &emit_body(&repr))])
        }
        ReplyBody::Aggregate(ref agg) => {
            let repr = multipart::ReplyRepr {
                mtype: parsed.mtype,
                flags: multipart::Flags(0),
                body: ReplyBody::Aggregate(*agg),
            };
            Ok(vec![encode(version, xid, OfKind::MultipartReply, &emit_body(&repr))])
        }
        ReplyBody::Raw(ref raw_body) => Ok(split_multipart_reply(parsed.mtype, raw_body, version, xid)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent::channel::Transport;
    use agent::datapath::fake::FakeDatapath;
    use packets::openflow::{PacketRepr as OfPacketRepr, PayloadRepr};
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    fn addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 6653)
    }

    fn hello_bytes(versions_bitmap: u32) -> Vec<u8> {
        let repr = OfPacketRepr::<RawExperimenter> {
            version: Version::OpenFlow1Dot3,
            kind: OfKind::Hello,
            length: 0,
            xid: 7,
            payload: PayloadRepr::Hello(hello::PacketRepr::new(vec![hello::ElementRepr {
                kind: hello::Kind::Bitmap,
                payload: hello::ElementData::Bitmap(hello::BitmapRepr(versions_bitmap)),
            }])),
        };
        let mut repr = repr;
        repr.set_length_auto();
        let mut buf = vec![0u8; repr.buffer_len()];
        repr.emit(&mut buf).unwrap();
        buf
    }

    #[test]
    fn hello_with_1_3_bit_accepts_and_sets_version() {
        let ch = Channel::new(1, addr(), Transport::Tcp4, 0, 4, 4);
        let manager = ChannelManager::new();
        let dp = FakeDatapath::new();
        let bytes = hello_bytes(1 << 1 | 1 << 4);
        let replies = dispatch(&ch, &manager, &dp, &bytes);
        assert!(replies.is_empty());
        assert_eq!(ch.version(), u8::from(Version::OpenFlow1Dot3));
        assert!(ch.hello_received());
    }

    #[test]
    fn hello_without_1_3_bit_is_rejected() {
        let ch = Channel::new(1, addr(), Transport::Tcp4, 0, 4, 4);
        let manager = ChannelManager::new();
        let dp = FakeDatapath::new();
        let bytes = hello_bytes(1 << 0);
        let replies = dispatch(&ch, &manager, &dp, &bytes);
        assert_eq!(replies.len(), 1);
        let packet = OfPacket::new_checked(&replies[0][..]).unwrap();
        assert_eq!(packet.kind(), OfKind::Error);
    }

    #[test]
    fn echo_request_copies_payload_and_xid() {
        let ch = Channel::new(1, addr(), Transport::Tcp4, 0, 4, 4);
        let manager = ChannelManager::new();
        let dp = FakeDatapath::new();
        let body = vec![1, 2, 3, 4];
        let raw = encode(Version::OpenFlow1Dot3, 42, OfKind::EchoRequest, &body);
        let replies = dispatch(&ch, &manager, &dp, &raw);
        assert_eq!(replies.len(), 1);
        let packet = OfPacket::new_checked(&replies[0][..]).unwrap();
        assert_eq!(packet.kind(), OfKind::EchoReply);
        assert_eq!(packet.xid(), 42);
        assert_eq!(packet.payload(), &body[..]);
    }

    #[test]
    fn incompatible_version_is_rejected_with_bad_version() {
        let ch = Channel::new(1, addr(), Transport::Tcp4, 0, 4, 4);
        let manager = ChannelManager::new();
        let dp = FakeDatapath::new();
        let raw = encode(Version::OpenFlow1Dot0, 7, OfKind::EchoRequest, &[]);
        let replies = dispatch(&ch, &manager, &dp, &raw);
        assert_eq!(replies.len(), 1);
        let packet = OfPacket::new_checked(&replies[0][..]).unwrap();
        assert_eq!(packet.kind(), OfKind::Error);
        let body = error_msg::Packet::new_checked(packet.payload()).unwrap();
        assert_eq!(body.kind(), error_msg::Kind::BadRequest);
        assert_eq!(body.code(), 0); // OFPBRC_BAD_VERSION
    }

    #[test]
    fn slave_flow_mod_is_rejected_with_is_slave() {
        let ch = Channel::new(1, addr(), Transport::Tcp4, 0, 4, 4);
        ch.set_role(::packets::role::Role::Slave);
        ch.set_dpid(1);
        let manager = ChannelManager::new();
        let dp = FakeDatapath::new();
        let body = vec![0u8; 40]; // zeroed flow_mod: empty match, no instructions
        let raw = encode(Version::OpenFlow1Dot3, 1, OfKind::FlowMod, &body);
        let replies = dispatch(&ch, &manager, &dp, &raw);
        assert_eq!(replies.len(), 1);
        let packet = error_msg::Packet::new(&replies[0][8..]);
        assert_eq!(packet.kind(), error_msg::Kind::BadRequest);
        assert_eq!(packet.code(), 10); // OFPBRC_IS_SLAVE
    }

    #[test]
    fn unknown_action_type_surfaces_bad_action_type() {
        let ch = Channel::new(1, addr(), Transport::Tcp4, 0, 4, 4);
        ch.set_dpid(1);
        let manager = ChannelManager::new();
        let dp = FakeDatapath::new();
        let mut body = vec![0u8; 40];
        // match: MATCH_TYPE=1(OXM), length=4, padded to 8
        NetworkEndian::write_u16(&mut body[36..38], 0); // flags
        let match_bytes: [u8; 8] = [0, 1, 0, 4, 0, 0, 0, 0];
        body.extend_from_slice(&match_bytes);
        // one instruction: APPLY_ACTIONS carrying one action of unknown type 0x9999
        let mut instruction = vec![0u8; 8];
        NetworkEndian::write_u16(&mut instruction[0..2], 4); // APPLY_ACTIONS
        let action_len = 8u16;
        NetworkEndian::write_u16(&mut instruction[2..4], 8 + action_len);
        let mut action = vec![0u8; 8];
        NetworkEndian::write_u16(&mut action[0..2], 0x9999);
        NetworkEndian::write_u16(&mut action[2..4], action_len);
        instruction.extend_from_slice(&action);
        body.extend_from_slice(&instruction);

        let raw = encode(Version::OpenFlow1Dot3, 5, OfKind::FlowMod, &body);
        let replies = dispatch(&ch, &manager, &dp, &raw);
        assert_eq!(replies.len(), 1);
        let packet = error_msg::Packet::new(&replies[0][8..]);
        assert_eq!(packet.kind(), error_msg::Kind::BadAction);
        assert_eq!(packet.code(), 0); // OFPBAC_BAD_TYPE
    }

    #[test]
    fn features_request_round_trips_through_fake_datapath() {
        let ch = Channel::new(1, addr(), Transport::Tcp4, 0, 4, 4);
        ch.set_dpid(9);
        let manager = ChannelManager::new();
        let dp = FakeDatapath::new();
        let raw = encode(Version::OpenFlow1Dot3, 3, OfKind::FeaturesRequest, &[]);
        let replies = dispatch(&ch, &manager, &dp, &raw);
        assert_eq!(replies.len(), 1);
        let packet = OfPacket::new_checked(&replies[0][..]).unwrap();
        assert_eq!(packet.kind(), OfKind::FeaturesReply);
    }

    fn multipart_request_payload(mtype: u16, more: bool, body: &[u8]) -> Vec<u8> {
        let mut payload = vec![0u8; 8 + body.len()];
        NetworkEndian::write_u16(&mut payload[0..2], mtype);
        if more {
            NetworkEndian::write_u16(&mut payload[2..4], multipart::Flags::MORE);
        }
        payload[8..].copy_from_slice(body);
        payload
    }

    #[test]
    fn multipart_request_split_across_fragments_replies_once() {
        let ch = Channel::new(1, addr(), Transport::Tcp4, 0, 4, 4);
        ch.set_dpid(9);
        let manager = ChannelManager::new();
        let dp = FakeDatapath::new();
        let mtype: u16 = multipart::Kind::PortDesc.into();

        let first = encode(
            Version::OpenFlow1Dot3,
            11,
            OfKind::MultipartRequest,
            &multipart_request_payload(mtype, true, &[1, 2]),
        );
        let replies = dispatch(&ch, &manager, &dp, &first);
        assert!(replies.is_empty(), "a non-terminal fragment must not be answered yet");

        let second = encode(
            Version::OpenFlow1Dot3,
            11,
            OfKind::MultipartRequest,
            &multipart_request_payload(mtype, false, &[3, 4]),
        );
        let replies = dispatch(&ch, &manager, &dp, &second);
        assert_eq!(replies.len(), 1, "the terminal fragment answers the reassembled request once");
        let packet = OfPacket::new_checked(&replies[0][..]).unwrap();
        assert_eq!(packet.kind(), OfKind::MultipartReply);
    }
}
