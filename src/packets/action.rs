//! `ofp_action_header` and the action types this agent core accepts in `FLOW_MOD`,
//! `PACKET_OUT`, `OFPIT_WRITE_ACTIONS` and `OFPIT_APPLY_ACTIONS`.
//!
//! ```no_rust
//! +--------+--------+--------+--------+
//! |      type       |      length     |
//! +--------+--------+--------+--------+
//! |           type-specific           |
//! |         (padded to 8 bytes)       |
//! +--------+--------+--------+--------+
//! ```

use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};
use port::PortNumber;

enum_with_unknown! {
    pub doc enum Kind(u16) {
        /// Output to switch port.
        Output = 0,
        /// Copy TTL "outwards".
        CopyTtlOut = 11,
        /// Copy TTL "inwards".
        CopyTtlIn = 12,
        /// Set MPLS TTL.
        SetMplsTtl = 15,
        /// Decrement MPLS TTL.
        DecMplsTtl = 16,
        /// Push a new VLAN tag.
        PushVlan = 17,
        /// Pop the outer VLAN tag.
        PopVlan = 18,
        /// Push a new MPLS tag.
        PushMpls = 19,
        /// Pop the outer MPLS tag.
        PopMpls = 20,
        /// Set queue id when outputting to a port.
        SetQueue = 21,
        /// Apply group.
        Group = 22,
        /// Set IP TTL.
        SetNwTtl = 23,
        /// Decrement IP TTL.
        DecNwTtl = 24,
        /// Set a header field using OXM TLV format.
        SetField = 25,
        /// Push a new PBB service tag.
        PushPbb = 26,
        /// Pop the outer PBB service tag.
        PopPbb = 27,
        /// Experimenter action; always rejected by this agent core.
        Experimenter = 0xffff
    }
}

/// A single decoded action. Actions whose full structure this crate does not model (e.g.
/// `SET_FIELD`, whose body is an embedded OXM TLV) are kept as their raw, already
/// length-validated, on-wire body so they can be forwarded to the datapath unmodified.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ActionRepr {
    Output { port: PortNumber, max_len: u16 },
    SetQueue { queue_id: u32 },
    Group { group_id: u32 },
    SetNwTtl { ttl: u8 },
    SetMplsTtl { ttl: u8 },
    Raw { kind: Kind, body: Vec<u8> },
}

mod field {
    use field::*;
    pub const TYPE: Field = 0..2;
    pub const LENGTH: Field = 2..4;
    pub const BODY: Rest = 4..;
}

fn pad8(len: usize) -> usize {
    (len + 7) / 8 * 8
}

impl Repr for ActionRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < 4 {
            return Err(Error::BadActionLen);
        }
        let kind = Kind::from(NetworkEndian::read_u16(&buffer[field::TYPE]));
        let len = NetworkEndian::read_u16(&buffer[field::LENGTH]) as usize;
        if len < 4 || len > buffer.len() {
            return Err(Error::BadActionLen);
        }
        let body = &buffer[field::BODY.start..len];
        match kind {
            Kind::Output => {
                if len != 16 {
                    return Err(Error::BadActionLen);
                }
                let port = PortNumber::from(NetworkEndian::read_u32(&body[0..4]));
                let max_len = NetworkEndian::read_u16(&body[4..6]);
                Ok(ActionRepr::Output { port, max_len })
            }
            Kind::SetQueue => {
                if len != 8 {
                    return Err(Error::BadActionLen);
                }
                Ok(ActionRepr::SetQueue {
                    queue_id: NetworkEndian::read_u32(&body[0..4]),
                })
            }
            Kind::Group => {
                if len != 8 {
                    return Err(Error::BadActionLen);
                }
                Ok(ActionRepr::Group {
                    group_id: NetworkEndian::read_u32(&body[0..4]),
                })
            }
            Kind::SetNwTtl => Ok(ActionRepr::SetNwTtl { ttl: body[0] }),
            Kind::SetMplsTtl => Ok(ActionRepr::SetMplsTtl { ttl: body[0] }),
            Kind::Experimenter => Err(Error::BadExperimenterAction),
            Kind::Unknown(_) => Err(Error::BadActionType),
            other => Ok(ActionRepr::Raw {
                kind: other,
                body: body[4..].to_vec(),
            }),
        }
    }

    fn buffer_len(&self) -> usize {
        match *self {
            ActionRepr::Output { .. } => 16,
            ActionRepr::SetQueue { .. } | ActionRepr::Group { .. } => 8,
            ActionRepr::SetNwTtl { .. } | ActionRepr::SetMplsTtl { .. } => pad8(4 + 1),
            ActionRepr::Raw { ref body, .. } => pad8(4 + body.len()),
        }
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        let total = self.buffer_len();
        if buffer.len() < total {
            return Err(Error::Exhausted);
        }
        for b in buffer[..total].iter_mut() {
            *b = 0;
        }
        let kind = match *self {
            ActionRepr::Output { .. } => Kind::Output,
            ActionRepr::SetQueue { .. } => Kind::SetQueue,
            ActionRepr::Group { .. } => Kind::Group,
            ActionRepr::SetNwTtl { .. } => Kind::SetNwTtl,
            ActionRepr::SetMplsTtl { .. } => Kind::SetMplsTtl,
            ActionRepr::Raw { kind, .. } => kind,
        };
        NetworkEndian::write_u16(&mut buffer[field::TYPE], kind.into());
        NetworkEndian::write_u16(&mut buffer[field::LENGTH], total as u16);
        match *self {
            ActionRepr::Output { port, max_len } => {
                NetworkEndian::write_u32(&mut buffer[4..8], port.into());
                NetworkEndian::write_u16(&mut buffer[8..10], max_len);
            }
            ActionRepr::SetQueue { queue_id } | ActionRepr::Group { group_id: queue_id } => {
                NetworkEndian::write_u32(&mut buffer[4..8], queue_id);
            }
            ActionRepr::SetNwTtl { ttl } | ActionRepr::SetMplsTtl { ttl } => {
                buffer[4] = ttl;
            }
            ActionRepr::Raw { ref body, .. } => {
                buffer[4..4 + body.len()].copy_from_slice(body);
            }
        }
        Ok(())
    }
}

/// Parse a back-to-back list of actions occupying the whole of `buffer`.
pub fn parse_list(buffer: &[u8]) -> Result<Vec<ActionRepr>> {
    let mut actions = Vec::new();
    let mut offset = 0;
    while offset < buffer.len() {
        let action = ActionRepr::parse(&buffer[offset..])?;
        offset += action.buffer_len();
        actions.push(action);
    }
    Ok(actions)
}

/// Total encoded length of a list of actions.
pub fn list_buffer_len(actions: &[ActionRepr]) -> usize {
    actions.iter().map(Repr::buffer_len).sum()
}

/// Encode a list of actions back to back into `buffer`.
pub fn emit_list(actions: &[ActionRepr], buffer: &mut [u8]) -> Result<()> {
    let mut offset = 0;
    for action in actions {
        let len = action.buffer_len();
        action.emit(&mut buffer[offset..offset + len])?;
        offset += len;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn output_round_trips() {
        let action = ActionRepr::Output {
            port: PortNumber::Controller,
            max_len: 128,
        };
        let mut buf = vec![0u8; action.buffer_len()];
        action.emit(&mut buf).unwrap();
        assert_eq!(ActionRepr::parse(&buf).unwrap(), action);
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let bytes = [0xff, 0xfe, 0x00, 0x08, 0, 0, 0, 0];
        assert_eq!(ActionRepr::parse(&bytes), Err(Error::BadActionType));
    }

    #[test]
    fn experimenter_action_is_rejected() {
        let bytes = [0xff, 0xff, 0x00, 0x08, 0, 0, 0, 0];
        assert_eq!(ActionRepr::parse(&bytes), Err(Error::BadExperimenterAction));
    }
}
