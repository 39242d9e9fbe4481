//! `OFPT_PACKET_OUT`.
//!
//! ```no_rust
//!  0                                   31
//! +--------+--------+--------+--------+
//! |              buffer_id             |
//! +--------+--------+--------+--------+
//! |              in_port               |
//! +--------+--------+--------+--------+
//! |    actions_len  |      pad        |
//! +--------+--------+--------+--------+
//! |              actions               |
//! |        (variable length)           |
//! +--------+--------+--------+--------+
//! |               data                 |
//! |        (variable length)           |
//! +--------+--------+--------+--------+
//! ```

use packets::action::{self, ActionRepr};
use port::PortNumber;
use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};

/// Sentinel value meaning "the packet data is attached", not buffered on the switch.
pub const OFP_NO_BUFFER: u32 = 0xffff_ffff;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PacketRepr {
    pub buffer_id: u32,
    pub in_port: PortNumber,
    pub actions: Vec<ActionRepr>,
    pub data: Vec<u8>,
}

mod field {
    #![allow(non_snake_case)]
    use field::*;
    pub const BUFFER_ID: Field = 0..4;
    pub const IN_PORT: Field = 4..8;
    pub const ACTIONS_LEN: Field = 8..10;
    pub const ACTIONS_AND_AFTER: Rest = 12..;

    pub fn ACTIONS(actions_len: usize) -> Field {
        ACTIONS_AND_AFTER.start..(ACTIONS_AND_AFTER.start + actions_len)
    }

    pub fn DATA(actions_len: usize) -> Rest {
        ACTIONS(actions_len).end..
    }
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < field::ACTIONS_AND_AFTER.start {
            return Err(Error::Exhausted);
        }
        let actions_len = NetworkEndian::read_u16(&buffer[field::ACTIONS_LEN]) as usize;
        if buffer.len() < field::DATA(actions_len).start {
            return Err(Error::Exhausted);
        }
        let buffer_id = NetworkEndian::read_u32(&buffer[field::BUFFER_ID]);
        let data = buffer[field::DATA(actions_len)].to_vec();
        // A buffered packet carries no data of its own: the switch already has the bytes.
        if buffer_id != OFP_NO_BUFFER && !data.is_empty() {
            return Err(Error::Malformed);
        }
        Ok(PacketRepr {
            buffer_id,
            in_port: PortNumber::from(NetworkEndian::read_u32(&buffer[field::IN_PORT])),
            actions: action::parse_list(&buffer[field::ACTIONS(actions_len)])?,
            data,
        })
    }

    fn buffer_len(&self) -> usize {
        field::ACTIONS_AND_AFTER.start + action::list_buffer_len(&self.actions) + self.data.len()
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        NetworkEndian::write_u32(&mut buffer[field::BUFFER_ID], self.buffer_id);
        NetworkEndian::write_u32(&mut buffer[field::IN_PORT], self.in_port.into());
        let actions_len = action::list_buffer_len(&self.actions) as u16;
        NetworkEndian::write_u16(&mut buffer[field::ACTIONS_LEN], actions_len);
        buffer[10..12].copy_from_slice(&[0, 0]);
        action::emit_list(&self.actions, &mut buffer[field::ACTIONS(actions_len as usize)])?;
        buffer[field::DATA(actions_len as usize)].copy_from_slice(&self.data);
        Ok(())
    }
}
