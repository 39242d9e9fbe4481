//! `OFPT_FLOW_MOD`.
//!
//! ```no_rust
//!  0                                   31
//! +--------+--------+--------+--------+
//! |               cookie               |
//! |               cookie_mask          |
//! +--------+--------+--------+--------+
//! |table_id|command |idle_to |hard_to |
//! +--------+--------+--------+--------+
//! |              priority              |
//! |              buffer_id             |
//! |              out_port              |
//! |              out_group             |
//! +--------+--------+--------+--------+
//! |      flags      |      pad        |
//! +--------+--------+--------+--------+
//! |               match                |
//! |        (variable, 8 bytes aligned) |
//! +--------+--------+--------+--------+
//! |            instructions            |
//! |        (variable length)           |
//! +--------+--------+--------+--------+
//! ```

use oxm::FlowMatch;
use packets::instruction::{self, InstructionRepr};
use port::PortNumber;
use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};

enum_with_unknown! {
    pub doc enum Command(u8) {
        /// New flow.
        Add = 0,
        /// Modify all matching flows.
        Modify = 1,
        /// Modify entry strictly matching wildcards and priority.
        ModifyStrict = 2,
        /// Delete all matching flows.
        Delete = 3,
        /// Delete entry strictly matching wildcards and priority.
        DeleteStrict = 4
    }
}

/// `ofp_flow_mod_flags`. Unlike the enums in this crate, flags are a genuine bitmask: several
/// may be set at once, so there is no "unknown value" case to preserve, only unknown *bits*.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Flags(u16);

impl Flags {
    pub const SEND_FLOW_REM: u16 = 1 << 0;
    pub const CHECK_OVERLAP: u16 = 1 << 1;
    pub const RESET_COUNTS: u16 = 1 << 2;
    pub const NO_PKT_COUNTS: u16 = 1 << 3;
    pub const NO_BYT_COUNTS: u16 = 1 << 4;
    const KNOWN: u16 = Self::SEND_FLOW_REM
        | Self::CHECK_OVERLAP
        | Self::RESET_COUNTS
        | Self::NO_PKT_COUNTS
        | Self::NO_BYT_COUNTS;

    pub fn from_bits_truncate(bits: u16) -> Self {
        Flags(bits)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn contains(&self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    /// Any bit set outside the known flag set must be rejected with `OFPFMFC_BAD_FLAGS`.
    pub fn has_unknown_bits(&self) -> bool {
        self.0 & !Self::KNOWN != 0
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PacketRepr<E> {
    pub cookie: u64,
    pub cookie_mask: u64,
    pub table_id: u8,
    pub command: Command,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub priority: u16,
    pub buffer_id: u32,
    pub out_port: PortNumber,
    pub out_group: u32,
    pub flags: Flags,
    pub flow_match: FlowMatch<E>,
    pub instructions: Vec<InstructionRepr>,
}

mod field {
    #![allow(non_snake_case)]
    use field::*;
    pub const COOKIE: Field = 0..8;
    pub const COOKIE_MASK: Field = 8..16;
    pub const TABLE_ID: usize = 16;
    pub const COMMAND: usize = 17;
    pub const IDLE_TIMEOUT: Field = 18..20;
    pub const HARD_TIMEOUT: Field = 20..22;
    pub const PRIORITY: Field = 22..24;
    pub const BUFFER_ID: Field = 24..28;
    pub const OUT_PORT: Field = 28..32;
    pub const OUT_GROUP: Field = 32..36;
    pub const FLAGS: Field = 36..38;
    pub const MATCH_AND_AFTER: Rest = 40..;

    pub fn MATCH(match_len: usize) -> Field {
        MATCH_AND_AFTER.start..(MATCH_AND_AFTER.start + match_len)
    }

    pub fn INSTRUCTIONS(match_len: usize) -> Rest {
        MATCH(match_len).end..
    }
}

impl<E: Repr> Repr for PacketRepr<E> {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < field::MATCH_AND_AFTER.start {
            return Err(Error::Exhausted);
        }
        let flow_match = FlowMatch::parse(&buffer[field::MATCH_AND_AFTER])?;
        let match_len = flow_match.buffer_len();
        if buffer.len() < field::INSTRUCTIONS(match_len).start {
            return Err(Error::Exhausted);
        }
        let instructions = instruction::parse_list(&buffer[field::INSTRUCTIONS(match_len)])?;
        Ok(PacketRepr {
            cookie: NetworkEndian::read_u64(&buffer[field::COOKIE]),
            cookie_mask: NetworkEndian::read_u64(&buffer[field::COOKIE_MASK]),
            table_id: buffer[field::TABLE_ID],
            command: Command::from(buffer[field::COMMAND]),
            idle_timeout: NetworkEndian::read_u16(&buffer[field::IDLE_TIMEOUT]),
            hard_timeout: NetworkEndian::read_u16(&buffer[field::HARD_TIMEOUT]),
            priority: NetworkEndian::read_u16(&buffer[field::PRIORITY]),
            buffer_id: NetworkEndian::read_u32(&buffer[field::BUFFER_ID]),
            out_port: PortNumber::from(NetworkEndian::read_u32(&buffer[field::OUT_PORT])),
            out_group: NetworkEndian::read_u32(&buffer[field::OUT_GROUP]),
            flags: Flags::from_bits_truncate(NetworkEndian::read_u16(&buffer[field::FLAGS])),
            flow_match,
            instructions,
        })
    }

    fn buffer_len(&self) -> usize {
        field::MATCH_AND_AFTER.start + self.flow_match.buffer_len()
            + instruction::list_buffer_len(&self.instructions)
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        for b in buffer[..field::MATCH_AND_AFTER.start].iter_mut() {
            *b = 0;
        }
        NetworkEndian::write_u64(&mut buffer[field::COOKIE], self.cookie);
        NetworkEndian::write_u64(&mut buffer[field::COOKIE_MASK], self.cookie_mask);
        buffer[field::TABLE_ID] = self.table_id;
        buffer[field::COMMAND] = self.command.into();
        NetworkEndian::write_u16(&mut buffer[field::IDLE_TIMEOUT], self.idle_timeout);
        NetworkEndian::write_u16(&mut buffer[field::HARD_TIMEOUT], self.hard_timeout);
        NetworkEndian::write_u16(&mut buffer[field::PRIORITY], self.priority);
        NetworkEndian::write_u32(&mut buffer[field::BUFFER_ID], self.buffer_id);
        NetworkEndian::write_u32(&mut buffer[field::OUT_PORT], self.out_port.into());
        NetworkEndian::write_u32(&mut buffer[field::OUT_GROUP], self.out_group);
        NetworkEndian::write_u16(&mut buffer[field::FLAGS], self.flags.bits());
        let match_len = self.flow_match.buffer_len();
        self.flow_match.emit(&mut buffer[field::MATCH(match_len)])?;
        instruction::emit_list(&self.instructions, &mut buffer[field::INSTRUCTIONS(match_len)])?;
        Ok(())
    }
}
