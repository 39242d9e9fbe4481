//! `OFPT_FLOW_REMOVED`, emitted asynchronously by the datapath when a flow entry expires or is
//! evicted.

use oxm::FlowMatch;
use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};

enum_with_unknown! {
    pub doc enum Reason(u8) {
        /// Flow idle time exceeded idle_timeout.
        IdleTimeout = 0,
        /// Time exceeded hard_timeout.
        HardTimeout = 1,
        /// Evicted by a DELETE flow mod.
        Delete = 2,
        /// Group was removed.
        GroupDelete = 3
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PacketRepr<E> {
    pub cookie: u64,
    pub priority: u16,
    pub reason: Reason,
    pub table_id: u8,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub packet_count: u64,
    pub byte_count: u64,
    pub flow_match: FlowMatch<E>,
}

mod field {
    #![allow(non_snake_case)]
    use field::*;
    pub const COOKIE: Field = 0..8;
    pub const PRIORITY: Field = 8..10;
    pub const REASON: usize = 10;
    pub const TABLE_ID: usize = 11;
    pub const DURATION_SEC: Field = 12..16;
    pub const DURATION_NSEC: Field = 16..20;
    pub const IDLE_TIMEOUT: Field = 20..22;
    pub const HARD_TIMEOUT: Field = 22..24;
    pub const PACKET_COUNT: Field = 24..32;
    pub const BYTE_COUNT: Field = 32..40;
    pub const MATCH_AND_AFTER: Rest = 40..;
}

impl<E: Repr> Repr for PacketRepr<E> {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < field::MATCH_AND_AFTER.start {
            return Err(Error::Exhausted);
        }
        Ok(PacketRepr {
            cookie: NetworkEndian::read_u64(&buffer[field::COOKIE]),
            priority: NetworkEndian::read_u16(&buffer[field::PRIORITY]),
            reason: Reason::from(buffer[field::REASON]),
            table_id: buffer[field::TABLE_ID],
            duration_sec: NetworkEndian::read_u32(&buffer[field::DURATION_SEC]),
            duration_nsec: NetworkEndian::read_u32(&buffer[field::DURATION_NSEC]),
            idle_timeout: NetworkEndian::read_u16(&buffer[field::IDLE_TIMEOUT]),
            hard_timeout: NetworkEndian::read_u16(&buffer[field::HARD_TIMEOUT]),
            packet_count: NetworkEndian::read_u64(&buffer[field::PACKET_COUNT]),
            byte_count: NetworkEndian::read_u64(&buffer[field::BYTE_COUNT]),
            flow_match: FlowMatch::parse(&buffer[field::MATCH_AND_AFTER])?,
        })
    }

    fn buffer_len(&self) -> usize {
        field::MATCH_AND_AFTER.start + self.flow_match.buffer_len()
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        NetworkEndian::write_u64(&mut buffer[field::COOKIE], self.cookie);
        NetworkEndian::write_u16(&mut buffer[field::PRIORITY], self.priority);
        buffer[field::REASON] = self.reason.into();
        buffer[field::TABLE_ID] = self.table_id;
        NetworkEndian::write_u32(&mut buffer[field::DURATION_SEC], self.duration_sec);
        NetworkEndian::write_u32(&mut buffer[field::DURATION_NSEC], self.duration_nsec);
        NetworkEndian::write_u16(&mut buffer[field::IDLE_TIMEOUT], self.idle_timeout);
        NetworkEndian::write_u16(&mut buffer[field::HARD_TIMEOUT], self.hard_timeout);
        NetworkEndian::write_u64(&mut buffer[field::PACKET_COUNT], self.packet_count);
        NetworkEndian::write_u64(&mut buffer[field::BYTE_COUNT], self.byte_count);
        self.flow_match.emit(&mut buffer[field::MATCH_AND_AFTER.start..])
    }
}
