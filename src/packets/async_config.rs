//! `OFPT_GET_ASYNC_REPLY` / `OFPT_SET_ASYNC`: the three 2-word masks that suppress asynchronous
//! events a controller does not want to receive, indexed by role class (master/equal vs slave).

use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct PacketRepr {
    /// `[master_or_equal, slave]`
    pub packet_in_mask: [u32; 2],
    pub port_status_mask: [u32; 2],
    pub flow_removed_mask: [u32; 2],
}

mod field {
    use field::*;
    pub const PACKET_IN_MASK: Field = 0..8;
    pub const PORT_STATUS_MASK: Field = 8..16;
    pub const FLOW_REMOVED_MASK: Field = 16..24;
}

fn read_pair(buffer: &[u8]) -> [u32; 2] {
    [
        NetworkEndian::read_u32(&buffer[0..4]),
        NetworkEndian::read_u32(&buffer[4..8]),
    ]
}

fn write_pair(buffer: &mut [u8], pair: [u32; 2]) {
    NetworkEndian::write_u32(&mut buffer[0..4], pair[0]);
    NetworkEndian::write_u32(&mut buffer[4..8], pair[1]);
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < field::FLOW_REMOVED_MASK.end {
            return Err(Error::Exhausted);
        }
        Ok(PacketRepr {
            packet_in_mask: read_pair(&buffer[field::PACKET_IN_MASK]),
            port_status_mask: read_pair(&buffer[field::PORT_STATUS_MASK]),
            flow_removed_mask: read_pair(&buffer[field::FLOW_REMOVED_MASK]),
        })
    }

    fn buffer_len(&self) -> usize {
        field::FLOW_REMOVED_MASK.end
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        write_pair(&mut buffer[field::PACKET_IN_MASK], self.packet_in_mask);
        write_pair(&mut buffer[field::PORT_STATUS_MASK], self.port_status_mask);
        write_pair(&mut buffer[field::FLOW_REMOVED_MASK], self.flow_removed_mask);
        Ok(())
    }
}
