//! `OFPT_TABLE_MOD`.

use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};

/// Wildcard table-id meaning "all tables".
pub const OFPTT_ALL: u8 = 0xff;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PacketRepr {
    pub table_id: u8,
    pub config: u32,
}

mod field {
    use field::*;
    pub const TABLE_ID: usize = 0;
    pub const CONFIG: Field = 4..8;
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < 8 {
            return Err(Error::Exhausted);
        }
        Ok(PacketRepr {
            table_id: buffer[field::TABLE_ID],
            config: NetworkEndian::read_u32(&buffer[field::CONFIG]),
        })
    }

    fn buffer_len(&self) -> usize {
        8
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < 8 {
            return Err(Error::Exhausted);
        }
        for b in buffer[..8].iter_mut() {
            *b = 0;
        }
        buffer[field::TABLE_ID] = self.table_id;
        NetworkEndian::write_u32(&mut buffer[field::CONFIG], self.config);
        Ok(())
    }
}
