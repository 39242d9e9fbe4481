//! `OFPT_ROLE_REQUEST` / `OFPT_ROLE_REPLY`.
//!
//! ```no_rust
//!  0                                   31
//! +--------+--------+--------+--------+
//! |                role                |
//! +--------+--------+--------+--------+
//! |                 pad                |
//! +--------+--------+--------+--------+
//! |           generation_id            |
//! |           (64 bits)                |
//! +--------+--------+--------+--------+
//! ```

use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};

enum_with_unknown! {
    pub doc enum Role(u32) {
        /// No change to the controller's role.
        NoChange = 0,
        /// Default, symmetric role.
        Equal = 1,
        /// Full access, at most one per datapath.
        Master = 2,
        /// Read-only access.
        Slave = 3
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PacketRepr {
    pub role: Role,
    pub generation_id: u64,
}

mod field {
    use field::*;
    pub const ROLE: Field = 0..4;
    pub const GENERATION_ID: Field = 8..16;
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < field::GENERATION_ID.end {
            return Err(Error::Exhausted);
        }
        Ok(PacketRepr {
            role: Role::from(NetworkEndian::read_u32(&buffer[field::ROLE])),
            generation_id: NetworkEndian::read_u64(&buffer[field::GENERATION_ID]),
        })
    }

    fn buffer_len(&self) -> usize {
        field::GENERATION_ID.end
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        for b in buffer[..self.buffer_len()].iter_mut() {
            *b = 0;
        }
        NetworkEndian::write_u32(&mut buffer[field::ROLE], self.role.into());
        NetworkEndian::write_u64(&mut buffer[field::GENERATION_ID], self.generation_id);
        Ok(())
    }
}
