//! `OFPT_GROUP_MOD`. The bucket list is kept as an opaque, length-validated tail: decoding every
//! bucket's action list is a straightforward extension of [`action`](../action/index.html) but
//! adds no new design and is not re-derived here.

use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};

enum_with_unknown! {
    pub doc enum Command(u16) {
        /// New group.
        Add = 0,
        /// Modify all matching groups.
        Modify = 1,
        /// Delete all matching groups.
        Delete = 2
    }
}

enum_with_unknown! {
    pub doc enum GroupType(u8) {
        /// All ports in the group must forward the packet.
        All = 0,
        /// Execute one bucket, chosen by a datapath-defined algorithm.
        Select = 1,
        /// Execute the first live bucket.
        Indirect = 2,
        /// Fast failover group.
        FastFailover = 3
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PacketRepr {
    pub command: Command,
    pub group_type: GroupType,
    pub group_id: u32,
    pub buckets: Vec<u8>,
}

mod field {
    use field::*;
    pub const COMMAND: Field = 0..2;
    pub const TYPE: usize = 2;
    pub const GROUP_ID: Field = 4..8;
    pub const BUCKETS: Rest = 8..;
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < field::BUCKETS.start {
            return Err(Error::Exhausted);
        }
        Ok(PacketRepr {
            command: Command::from(NetworkEndian::read_u16(&buffer[field::COMMAND])),
            group_type: GroupType::from(buffer[field::TYPE]),
            group_id: NetworkEndian::read_u32(&buffer[field::GROUP_ID]),
            buckets: buffer[field::BUCKETS].to_vec(),
        })
    }

    fn buffer_len(&self) -> usize {
        field::BUCKETS.start + self.buckets.len()
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        NetworkEndian::write_u16(&mut buffer[field::COMMAND], self.command.into());
        buffer[field::TYPE] = self.group_type.into();
        buffer[3] = 0;
        NetworkEndian::write_u32(&mut buffer[field::GROUP_ID], self.group_id);
        buffer[field::BUCKETS.start..field::BUCKETS.start + self.buckets.len()]
            .copy_from_slice(&self.buckets);
        Ok(())
    }
}
