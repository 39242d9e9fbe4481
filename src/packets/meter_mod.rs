//! `OFPT_METER_MOD`. The band list is kept as an opaque, length-validated tail for the same
//! reason as [`group_mod`](../group_mod/index.html)'s bucket list.

use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};

/// Meters numbered `1..=OFPM_MAX` are switch-assignable; the rest name virtual meters.
pub const OFPM_MAX: u32 = 0xffff_0000;
pub const OFPM_SLOWPATH: u32 = 0xffff_fffd;
pub const OFPM_CONTROLLER: u32 = 0xffff_fffe;
pub const OFPM_ALL: u32 = 0xffff_ffff;

enum_with_unknown! {
    pub doc enum Command(u16) {
        /// New meter.
        Add = 0,
        /// Modify specified meter.
        Modify = 1,
        /// Delete specified meter.
        Delete = 2
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Flags(pub u16);

impl Flags {
    pub const KBPS: u16 = 1 << 0;
    pub const PKTPS: u16 = 1 << 1;
    pub const BURST: u16 = 1 << 2;
    pub const STATS: u16 = 1 << 3;
    const KNOWN: u16 = Self::KBPS | Self::PKTPS | Self::BURST | Self::STATS;

    pub fn has_unknown_bits(&self) -> bool {
        self.0 & !Self::KNOWN != 0
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PacketRepr {
    pub command: Command,
    pub flags: Flags,
    pub meter_id: u32,
    pub bands: Vec<u8>,
}

mod field {
    use field::*;
    pub const COMMAND: Field = 0..2;
    pub const FLAGS: Field = 2..4;
    pub const METER_ID: Field = 4..8;
    pub const BANDS: Rest = 8..;
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < field::BANDS.start {
            return Err(Error::Exhausted);
        }
        Ok(PacketRepr {
            command: Command::from(NetworkEndian::read_u16(&buffer[field::COMMAND])),
            flags: Flags(NetworkEndian::read_u16(&buffer[field::FLAGS])),
            meter_id: NetworkEndian::read_u32(&buffer[field::METER_ID]),
            bands: buffer[field::BANDS].to_vec(),
        })
    }

    fn buffer_len(&self) -> usize {
        field::BANDS.start + self.bands.len()
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        NetworkEndian::write_u16(&mut buffer[field::COMMAND], self.command.into());
        NetworkEndian::write_u16(&mut buffer[field::FLAGS], self.flags.0);
        NetworkEndian::write_u32(&mut buffer[field::METER_ID], self.meter_id);
        buffer[field::BANDS.start..field::BANDS.start + self.bands.len()]
            .copy_from_slice(&self.bands);
        Ok(())
    }
}
