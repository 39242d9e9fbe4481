//! `OFPT_PORT_MOD`.

use port::PortNumber;
use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PacketRepr {
    pub port: PortNumber,
    pub hw_addr: [u8; 6],
    pub config: u32,
    pub mask: u32,
    pub advertise: u32,
}

mod field {
    use field::*;
    pub const PORT: Field = 0..4;
    pub const HW_ADDR: Field = 8..14;
    pub const CONFIG: Field = 16..20;
    pub const MASK: Field = 20..24;
    pub const ADVERTISE: Field = 24..28;
    pub const END: usize = 32;
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < field::END {
            return Err(Error::Exhausted);
        }
        let mut hw_addr = [0u8; 6];
        hw_addr.copy_from_slice(&buffer[field::HW_ADDR]);
        Ok(PacketRepr {
            port: PortNumber::from(NetworkEndian::read_u32(&buffer[field::PORT])),
            hw_addr,
            config: NetworkEndian::read_u32(&buffer[field::CONFIG]),
            mask: NetworkEndian::read_u32(&buffer[field::MASK]),
            advertise: NetworkEndian::read_u32(&buffer[field::ADVERTISE]),
        })
    }

    fn buffer_len(&self) -> usize {
        field::END
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < field::END {
            return Err(Error::Exhausted);
        }
        for b in buffer[..field::END].iter_mut() {
            *b = 0;
        }
        NetworkEndian::write_u32(&mut buffer[field::PORT], self.port.into());
        buffer[field::HW_ADDR].copy_from_slice(&self.hw_addr);
        NetworkEndian::write_u32(&mut buffer[field::CONFIG], self.config);
        NetworkEndian::write_u32(&mut buffer[field::MASK], self.mask);
        NetworkEndian::write_u32(&mut buffer[field::ADVERTISE], self.advertise);
        Ok(())
    }
}
