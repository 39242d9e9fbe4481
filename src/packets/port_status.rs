//! `OFPT_PORT_STATUS`, emitted asynchronously when a port's config or state changes.

use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};
use port::PortNumber;

enum_with_unknown! {
    pub doc enum Reason(u8) {
        /// Port was added.
        Add = 0,
        /// Port was removed.
        Delete = 1,
        /// Port config or state changed.
        Modify = 2
    }
}

/// `ofp_port`, embedded verbatim in the status event.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PortDesc {
    pub port_no: PortNumber,
    pub hw_addr: [u8; 6],
    pub name: [u8; 16],
    pub config: u32,
    pub state: u32,
    pub curr: u32,
    pub advertised: u32,
    pub supported: u32,
    pub peer: u32,
    pub curr_speed: u32,
    pub max_speed: u32,
}

mod desc_field {
    use field::*;
    pub const PORT_NO: Field = 0..4;
    pub const HW_ADDR: Field = 8..14;
    pub const NAME: Field = 16..32;
    pub const CONFIG: Field = 32..36;
    pub const STATE: Field = 36..40;
    pub const CURR: Field = 40..44;
    pub const ADVERTISED: Field = 44..48;
    pub const SUPPORTED: Field = 48..52;
    pub const PEER: Field = 52..56;
    pub const CURR_SPEED: Field = 56..60;
    pub const MAX_SPEED: Field = 60..64;
    pub const LEN: usize = 64;
}

impl Repr for PortDesc {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < desc_field::LEN {
            return Err(Error::Exhausted);
        }
        let mut hw_addr = [0u8; 6];
        hw_addr.copy_from_slice(&buffer[desc_field::HW_ADDR]);
        let mut name = [0u8; 16];
        name.copy_from_slice(&buffer[desc_field::NAME]);
        Ok(PortDesc {
            port_no: PortNumber::from(NetworkEndian::read_u32(&buffer[desc_field::PORT_NO])),
            hw_addr,
            name,
            config: NetworkEndian::read_u32(&buffer[desc_field::CONFIG]),
            state: NetworkEndian::read_u32(&buffer[desc_field::STATE]),
            curr: NetworkEndian::read_u32(&buffer[desc_field::CURR]),
            advertised: NetworkEndian::read_u32(&buffer[desc_field::ADVERTISED]),
            supported: NetworkEndian::read_u32(&buffer[desc_field::SUPPORTED]),
            peer: NetworkEndian::read_u32(&buffer[desc_field::PEER]),
            curr_speed: NetworkEndian::read_u32(&buffer[desc_field::CURR_SPEED]),
            max_speed: NetworkEndian::read_u32(&buffer[desc_field::MAX_SPEED]),
        })
    }

    fn buffer_len(&self) -> usize {
        desc_field::LEN
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < desc_field::LEN {
            return Err(Error::Exhausted);
        }
        for b in buffer[..desc_field::LEN].iter_mut() {
            *b = 0;
        }
        NetworkEndian::write_u32(&mut buffer[desc_field::PORT_NO], self.port_no.into());
        buffer[desc_field::HW_ADDR].copy_from_slice(&self.hw_addr);
        buffer[desc_field::NAME].copy_from_slice(&self.name);
        NetworkEndian::write_u32(&mut buffer[desc_field::CONFIG], self.config);
        NetworkEndian::write_u32(&mut buffer[desc_field::STATE], self.state);
        NetworkEndian::write_u32(&mut buffer[desc_field::CURR], self.curr);
        NetworkEndian::write_u32(&mut buffer[desc_field::ADVERTISED], self.advertised);
        NetworkEndian::write_u32(&mut buffer[desc_field::SUPPORTED], self.supported);
        NetworkEndian::write_u32(&mut buffer[desc_field::PEER], self.peer);
        NetworkEndian::write_u32(&mut buffer[desc_field::CURR_SPEED], self.curr_speed);
        NetworkEndian::write_u32(&mut buffer[desc_field::MAX_SPEED], self.max_speed);
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PacketRepr {
    pub reason: Reason,
    pub desc: PortDesc,
}

mod field {
    use field::*;
    pub const REASON: usize = 0;
    pub const DESC: Rest = 8..;
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < field::DESC.start {
            return Err(Error::Exhausted);
        }
        Ok(PacketRepr {
            reason: Reason::from(buffer[field::REASON]),
            desc: PortDesc::parse(&buffer[field::DESC])?,
        })
    }

    fn buffer_len(&self) -> usize {
        field::DESC.start + self.desc.buffer_len()
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        for b in buffer[..field::DESC.start].iter_mut() {
            *b = 0;
        }
        buffer[field::REASON] = self.reason.into();
        self.desc.emit(&mut buffer[field::DESC.start..])
    }
}
