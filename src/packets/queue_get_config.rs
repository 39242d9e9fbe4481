//! `OFPT_QUEUE_GET_CONFIG_REQUEST` / `_REPLY`.
//!
//! The reply's `queues` list is an `ofp_packet_queue` sequence; this crate treats it as an
//! opaque, already length-validated byte run produced by the datapath rather than modelling
//! every per-queue property (min/max-rate, experimenter properties, ...).

use port::PortNumber;
use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RequestRepr {
    pub port: PortNumber,
}

mod field {
    use field::*;
    pub const PORT: Field = 0..4;
}

impl Repr for RequestRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < 8 {
            return Err(Error::Exhausted);
        }
        Ok(RequestRepr {
            port: PortNumber::from(NetworkEndian::read_u32(&buffer[field::PORT])),
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
        NetworkEndian::write_u32(&mut buffer[field::PORT], self.port.into());
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ReplyRepr {
    pub port: PortNumber,
    pub queues: Vec<u8>,
}

impl Repr for ReplyRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < 8 {
            return Err(Error::Exhausted);
        }
        Ok(ReplyRepr {
            port: PortNumber::from(NetworkEndian::read_u32(&buffer[field::PORT])),
            queues: buffer[8..].to_vec(),
        })
    }

    fn buffer_len(&self) -> usize {
        8 + self.queues.len()
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        for b in buffer[..8].iter_mut() {
            *b = 0;
        }
        NetworkEndian::write_u32(&mut buffer[field::PORT], self.port.into());
        buffer[8..8 + self.queues.len()].copy_from_slice(&self.queues);
        Ok(())
    }
}
