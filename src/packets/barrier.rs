//! `OFPT_BARRIER_REQUEST` / `OFPT_BARRIER_REPLY`. Both are header-only: the entire contract
//! lives in xid correlation and queue draining order, handled by the dispatch loop.

use {Repr, Result};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct PacketRepr;

impl Repr for PacketRepr {
    fn parse(_buffer: &[u8]) -> Result<Self> {
        Ok(PacketRepr)
    }

    fn buffer_len(&self) -> usize {
        0
    }

    fn emit(&self, _buffer: &mut [u8]) -> Result<()> {
        Ok(())
    }
}
