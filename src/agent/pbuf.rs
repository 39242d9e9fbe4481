//! Mutable byte buffer with explicit cursors, and a small per-channel recycling pool.
//!
//! Grounded on lagopus's `pbuf`: a single contiguous allocation with a read cursor (`getp`) and a
//! write cursor (`putp`), rather than the cons-list-of-segments `smoltcp` buffer shape, since
//! OpenFlow frames are read and written as one contiguous run.

use parking_lot::Mutex;
use std::sync::Arc;

/// A byte buffer with independent read (`getp`) and write (`putp`) cursor positions.
#[derive(Debug, Clone)]
pub struct Pbuf {
    data: Vec<u8>,
    getp: usize,
    putp: usize,
}

impl Pbuf {
    pub fn with_capacity(capacity: usize) -> Self {
        Pbuf {
            data: vec![0u8; capacity],
            getp: 0,
            putp: 0,
        }
    }

    /// Reset both cursors without releasing the backing allocation.
    pub fn reset(&mut self) {
        self.getp = 0;
        self.putp = 0;
    }

    /// Bytes available to read between `getp` and `putp`.
    pub fn plen(&self) -> usize {
        self.putp.saturating_sub(self.getp)
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The unread portion of the buffer.
    pub fn readable(&self) -> &[u8] {
        &self.data[self.getp..self.putp]
    }

    /// Advance `getp` by `n` bytes, consuming them.
    pub fn getp_advance(&mut self, n: usize) -> Result<(), ::Error> {
        if n > self.plen() {
            return Err(::Error::Exhausted);
        }
        self.getp += n;
        Ok(())
    }

    /// Append `bytes` at `putp`, growing the backing allocation if necessary.
    pub fn put(&mut self, bytes: &[u8]) -> Result<(), ::Error> {
        let end = self.putp + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.putp..end].copy_from_slice(bytes);
        self.putp = end;
        Ok(())
    }

    /// Pad the written region up to the next multiple of 8 bytes with zeroes.
    pub fn pad8(&mut self) {
        let padded = (self.putp + 7) / 8 * 8;
        if padded > self.data.len() {
            self.data.resize(padded, 0);
        } else {
            for b in &mut self.data[self.putp..padded] {
                *b = 0;
            }
        }
        self.putp = padded;
    }
}

/// A capped, recyclable pool of [`Pbuf`]s, borrowed per channel.
///
/// `get` returns a pbuf of at least `size` bytes, recycled from the free list when possible.
/// `unget` returns it to the pool; once the pool is at capacity, `unget` simply drops the pbuf
/// instead of growing the pool unbounded.
pub struct PbufPool {
    inner: Arc<Mutex<PbufPoolInner>>,
}

struct PbufPoolInner {
    free: Vec<Pbuf>,
    cap: usize,
}

impl PbufPool {
    pub fn new(cap: usize) -> Self {
        PbufPool {
            inner: Arc::new(Mutex::new(PbufPoolInner {
                free: Vec::with_capacity(cap),
                cap,
            })),
        }
    }

    pub fn get(&self, size: usize) -> Pbuf {
        let mut inner = self.inner.lock();
        if let Some(pos) = inner.free.iter().position(|p| p.capacity() >= size) {
            let mut pbuf = inner.free.swap_remove(pos);
            pbuf.reset();
            pbuf
        } else {
            Pbuf::with_capacity(size)
        }
    }

    pub fn unget(&self, mut pbuf: Pbuf) {
        let mut inner = self.inner.lock();
        if inner.free.len() < inner.cap {
            pbuf.reset();
            inner.free.push(pbuf);
        }
        // Beyond the cap, `pbuf` is simply dropped here, freeing its allocation.
    }

    pub fn len(&self) -> usize {
        self.inner.lock().free.len()
    }
}

impl Clone for PbufPool {
    fn clone(&self) -> Self {
        PbufPool {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_recycles_and_caps() {
        let pool = PbufPool::new(2);
        let a = pool.get(128);
        let b = pool.get(128);
        let c = pool.get(128);
        pool.unget(a);
        pool.unget(b);
        pool.unget(c); // pool is at cap, this one is simply dropped
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn put_and_pad_track_putp() {
        let mut pbuf = Pbuf::with_capacity(0);
        pbuf.put(&[1, 2, 3]).unwrap();
        assert_eq!(pbuf.plen(), 3);
        pbuf.pad8();
        assert_eq!(pbuf.putp, 8);
    }
}
