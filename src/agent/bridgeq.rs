//! Per-bridge queue quadruple and the manager that registers/looks up bridges by dpid.
//!
//! Grounded on lagopus's `bridgeq_mgr.c`: a registry guarded by a coarse lock, a read-mostly
//! snapshot array the dispatch loop walks without per-bridge locking, and refcounted entries that
//! a busy (`refcount > 1`) `free` leaves alive unless `force` is set.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use agent::error::{AgentError, Result};

/// Hard cap on simultaneously registered bridges.
pub const MAX_BRIDGES: usize = 256;
/// Hard cap on poll handles a single `polls_get` call may return.
pub const MAX_POLLS: usize = 1024;
/// Hard cap on poll handles a single `dp_polls_get` call may return.
pub const MAX_DP_POLLS: usize = 1024;

/// Per-bridge queue capacities and batch limits, supplied at `register` time.
#[derive(Debug, Clone, Copy)]
pub struct QueueInfo {
    pub data_q_capacity: usize,
    pub event_q_capacity: usize,
    pub event_data_q_capacity: usize,
    pub data_q_max_batches: usize,
    pub event_q_max_batches: usize,
    pub event_data_q_max_batches: usize,
}

/// Static, rarely-changing bridge attributes.
#[derive(Debug, Clone)]
pub struct BridgeInfo {
    pub name: String,
}

struct BridgeQueueInner {
    info: BridgeInfo,
    data_q_max_batches: AtomicUsize,
    event_q_max_batches: AtomicUsize,
    event_data_q_max_batches: AtomicUsize,
    refcount: AtomicUsize,
}

/// One bridge's three queues: data-q carries PACKET_IN-bound frames up from the datapath,
/// event-q carries async events (PORT_STATUS, FLOW_REMOVED, errors) up, event-data-q carries
/// commands down to the datapath.
pub struct BridgeQueue {
    pub dpid: u64,
    inner: Mutex<BridgeQueueInner>,
    data_q: (Sender<Vec<u8>>, Receiver<Vec<u8>>),
    event_q: (Sender<Vec<u8>>, Receiver<Vec<u8>>),
    event_data_q: (Sender<Vec<u8>>, Receiver<Vec<u8>>),
}

impl BridgeQueue {
    fn new(dpid: u64, info: BridgeInfo, q_info: QueueInfo) -> Arc<BridgeQueue> {
        Arc::new(BridgeQueue {
            dpid,
            inner: Mutex::new(BridgeQueueInner {
                info,
                data_q_max_batches: AtomicUsize::new(q_info.data_q_max_batches),
                event_q_max_batches: AtomicUsize::new(q_info.event_q_max_batches),
                event_data_q_max_batches: AtomicUsize::new(q_info.event_data_q_max_batches),
                refcount: AtomicUsize::new(1),
            }),
            data_q: crossbeam_channel::bounded(q_info.data_q_capacity),
            event_q: crossbeam_channel::bounded(q_info.event_q_capacity),
            event_data_q: crossbeam_channel::bounded(q_info.event_data_q_capacity),
        })
    }

    pub fn name(&self) -> String {
        self.inner.lock().info.name.clone()
    }

    pub fn refcount(&self) -> usize {
        self.inner.lock().refcount.load(Ordering::Acquire)
    }

    fn refget(&self) {
        self.inner.lock().refcount.fetch_add(1, Ordering::AcqRel);
    }

    fn refput(&self) -> usize {
        self.inner.lock().refcount.fetch_sub(1, Ordering::AcqRel) - 1
    }

    pub fn data_q_max_batches(&self) -> usize {
        self.inner.lock().data_q_max_batches.load(Ordering::Acquire)
    }

    pub fn set_data_q_max_batches(&self, n: usize) {
        self.inner.lock().data_q_max_batches.store(n, Ordering::Release);
    }

    pub fn event_q_max_batches(&self) -> usize {
        self.inner.lock().event_q_max_batches.load(Ordering::Acquire)
    }

    pub fn set_event_q_max_batches(&self, n: usize) {
        self.inner.lock().event_q_max_batches.store(n, Ordering::Release);
    }

    pub fn event_data_q_max_batches(&self) -> usize {
        self.inner
            .lock()
            .event_data_q_max_batches
            .load(Ordering::Acquire)
    }

    pub fn set_event_data_q_max_batches(&self, n: usize) {
        self.inner
            .lock()
            .event_data_q_max_batches
            .store(n, Ordering::Release);
    }

    pub fn data_q_put(&self, frame: Vec<u8>) -> Result<()> {
        self.data_q.0.try_send(frame).map_err(|_| AgentError::Busy)
    }

    pub fn data_q_drain<F: FnMut(Vec<u8>)>(&self, max_batches: usize, mut f: F) {
        for _ in 0..max_batches {
            match self.data_q.1.try_recv() {
                Ok(frame) => f(frame),
                Err(_) => break,
            }
        }
    }

    pub fn event_q_put(&self, frame: Vec<u8>) -> Result<()> {
        self.event_q.0.try_send(frame).map_err(|_| AgentError::Busy)
    }

    pub fn event_q_drain<F: FnMut(Vec<u8>)>(&self, max_batches: usize, mut f: F) {
        for _ in 0..max_batches {
            match self.event_q.1.try_recv() {
                Ok(frame) => f(frame),
                Err(_) => break,
            }
        }
    }

    pub fn event_data_q_put(&self, frame: Vec<u8>) -> Result<()> {
        self.event_data_q
            .0
            .try_send(frame)
            .map_err(|_| AgentError::Busy)
    }

    pub fn event_data_q_drain<F: FnMut(Vec<u8>)>(&self, max_batches: usize, mut f: F) {
        for _ in 0..max_batches {
            match self.event_data_q.1.try_recv() {
                Ok(frame) => f(frame),
                Err(_) => break,
            }
        }
    }

    /// A stable `mio::Token` for this bridge's data-q, derived from its dpid. The dispatch loop's
    /// poll set only ever needs to tell queues apart, not back a real `Evented` source, since
    /// readiness here is driven by `try_recv` rather than a registered fd.
    pub fn data_q_token(&self) -> mio::Token {
        mio::Token((self.dpid as usize).wrapping_mul(3))
    }

    pub fn event_q_token(&self) -> mio::Token {
        mio::Token((self.dpid as usize).wrapping_mul(3) + 1)
    }

    pub fn event_data_q_token(&self) -> mio::Token {
        mio::Token((self.dpid as usize).wrapping_mul(3) + 2)
    }
}

/// Registry of bridge queue quadruples, keyed by dpid, plus a read-mostly snapshot the dispatch
/// loop consumes without per-bridge locking.
pub struct BridgeQueueManager {
    registry: Mutex<HashMap<u64, Arc<BridgeQueue>>>,
}

impl BridgeQueueManager {
    pub fn new() -> Self {
        BridgeQueueManager {
            registry: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, dpid: u64, info: BridgeInfo, q_info: QueueInfo) -> Result<()> {
        let mut registry = self.registry.lock();
        if registry.contains_key(&dpid) {
            return Err(AgentError::AlreadyExists);
        }
        if registry.len() >= MAX_BRIDGES {
            return Err(AgentError::OutOfRange);
        }
        registry.insert(dpid, BridgeQueue::new(dpid, info, q_info));
        Ok(())
    }

    /// Remove `dpid` from the registry. The entry itself stays alive as long as something still
    /// holds a reference from an earlier `lookup`/`bridgeqs_to_array`; it is simply no longer
    /// discoverable or included in future snapshots.
    pub fn unregister(&self, dpid: u64) -> Result<()> {
        self.registry
            .lock()
            .remove(&dpid)
            .map(|bq| {
                bq.refput();
            })
            .ok_or(AgentError::NotFound)
    }

    /// Increment refcount and return the bridge queue for `dpid`. Callers must release with
    /// [`BridgeQueueManager::bridgeq_free`].
    pub fn lookup(&self, dpid: u64) -> Result<Arc<BridgeQueue>> {
        let registry = self.registry.lock();
        let bq = registry.get(&dpid).ok_or(AgentError::NotFound)?;
        bq.refget();
        Ok(bq.clone())
    }

    /// Release a reference obtained from `lookup` or a snapshot. With `force` clear, a bridge
    /// queue still referenced elsewhere (`refcount > 1` after this release) is left registered
    /// and alive; only `force` tears it down regardless of outstanding references.
    pub fn bridgeq_free(&self, bq: Arc<BridgeQueue>, force: bool) {
        let remaining = bq.refput();
        if remaining > 0 && !force {
            return;
        }
        self.registry.lock().remove(&bq.dpid);
    }

    /// Snapshot every registered bridge queue, bumping each one's refcount. Counterpart to
    /// `bridgeqs_free`.
    pub fn bridgeqs_to_array(&self) -> Vec<Arc<BridgeQueue>> {
        let registry = self.registry.lock();
        registry
            .values()
            .map(|bq| {
                bq.refget();
                bq.clone()
            })
            .collect()
    }

    pub fn bridgeqs_free(&self, snapshot: Vec<Arc<BridgeQueue>>, force: bool) {
        for bq in snapshot {
            self.bridgeq_free(bq, force);
        }
    }

    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    /// Copy up-poll tokens (data-q/event-q readers the dispatch loop must watch) for every
    /// registered bridge into `out`, failing `OUT_OF_RANGE` rather than silently truncating.
    pub fn polls_get(&self, out: &mut Vec<mio::Token>) -> Result<usize> {
        let registry = self.registry.lock();
        let mut count = 0;
        for bq in registry.values() {
            for token in [bq.data_q_token(), bq.event_q_token()] {
                if count >= MAX_POLLS {
                    return Err(AgentError::OutOfRange);
                }
                out.push(token);
                count += 1;
            }
        }
        Ok(count)
    }

    /// Same as [`BridgeQueueManager::polls_get`] for the downward event-data-q, capped at
    /// `MAX_DP_POLLS`.
    pub fn dp_polls_get(&self, out: &mut Vec<mio::Token>) -> Result<usize> {
        let registry = self.registry.lock();
        let mut count = 0;
        for bq in registry.values() {
            if count >= MAX_DP_POLLS {
                return Err(AgentError::OutOfRange);
            }
            out.push(bq.event_data_q_token());
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q_info() -> QueueInfo {
        QueueInfo {
            data_q_capacity: 8,
            event_q_capacity: 8,
            event_data_q_capacity: 8,
            data_q_max_batches: 4,
            event_q_max_batches: 4,
            event_data_q_max_batches: 4,
        }
    }

    #[test]
    fn register_rejects_duplicate_dpid() {
        let mgr = BridgeQueueManager::new();
        mgr.register(1, BridgeInfo { name: "br0".into() }, q_info())
            .unwrap();
        assert!(mgr
            .register(1, BridgeInfo { name: "br0".into() }, q_info())
            .is_err());
    }

    #[test]
    fn busy_free_without_force_keeps_entry_alive() {
        let mgr = BridgeQueueManager::new();
        mgr.register(1, BridgeInfo { name: "br0".into() }, q_info())
            .unwrap();
        let held = mgr.lookup(1).unwrap();
        assert_eq!(held.refcount(), 2);

        mgr.bridgeq_free(held.clone(), false);
        assert_eq!(mgr.len(), 1);
        assert!(mgr.lookup(1).is_ok());
    }

    #[test]
    fn force_free_tears_down_despite_refs() {
        let mgr = BridgeQueueManager::new();
        mgr.register(1, BridgeInfo { name: "br0".into() }, q_info())
            .unwrap();
        let held = mgr.lookup(1).unwrap();
        mgr.bridgeq_free(held, true);
        assert_eq!(mgr.len(), 0);
    }

    #[test]
    fn data_q_respects_max_batches() {
        let mgr = BridgeQueueManager::new();
        mgr.register(1, BridgeInfo { name: "br0".into() }, q_info())
            .unwrap();
        let bq = mgr.lookup(1).unwrap();
        for i in 0..6u8 {
            bq.data_q_put(vec![i]).unwrap();
        }
        let mut drained = Vec::new();
        bq.data_q_drain(bq.data_q_max_batches(), |f| drained.push(f));
        assert_eq!(drained.len(), 4);
    }
}
