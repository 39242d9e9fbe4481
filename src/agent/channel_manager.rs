//! Two indices over live channels: `(bridge-name, controller-address) -> channel` for lookup
//! during accept/reconnect, and `dpid -> channel list` for role fan-out and generation-id
//! bookkeeping. Grounded on lagopus's `channel_mgr.c`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{self, Receiver, Sender};
use parking_lot::RwLock;

use agent::channel::Channel;
use agent::error::{AgentError, Result};
use agent::queues::ChannelQueueEntry;
use packets::role::Role;

/// Capacity of the single queue every accepted channel's inbound frames land on, read by the
/// dispatch loop's first drain step. Grounded on lagopus's `channelq`, sized generously since a
/// full queue back-pressures the channel-manager I/O thread rather than dropping frames.
pub const CHANNEL_QUEUE_CAPACITY: usize = 4096;

/// The set of channels terminating at one datapath, plus that dpid's generation-id.
pub struct ChannelList {
    pub dpid: u64,
    channels: Vec<Arc<Channel>>,
    generation_id: Option<u64>,
    next_channel_id: AtomicU64,
}

impl ChannelList {
    fn new(dpid: u64) -> Self {
        ChannelList {
            dpid,
            channels: Vec::new(),
            generation_id: None,
            next_channel_id: AtomicU64::new(1),
        }
    }

    pub fn alloc_channel_id(&self) -> u64 {
        self.next_channel_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn channels(&self) -> &[Arc<Channel>] {
        &self.channels
    }

    /// Count of channels currently holding `MASTER`. Invariant I-1 requires this to never
    /// exceed 1.
    pub fn master_count(&self) -> usize {
        self.channels
            .iter()
            .filter(|c| c.role() == Role::Master)
            .count()
    }

    /// Promote `promoted` to `MASTER`, atomically demoting every other `MASTER` in the list to
    /// `SLAVE`.
    pub fn promote_master(&self, promoted: &Arc<Channel>) {
        for channel in &self.channels {
            if Arc::ptr_eq(channel, promoted) {
                channel.set_role(Role::Master);
            } else if channel.role() == Role::Master {
                channel.set_role(Role::Slave);
            }
        }
    }

    /// Accept a new generation-id iff undefined yet, or `(i64)(new - stored) >= 0`.
    pub fn try_set_generation_id(&mut self, new: u64) -> Result<()> {
        if let Some(stored) = self.generation_id {
            let distance = (new as i64).wrapping_sub(stored as i64);
            if distance < 0 {
                return Err(AgentError::ofp(
                    ::agent::error::OfpErrorKind::RoleRequestFailedStale,
                    &[],
                ));
            }
        }
        self.generation_id = Some(new);
        Ok(())
    }

    pub fn generation_id(&self) -> Option<u64> {
        self.generation_id
    }
}

#[derive(Hash, PartialEq, Eq, Clone)]
struct EndpointKey {
    bridge_name: String,
    addr: SocketAddr,
}

/// Process-wide registry of channels, indexed both by the controller endpoint that created them
/// and by the dpid they have been bound to.
pub struct ChannelManager {
    by_endpoint: RwLock<HashMap<EndpointKey, Arc<Channel>>>,
    by_dpid: RwLock<HashMap<u64, ChannelList>>,
    channel_queue_tx: Sender<ChannelQueueEntry>,
    channel_queue_rx: Receiver<ChannelQueueEntry>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::with_channel_queue_capacity(CHANNEL_QUEUE_CAPACITY)
    }

    pub fn with_channel_queue_capacity(capacity: usize) -> Self {
        let (channel_queue_tx, channel_queue_rx) = crossbeam_channel::bounded(capacity);
        ChannelManager {
            by_endpoint: RwLock::new(HashMap::new()),
            by_dpid: RwLock::new(HashMap::new()),
            channel_queue_tx,
            channel_queue_rx,
        }
    }

    /// Non-blocking enqueue of a freshly read, still-undecoded frame. Called by the
    /// channel-manager I/O thread; back-pressures the caller with `Busy` rather than growing the
    /// queue unbounded.
    pub fn channel_queue_put(&self, entry: ChannelQueueEntry) -> Result<()> {
        self.channel_queue_tx
            .try_send(entry)
            .map_err(|_| AgentError::Busy)
    }

    /// A cloned receiving handle onto the channel queue, for the dispatch loop to wait on with
    /// `recv_timeout` as its wake signal before draining the per-bridge queues.
    pub fn channel_queue_receiver(&self) -> Receiver<ChannelQueueEntry> {
        self.channel_queue_rx.clone()
    }

    /// Register a freshly accepted channel under `bridge_name`/its controller address; it is not
    /// yet bound to a dpid (that happens once FEATURES_REQUEST completes).
    pub fn channel_create(&self, bridge_name: &str, channel: Arc<Channel>) -> Result<()> {
        let key = EndpointKey {
            bridge_name: bridge_name.to_owned(),
            addr: channel.controller_addr,
        };
        let mut by_endpoint = self.by_endpoint.write();
        if by_endpoint.contains_key(&key) {
            return Err(AgentError::AlreadyExists);
        }
        by_endpoint.insert(key, channel);
        Ok(())
    }

    pub fn channel_destroy(&self, bridge_name: &str, addr: SocketAddr) -> Result<()> {
        let key = EndpointKey {
            bridge_name: bridge_name.to_owned(),
            addr,
        };
        self.by_endpoint
            .write()
            .remove(&key)
            .map(|_| ())
            .ok_or(AgentError::NotFound)
    }

    pub fn channel_lookup(&self, bridge_name: &str, addr: SocketAddr) -> Option<Arc<Channel>> {
        let key = EndpointKey {
            bridge_name: bridge_name.to_owned(),
            addr,
        };
        self.by_endpoint.read().get(&key).cloned()
    }

    /// Bind `channel` to `dpid`'s channel list, creating the list on first reference.
    pub fn bind_dpid(&self, dpid: u64, channel: Arc<Channel>) {
        channel.set_dpid(dpid);
        let mut by_dpid = self.by_dpid.write();
        let list = by_dpid.entry(dpid).or_insert_with(|| ChannelList::new(dpid));
        if !list.channels.iter().any(|c| Arc::ptr_eq(c, &channel)) {
            list.channels.push(channel);
        }
    }

    pub fn unbind_dpid(&self, dpid: u64, channel: &Arc<Channel>) {
        if let Some(list) = self.by_dpid.write().get_mut(&dpid) {
            list.channels.retain(|c| !Arc::ptr_eq(c, channel));
        }
    }

    /// Invoke `f` for every live channel bound to `dpid`. Mirrors `channel_mgr.c`'s
    /// caller-supplied-function dpid iteration.
    pub fn dpid_iterate<F: FnMut(&Arc<Channel>)>(&self, dpid: u64, mut f: F) {
        if let Some(list) = self.by_dpid.read().get(&dpid) {
            for channel in list.channels.iter().filter(|c| c.alive()) {
                f(channel);
            }
        }
    }

    pub fn master_count(&self, dpid: u64) -> usize {
        self.by_dpid
            .read()
            .get(&dpid)
            .map(|l| l.master_count())
            .unwrap_or(0)
    }

    pub fn promote_master(&self, dpid: u64, channel: &Arc<Channel>) {
        if let Some(list) = self.by_dpid.read().get(&dpid) {
            list.promote_master(channel);
        }
    }

    pub fn generation_id_get(&self, dpid: u64) -> Option<u64> {
        self.by_dpid.read().get(&dpid).and_then(|l| l.generation_id())
    }

    pub fn generation_id_set(&self, dpid: u64, new: u64) -> Result<()> {
        let mut by_dpid = self.by_dpid.write();
        let list = by_dpid.entry(dpid).or_insert_with(|| ChannelList::new(dpid));
        list.try_set_generation_id(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent::channel::{Channel, Transport};
    use std::net::{IpAddr, Ipv4Addr};

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), port)
    }

    #[test]
    fn role_uniqueness_under_promotion() {
        let mgr = ChannelManager::new();
        let a = Channel::new(1, addr(1), Transport::Tcp4, 0, 4, 4);
        let b = Channel::new(2, addr(2), Transport::Tcp4, 0, 4, 4);
        mgr.bind_dpid(0x0abc, a.clone());
        mgr.bind_dpid(0x0abc, b.clone());

        mgr.promote_master(0x0abc, &a);
        assert_eq!(mgr.master_count(0x0abc), 1);
        assert_eq!(a.role(), Role::Master);

        mgr.promote_master(0x0abc, &b);
        assert_eq!(mgr.master_count(0x0abc), 1);
        assert_eq!(a.role(), Role::Slave);
        assert_eq!(b.role(), Role::Master);
    }

    #[test]
    fn generation_id_monotonic_per_dpid() {
        let mgr = ChannelManager::new();
        mgr.generation_id_set(1, 10).unwrap();
        mgr.generation_id_set(1, 20).unwrap();
        assert!(mgr.generation_id_set(1, 15).is_err());
        assert_eq!(mgr.generation_id_get(1), Some(20));
    }

    #[test]
    fn endpoint_index_rejects_duplicate() {
        let mgr = ChannelManager::new();
        let a = Channel::new(1, addr(1), Transport::Tcp4, 0, 4, 4);
        let b = Channel::new(2, addr(1), Transport::Tcp4, 0, 4, 4);
        mgr.channel_create("br0", a).unwrap();
        assert!(mgr.channel_create("br0", b).is_err());
    }

    #[test]
    fn channel_queue_put_then_drained_by_receiver() {
        let mgr = ChannelManager::with_channel_queue_capacity(2);
        let a = Channel::new(1, addr(1), Transport::Tcp4, 0, 4, 4);
        mgr.channel_queue_put(ChannelQueueEntry::new(a.clone(), vec![1, 2, 3]))
            .unwrap();
        let rx = mgr.channel_queue_receiver();
        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.body, vec![1, 2, 3]);
    }

    #[test]
    fn channel_queue_put_backpressures_when_full() {
        let mgr = ChannelManager::with_channel_queue_capacity(1);
        let a = Channel::new(1, addr(1), Transport::Tcp4, 0, 4, 4);
        mgr.channel_queue_put(ChannelQueueEntry::new(a.clone(), vec![0]))
            .unwrap();
        assert!(mgr
            .channel_queue_put(ChannelQueueEntry::new(a, vec![0]))
            .is_err());
    }
}
