//! Agent lifecycle (C9): compose the channel manager, bridge-queue manager, and dispatch loop
//! behind `start`/`shutdown`/`stop`/`finalize`, the way lagopus's `agent.c` sequences the
//! handler thread and its global status variable.
//!
//! The channel-manager I/O thread described in the design (transport accept/read, enqueueing raw
//! frames) lives outside this crate: `Channel` here models a session's bookkeeping and write
//! queue, not a live socket, so whatever owns the real transport is responsible for calling
//! [`ChannelManager::channel_queue_put`] as bytes arrive. `Agent::start` owns only the dispatch
//! thread, the one piece of the three-thread model this crate can run end to end.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use agent::bridgeq::BridgeQueueManager;
use agent::channel_manager::ChannelManager;
use agent::datapath::Datapath;
use agent::dispatch::{self, DispatchLimits};

/// Raw status values, shared between `StatusHandle`'s atomic storage and the dispatch loop's
/// match arms. Kept as plain `u8` constants (rather than an enum behind a mutex, as the design
/// describes) since a single `AtomicU8` gives the loop a wait-free read at the top of every
/// iteration instead of a lock it would have to acquire on every pass.
pub mod status {
    pub const RUNNING: u8 = 0;
    pub const SHUTDOWN_GRACEFULLY: u8 = 1;
    pub const SHUTDOWN_RIGHT_NOW: u8 = 2;
    pub const SHUTDOWNED: u8 = 3;
}

/// How thoroughly a shutdown must behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownGrade {
    /// Stop accepting new channel-queue entries, drain what is already queued, then tear down.
    Graceful,
    /// Cancel outstanding polls and stop immediately, abandoning anything still queued.
    RightNow,
}

/// Shared handle onto the global run status, cheap to clone into the dispatch thread.
#[derive(Clone)]
pub struct StatusHandle(Arc<AtomicU8>);

impl StatusHandle {
    pub fn new() -> Self {
        StatusHandle(Arc::new(AtomicU8::new(status::RUNNING)))
    }

    pub fn get(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, value: u8) {
        self.0.store(value, Ordering::Release);
    }
}

impl Default for StatusHandle {
    fn default() -> Self {
        StatusHandle::new()
    }
}

/// A running agent core: the channel and bridge-queue registries, and the dispatch thread reading
/// from them. Dropping this without calling [`Agent::finalize`] leaves the dispatch thread
/// detached; it still observes a later `shutdown` call correctly, since `status` is shared.
pub struct Agent {
    pub channel_manager: Arc<ChannelManager>,
    pub bridgeqs: Arc<BridgeQueueManager>,
    status: StatusHandle,
    dispatch_thread: Option<JoinHandle<()>>,
}

pub struct AgentBuilder {
    limits: DispatchLimits,
}

impl AgentBuilder {
    pub fn new() -> Self {
        AgentBuilder {
            limits: DispatchLimits::default(),
        }
    }

    pub fn limits(mut self, limits: DispatchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Build the registries and start the dispatch thread against `datapath`.
    pub fn start<D: Datapath + 'static>(self, datapath: Arc<D>) -> Agent {
        let channel_manager = Arc::new(ChannelManager::new());
        let bridgeqs = Arc::new(BridgeQueueManager::new());
        Agent::start_with(channel_manager, bridgeqs, datapath, self.limits)
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        AgentBuilder::new()
    }
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Start the dispatch thread over already-constructed registries, for callers that need to
    /// register bridges or bind channels before traffic starts flowing.
    pub fn start_with<D: Datapath + 'static>(
        channel_manager: Arc<ChannelManager>,
        bridgeqs: Arc<BridgeQueueManager>,
        datapath: Arc<D>,
        limits: DispatchLimits,
    ) -> Agent {
        let status = StatusHandle::new();

        let thread_manager = channel_manager.clone();
        let thread_bridgeqs = bridgeqs.clone();
        let thread_status = status.clone();
        let dispatch_thread = thread::Builder::new()
            .name("ofp-agent-dispatch".into())
            .spawn(move || {
                dispatch::run(
                    &thread_manager,
                    &thread_bridgeqs,
                    &*datapath,
                    &thread_status,
                    limits,
                );
            })
            .expect("spawning the dispatch thread");

        Agent {
            channel_manager,
            bridgeqs,
            status,
            dispatch_thread: Some(dispatch_thread),
        }
    }

    /// Request a shutdown of the given grade. Does not block; call [`Agent::finalize`] to wait
    /// for the dispatch thread to actually exit.
    pub fn shutdown(&self, grade: ShutdownGrade) {
        let target = match grade {
            ShutdownGrade::Graceful => status::SHUTDOWN_GRACEFULLY,
            ShutdownGrade::RightNow => status::SHUTDOWN_RIGHT_NOW,
        };
        self.status.set(target);
    }

    /// Cancel every live channel immediately. Equivalent to a right-now shutdown from the
    /// dispatch loop's perspective; socket teardown itself is the transport owner's job.
    pub fn stop(&self) {
        self.shutdown(ShutdownGrade::RightNow);
    }

    pub fn status(&self) -> u8 {
        self.status.get()
    }

    /// Block until the dispatch thread has observed shutdown and exited.
    pub fn finalize(mut self) {
        if let Some(handle) = self.dispatch_thread.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent::datapath::fake::FakeDatapath;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn right_now_shutdown_reaches_shutdowned() {
        let agent = Agent::builder().start(Arc::new(FakeDatapath::new()));
        sleep(Duration::from_millis(10));
        agent.shutdown(ShutdownGrade::RightNow);
        agent.finalize();
    }

    #[test]
    fn stop_is_observable_through_status() {
        let agent = Agent::builder().start(Arc::new(FakeDatapath::new()));
        agent.stop();
        // status transitions asynchronously; give the dispatch thread a moment to observe it.
        sleep(Duration::from_millis(200));
        agent.finalize();
    }
}
