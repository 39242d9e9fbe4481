//! Ambient configuration: the capacities and batch limits every other module takes as
//! constructor arguments, collected in one place with sane defaults. Not a CLI or file-format
//! loader — deployments wire an `AgentConfig` together however they read their own settings.

use std::time::Duration;

use agent::bridgeq::QueueInfo;
use agent::dispatch::DispatchLimits;

/// Per-channel pbuf pool and write-queue sizing, passed to `Channel::new`.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    pub pbuf_pool_capacity: usize,
    pub write_queue_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            pbuf_pool_capacity: 16,
            write_queue_capacity: 256,
        }
    }
}

/// Top-level knobs for one agent core instance.
#[derive(Debug, Clone, Copy)]
pub struct AgentConfig {
    pub channel: ChannelConfig,
    pub bridge_queues: QueueInfo,
    pub channel_queue_capacity: usize,
    pub dispatch: DispatchLimits,
    pub muxer_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            channel: ChannelConfig::default(),
            bridge_queues: QueueInfo {
                data_q_capacity: 1024,
                event_q_capacity: 256,
                event_data_q_capacity: 256,
                data_q_max_batches: 64,
                event_q_max_batches: 32,
                event_data_q_max_batches: 32,
            },
            channel_queue_capacity: ::agent::channel_manager::CHANNEL_QUEUE_CAPACITY,
            dispatch: DispatchLimits::default(),
            muxer_timeout: ::agent::dispatch::MUXER_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let cfg = AgentConfig::default();
        assert!(cfg.bridge_queues.data_q_max_batches <= cfg.bridge_queues.data_q_capacity);
        assert!(cfg.channel_queue_capacity > 0);
    }
}
