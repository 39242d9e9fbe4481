//! The switch-side agent core: channel and bridge bookkeeping, role gating, per-message
//! handlers, the single dispatch loop, and the façade that starts and stops all of it.
//!
//! Grounded on lagopus's `src/agent` directory: `channel`/`channel_mgr` own the controller
//! sessions, `bridgeq_mgr` owns the per-datapath queues a dispatch thread drains, `ofp_role`
//! gates who may write what, and a single cooperative loop (here, [`dispatch`]) is the only
//! thread that ever touches a channel's read half or a bridge queue's receive end.

pub mod bridgeq;
pub mod channel;
pub mod channel_manager;
pub mod datapath;
pub mod dispatch;
pub mod error;
pub mod facade;
pub mod handlers;
pub mod pbuf;
pub mod queues;
pub mod role;

pub use self::bridgeq::{BridgeInfo, BridgeQueue, BridgeQueueManager, QueueInfo};
pub use self::channel::{AsyncMask, AsyncSlotMask, Channel, Transport};
pub use self::channel_manager::ChannelManager;
pub use self::datapath::Datapath;
pub use self::error::{AgentError, OfpErrorKind, Result};
pub use self::facade::{Agent, AgentBuilder, ShutdownGrade};
