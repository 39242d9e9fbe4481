//! Wire-format bodies for every OpenFlow 1.3 message the agent core terminates or emits.
//!
//! Each submodule follows the same shape as [`openflow`](openflow/index.html) itself: a
//! zero-copy `Packet<T>` field accessor over a raw buffer, and a `PacketRepr` that owns decoded
//! values and implements [`Repr`](../trait.Repr.html).

pub mod openflow;
pub mod error;
pub mod features_reply;
pub mod get_config_reply;
pub mod hello;
pub mod packet_in;
pub mod packet_out;
pub mod action;
pub mod instruction;
pub mod flow_mod;
pub mod flow_removed;
pub mod port_status;
pub mod group_mod;
pub mod meter_mod;
pub mod port_mod;
pub mod table_mod;
pub mod barrier;
pub mod role;
pub mod async_config;
pub mod queue_get_config;
pub mod multipart;

/// `OFPT_SET_CONFIG` and `OFPT_GET_CONFIG_REPLY` carry the exact same `ofp_switch_config`
/// body on the wire, so the codec is shared rather than duplicated.
pub use self::get_config_reply as set_config;
