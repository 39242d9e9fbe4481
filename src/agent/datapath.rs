//! The conceptual boundary between this core and the datapath that actually owns flow tables,
//! group/meter tables, and port state. Grounded on lagopus's `ofp_*_handler.c` call-outs to
//! `lagopus_dpmgr_*` / `*_table_*` and on the `dp_dataq_put_func_register` /
//! `dp_eventq_put_func_register` registration pair.
//!
//! Every generic wire type is concretized on [`RawExperimenter`] here: the datapath boundary is
//! where this core stops caring about experimenter payloads it can't interpret and just hands
//! the raw bytes across.

use agent::error::Result;
use oxm::RawExperimenter;
use packets::{flow_mod, flow_removed, group_mod, meter_mod, multipart, packet_in, packet_out,
              port_mod, queue_get_config, table_mod};

pub type FlowMod = flow_mod::PacketRepr<RawExperimenter>;
pub type FlowRemoved = flow_removed::PacketRepr<RawExperimenter>;
pub type PacketIn = packet_in::PacketRepr<RawExperimenter>;
pub type MultipartRequest = multipart::RequestRepr<RawExperimenter>;

/// Everything a bridge's handlers need from the entity that actually owns flow/group/meter
/// tables and ports. A real deployment backs this with threads outside this crate; tests back
/// it with an in-memory fake.
pub trait Datapath: Send + Sync {
    fn flow_add(&self, dpid: u64, flow_mod: &FlowMod) -> Result<()>;
    fn flow_modify(&self, dpid: u64, flow_mod: &FlowMod) -> Result<()>;
    fn flow_delete(&self, dpid: u64, flow_mod: &FlowMod) -> Result<()>;

    fn group_add(&self, dpid: u64, group_mod: &group_mod::PacketRepr) -> Result<()>;
    fn group_modify(&self, dpid: u64, group_mod: &group_mod::PacketRepr) -> Result<()>;
    fn group_delete(&self, dpid: u64, group_mod: &group_mod::PacketRepr) -> Result<()>;

    fn meter_add(&self, dpid: u64, meter_mod: &meter_mod::PacketRepr) -> Result<()>;
    fn meter_modify(&self, dpid: u64, meter_mod: &meter_mod::PacketRepr) -> Result<()>;
    fn meter_delete(&self, dpid: u64, meter_mod: &meter_mod::PacketRepr) -> Result<()>;

    fn port_mod(&self, dpid: u64, port_mod: &port_mod::PacketRepr) -> Result<()>;
    fn table_mod(&self, dpid: u64, table_mod: &table_mod::PacketRepr) -> Result<()>;

    fn packet_out(&self, dpid: u64, packet_out: &packet_out::PacketRepr) -> Result<()>;

    fn queue_get_config(
        &self,
        dpid: u64,
        request: &queue_get_config::RequestRepr,
    ) -> Result<queue_get_config::ReplyRepr>;

    /// Fetch the datapath's static identity: `(datapath_id, n_buffers, n_tables, capabilities)`.
    fn features(&self, dpid: u64) -> Result<(u64, u32, u8, u32)>;

    /// Answer a single multipart request body, already known not to need fragmentation across
    /// this call (the handler splits the resulting bytes into REPLY_MORE-flagged chunks).
    fn multipart_stats(&self, dpid: u64, request: &MultipartRequest) -> Result<multipart::ReplyBody>;
}

/// A minimal in-memory [`Datapath`] used by handler tests: every mutating call succeeds and
/// records what it was asked to do; stats calls return zeroed/default replies.
#[cfg(test)]
pub mod fake {
    use super::*;
    use packets::multipart::{desc, ReplyBody};
    use parking_lot::Mutex;

    #[derive(Default)]
    pub struct Recorded {
        pub flow_adds: usize,
        pub flow_modifies: usize,
        pub flow_deletes: usize,
        pub group_calls: usize,
        pub meter_calls: usize,
        pub port_mods: usize,
        pub table_mods: usize,
        pub packet_outs: usize,
    }

    pub struct FakeDatapath {
        pub recorded: Mutex<Recorded>,
    }

    impl FakeDatapath {
        pub fn new() -> Self {
            FakeDatapath {
                recorded: Mutex::new(Recorded::default()),
            }
        }
    }

    impl Datapath for FakeDatapath {
        fn flow_add(&self, _dpid: u64, _flow_mod: &FlowMod) -> Result<()> {
            self.recorded.lock().flow_adds += 1;
            Ok(())
        }

        fn flow_modify(&self, _dpid: u64, _flow_mod: &FlowMod) -> Result<()> {
            self.recorded.lock().flow_modifies += 1;
            Ok(())
        }

        fn flow_delete(&self, _dpid: u64, _flow_mod: &FlowMod) -> Result<()> {
            self.recorded.lock().flow_deletes += 1;
            Ok(())
        }

        fn group_add(&self, _dpid: u64, _group_mod: &group_mod::PacketRepr) -> Result<()> {
            self.recorded.lock().group_calls += 1;
            Ok(())
        }

        fn group_modify(&self, _dpid: u64, _group_mod: &group_mod::PacketRepr) -> Result<()> {
            self.recorded.lock().group_calls += 1;
            Ok(())
        }

        fn group_delete(&self, _dpid: u64, _group_mod: &group_mod::PacketRepr) -> Result<()> {
            self.recorded.lock().group_calls += 1;
            Ok(())
        }

        fn meter_add(&self, _dpid: u64, _meter_mod: &meter_mod::PacketRepr) -> Result<()> {
            self.recorded.lock().meter_calls += 1;
            Ok(())
        }

        fn meter_modify(&self, _dpid: u64, _meter_mod: &meter_mod::PacketRepr) -> Result<()> {
            self.recorded.lock().meter_calls += 1;
            Ok(())
        }

        fn meter_delete(&self, _dpid: u64, _meter_mod: &meter_mod::PacketRepr) -> Result<()> {
            self.recorded.lock().meter_calls += 1;
            Ok(())
        }

        fn port_mod(&self, _dpid: u64, _port_mod: &port_mod::PacketRepr) -> Result<()> {
            self.recorded.lock().port_mods += 1;
            Ok(())
        }

        fn table_mod(&self, _dpid: u64, _table_mod: &table_mod::PacketRepr) -> Result<()> {
            self.recorded.lock().table_mods += 1;
            Ok(())
        }

        fn packet_out(&self, _dpid: u64, _packet_out: &packet_out::PacketRepr) -> Result<()> {
            self.recorded.lock().packet_outs += 1;
            Ok(())
        }

        fn queue_get_config(
            &self,
            _dpid: u64,
            request: &queue_get_config::RequestRepr,
        ) -> Result<queue_get_config::ReplyRepr> {
            Ok(queue_get_config::ReplyRepr {
                port: request.port,
                queues: Vec::new(),
            })
        }

        fn features(&self, _dpid: u64) -> Result<(u64, u32, u8, u32)> {
            Ok((0, 0, 1, 0))
        }

        fn multipart_stats(
            &self,
            _dpid: u64,
            _request: &MultipartRequest,
        ) -> Result<multipart::ReplyBody> {
            Ok(ReplyBody::Desc(desc::ReplyRepr {
                mfr_desc: [0; 256],
                hw_desc: [0; 256],
                sw_desc: [0; 256],
                serial_num: [0; 32],
                dp_desc: [0; 256],
            }))
        }
    }
}
