//! `ofp_instruction_header` and the pipeline instructions carried by `FLOW_MOD`.

use {Error, Repr, Result};
use byteorder::{ByteOrder, NetworkEndian};
use packets::action::{self, ActionRepr};

enum_with_unknown! {
    pub doc enum Kind(u16) {
        /// Setup the next table in the lookup pipeline.
        GotoTable = 1,
        /// Setup the metadata field for use later in the pipeline.
        WriteMetadata = 2,
        /// Write the action(s) onto the datapath action set.
        WriteActions = 3,
        /// Applies the action(s) immediately.
        ApplyActions = 4,
        /// Clears all actions from the datapath action set.
        ClearActions = 5,
        /// Apply meter (rate limiter).
        Meter = 6,
        /// Experimenter instruction; always rejected by this agent core.
        Experimenter = 0xffff
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum InstructionRepr {
    GotoTable { table_id: u8 },
    WriteMetadata { metadata: u64, mask: u64 },
    WriteActions(Vec<ActionRepr>),
    ApplyActions(Vec<ActionRepr>),
    ClearActions,
    Meter { meter_id: u32 },
}

mod field {
    use field::*;
    pub const TYPE: Field = 0..2;
    pub const LENGTH: Field = 2..4;
    pub const BODY: Rest = 4..;
}

fn pad8(len: usize) -> usize {
    (len + 7) / 8 * 8
}

impl Repr for InstructionRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < 8 {
            return Err(Error::BadInstructionLen);
        }
        let kind = Kind::from(NetworkEndian::read_u16(&buffer[field::TYPE]));
        let len = NetworkEndian::read_u16(&buffer[field::LENGTH]) as usize;
        if len < 8 || len > buffer.len() {
            return Err(Error::BadInstructionLen);
        }
        let body = &buffer[field::BODY.start..len];
        match kind {
            Kind::GotoTable => {
                if len != 8 {
                    return Err(Error::BadInstructionLen);
                }
                Ok(InstructionRepr::GotoTable { table_id: body[0] })
            }
            Kind::WriteMetadata => {
                if len != 24 {
                    return Err(Error::BadInstructionLen);
                }
                Ok(InstructionRepr::WriteMetadata {
                    metadata: NetworkEndian::read_u64(&body[4..12]),
                    mask: NetworkEndian::read_u64(&body[12..20]),
                })
            }
            Kind::WriteActions => Ok(InstructionRepr::WriteActions(action::parse_list(&body[4..])?)),
            Kind::ApplyActions => Ok(InstructionRepr::ApplyActions(action::parse_list(&body[4..])?)),
            Kind::ClearActions => Ok(InstructionRepr::ClearActions),
            Kind::Meter => {
                if len != 8 {
                    return Err(Error::BadInstructionLen);
                }
                Ok(InstructionRepr::Meter {
                    meter_id: NetworkEndian::read_u32(&body[0..4]),
                })
            }
            Kind::Experimenter => Err(Error::UnsupportedInstruction),
            Kind::Unknown(_) => Err(Error::BadInstructionType),
        }
    }

    fn buffer_len(&self) -> usize {
        match *self {
            InstructionRepr::GotoTable { .. } => 8,
            InstructionRepr::WriteMetadata { .. } => 24,
            InstructionRepr::ClearActions => 8,
            InstructionRepr::Meter { .. } => 8,
            InstructionRepr::WriteActions(ref actions) | InstructionRepr::ApplyActions(ref actions) => {
                pad8(8 + action::list_buffer_len(actions))
            }
        }
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        let total = self.buffer_len();
        if buffer.len() < total {
            return Err(Error::Exhausted);
        }
        for b in buffer[..total].iter_mut() {
            *b = 0;
        }
        let kind = match *self {
            InstructionRepr::GotoTable { .. } => Kind::GotoTable,
            InstructionRepr::WriteMetadata { .. } => Kind::WriteMetadata,
            InstructionRepr::WriteActions(_) => Kind::WriteActions,
            InstructionRepr::ApplyActions(_) => Kind::ApplyActions,
            InstructionRepr::ClearActions => Kind::ClearActions,
            InstructionRepr::Meter { .. } => Kind::Meter,
        };
        NetworkEndian::write_u16(&mut buffer[field::TYPE], kind.into());
        NetworkEndian::write_u16(&mut buffer[field::LENGTH], total as u16);
        match *self {
            InstructionRepr::GotoTable { table_id } => buffer[4] = table_id,
            InstructionRepr::WriteMetadata { metadata, mask } => {
                NetworkEndian::write_u64(&mut buffer[8..16], metadata);
                NetworkEndian::write_u64(&mut buffer[16..24], mask);
            }
            InstructionRepr::WriteActions(ref actions) | InstructionRepr::ApplyActions(ref actions) => {
                action::emit_list(actions, &mut buffer[8..total])?;
            }
            InstructionRepr::ClearActions => {}
            InstructionRepr::Meter { meter_id } => {
                NetworkEndian::write_u32(&mut buffer[4..8], meter_id);
            }
        }
        Ok(())
    }
}

/// Parse a back-to-back list of instructions occupying the whole of `buffer`.
pub fn parse_list(buffer: &[u8]) -> Result<Vec<InstructionRepr>> {
    let mut instructions = Vec::new();
    let mut offset = 0;
    while offset < buffer.len() {
        let instruction = InstructionRepr::parse(&buffer[offset..])?;
        offset += instruction.buffer_len();
        instructions.push(instruction);
    }
    Ok(instructions)
}

pub fn list_buffer_len(instructions: &[InstructionRepr]) -> usize {
    instructions.iter().map(Repr::buffer_len).sum()
}

pub fn emit_list(instructions: &[InstructionRepr], buffer: &mut [u8]) -> Result<()> {
    let mut offset = 0;
    for instruction in instructions {
        let len = instruction.buffer_len();
        instruction.emit(&mut buffer[offset..offset + len])?;
        offset += len;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn goto_table_round_trips() {
        let instruction = InstructionRepr::GotoTable { table_id: 3 };
        let mut buf = vec![0u8; instruction.buffer_len()];
        instruction.emit(&mut buf).unwrap();
        assert_eq!(InstructionRepr::parse(&buf).unwrap(), instruction);
    }

    #[test]
    fn unknown_instruction_type_is_rejected() {
        let bytes = [0x00, 0x63, 0x00, 0x08, 0, 0, 0, 0];
        assert_eq!(InstructionRepr::parse(&bytes), Err(Error::BadInstructionType));
    }

    #[test]
    fn experimenter_instruction_is_unsupported() {
        let bytes = [0xff, 0xff, 0x00, 0x08, 0, 0, 0, 0];
        assert_eq!(
            InstructionRepr::parse(&bytes),
            Err(Error::UnsupportedInstruction)
        );
    }
}
