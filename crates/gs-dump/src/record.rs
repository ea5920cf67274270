use std::io::Write;

use crate::error::Result;
use crate::format::{
    HEADER_PREFIX_SIZE, TAG_FIELD, TAG_READ_FIFO, TAG_REGISTERS, TAG_TRANSFER,
    TRANSFER_RECORD_HEADER_SIZE,
};
use crate::io::{len_u32, WriteLeExt};

/// A single decoded record of the dump stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    Transfer { index: u8, data: Vec<u8> },
    ReadFifo { size: u32 },
    /// Register snapshot taken at a vsync; always followed by [`Record::Field`].
    Registers(Vec<u8>),
    Field(u8),
}

impl Record {
    pub fn tag(&self) -> u8 {
        match self {
            Record::Transfer { .. } => TAG_TRANSFER,
            Record::ReadFifo { .. } => TAG_READ_FIFO,
            Record::Registers(_) => TAG_REGISTERS,
            Record::Field(_) => TAG_FIELD,
        }
    }

    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u8(self.tag())?;
        match self {
            Record::Transfer { index, data } => {
                w.write_u8(*index)?;
                w.write_len_prefixed_bytes_u32(data)
            }
            Record::ReadFifo { size } => w.write_u32_le(*size),
            Record::Registers(bytes) => w.write_bytes(bytes),
            Record::Field(field) => w.write_u8(*field),
        }
    }
}

/// Dump header: `crc ‖ len(freeze_data) ‖ freeze_data ‖ registers`.
pub fn encode_header(crc: u32, freeze_data: &[u8], registers: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER_PREFIX_SIZE + freeze_data.len() + registers.len());
    out.write_u32_le(crc)?;
    out.write_len_prefixed_bytes_u32(freeze_data)?;
    out.write_bytes(registers)?;
    Ok(out)
}

/// Everything of a transfer record that precedes the payload.
///
/// The payload itself is handed to the sink separately so large uploads are never copied into a
/// scratch buffer first.
pub fn transfer_prefix(index: u8, len: usize) -> Result<[u8; TRANSFER_RECORD_HEADER_SIZE]> {
    let size = len_u32(len)?.to_le_bytes();
    Ok([TAG_TRANSFER, index, size[0], size[1], size[2], size[3]])
}

pub fn read_fifo_record(size: u32) -> [u8; 5] {
    let size = size.to_le_bytes();
    [TAG_READ_FIFO, size[0], size[1], size[2], size[3]]
}

/// The register snapshot record immediately followed by the field marker.
pub fn vsync_records(field: u8, registers: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(registers.len() + 3);
    out.push(TAG_REGISTERS);
    out.extend_from_slice(registers);
    out.push(TAG_FIELD);
    out.push(field);
    out
}
