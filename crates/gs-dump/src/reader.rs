use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use lz4_flex::frame::FrameDecoder;

use crate::error::{DumpError, Result};
use crate::format::{DumpFormat, TAG_FIELD, TAG_READ_FIFO, TAG_REGISTERS, TAG_TRANSFER};
use crate::io::ReadLeExt;
use crate::record::Record;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DumpHeader {
    pub crc: u32,
    pub freeze_data: Vec<u8>,
    pub registers: Vec<u8>,
}

/// Sequential decoder for the uncompressed record stream.
///
/// The register snapshot size is not stored in the dump, so the caller has to supply it.
pub struct DumpReader<R> {
    reader: R,
    header: DumpHeader,
    register_len: usize,
    failed: bool,
}

impl<R: Read> DumpReader<R> {
    pub fn new(mut reader: R, register_len: usize) -> Result<Self> {
        let crc = reader.read_u32_le()?;
        let freeze_len = reader.read_u32_le()? as usize;
        let freeze_data = reader.read_exact_vec(freeze_len)?;
        let registers = reader.read_exact_vec(register_len)?;
        Ok(Self {
            reader,
            header: DumpHeader {
                crc,
                freeze_data,
                registers,
            },
            register_len,
            failed: false,
        })
    }

    pub fn header(&self) -> &DumpHeader {
        &self.header
    }

    /// Decode the next record, or `None` at a clean end of stream.
    ///
    /// A stream that ends inside a record is reported as an `UnexpectedEof` I/O error.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let Some(tag) = self.reader.read_u8_or_eof()? else {
            return Ok(None);
        };
        let record = match tag {
            TAG_TRANSFER => {
                let index = self.reader.read_u8()?;
                let size = self.reader.read_u32_le()? as usize;
                let data = self.reader.read_exact_vec(size)?;
                Record::Transfer { index, data }
            }
            TAG_FIELD => Record::Field(self.reader.read_u8()?),
            TAG_READ_FIFO => Record::ReadFifo {
                size: self.reader.read_u32_le()?,
            },
            TAG_REGISTERS => Record::Registers(self.reader.read_exact_vec(self.register_len)?),
            other => return Err(DumpError::UnknownRecordTag(other)),
        };
        Ok(Some(record))
    }
}

impl<R: Read> Iterator for DumpReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.next_record().transpose();
        if matches!(next, Some(Err(_))) {
            self.failed = true;
        }
        next
    }
}

/// Open a dump file, decompressing it on the fly when the name ends in `.gs.lz4`.
///
/// Files with any other name are read as raw dumps.
pub fn open_dump(
    path: impl AsRef<Path>,
    register_len: usize,
) -> Result<DumpReader<Box<dyn Read>>> {
    let path = path.as_ref();
    let format = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(DumpFormat::from_file_name)
        .unwrap_or(DumpFormat::Raw);

    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = match format {
        DumpFormat::Raw => Box::new(file),
        DumpFormat::Lz4 => Box::new(FrameDecoder::new(file)),
    };
    DumpReader::new(reader, register_len)
}
