use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DumpError>;

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("lz4 stream error: {0}")]
    Encode(#[from] lz4_flex::frame::Error),

    #[error("out of memory allocating {len} bytes")]
    OutOfMemory { len: usize },

    #[error("payload of {len} bytes does not fit in a u32 length field")]
    PayloadTooLarge { len: usize },

    #[error("unknown record tag {0:#04x}")]
    UnknownRecordTag(u8),

    #[error("compression stream was aborted by an earlier write failure")]
    StreamAborted,

    #[error("corrupt dump: {0}")]
    Corrupt(&'static str),
}
