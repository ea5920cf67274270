//! On-disk constants shared by the writer and the reader.
//!
//! All integers are little-endian. A dump is a header followed by a flat stream of tagged
//! records:
//!
//! ```text
//! crc              : u32
//! freeze_data_len  : u32
//! freeze_data      : freeze_data_len bytes
//! register_snapshot: fixed-size bytes
//! -- records --
//! 0x00 index:u8 size:u32 data:size   transfer
//! 0x02 size:u32                      fifo read
//! 0x03 register_snapshot             vsync registers
//! 0x01 field:u8                      vsync field
//! ```
//!
//! The lz4 variant compresses the exact same byte stream into a single LZ4 frame.

use lz4_flex::frame::{BlockMode, BlockSize, FrameInfo};

pub const TAG_TRANSFER: u8 = 0x00;
pub const TAG_FIELD: u8 = 0x01;
pub const TAG_READ_FIFO: u8 = 0x02;
pub const TAG_REGISTERS: u8 = 0x03;

/// Size of the `crc` + `freeze_data_len` prefix that starts every dump.
pub const HEADER_PREFIX_SIZE: usize = 8;

/// Size of a transfer record excluding its payload.
pub const TRANSFER_RECORD_HEADER_SIZE: usize = 6;

pub const RAW_SUFFIX: &str = ".gs";
pub const LZ4_SUFFIX: &str = ".gs.lz4";

/// Accumulated bytes that force an incremental compression pass.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 200 * 1024 * 1024;

/// Number of `last` vsyncs that must elapse before a dump may auto-close.
pub const DEFAULT_GRACE_FRAMES: i32 = 2;

/// Size of each compressed block the lz4 encoder emits.
pub const LZ4_BLOCK_SIZE: BlockSize = BlockSize::Max1MB;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpFormat {
    /// Records are written straight to a `.gs` file.
    Raw,
    /// Records are accumulated and streamed through an LZ4 frame into a `.gs.lz4` file.
    #[default]
    Lz4,
}

impl DumpFormat {
    pub fn suffix(self) -> &'static str {
        match self {
            DumpFormat::Raw => RAW_SUFFIX,
            DumpFormat::Lz4 => LZ4_SUFFIX,
        }
    }

    /// Guess the format of an existing dump from its file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(LZ4_SUFFIX) {
            Some(DumpFormat::Lz4)
        } else if name.ends_with(RAW_SUFFIX) {
            Some(DumpFormat::Raw)
        } else {
            None
        }
    }
}

/// Frame parameters for the compressed variant: 1 MiB linked blocks with a content checksum.
pub fn lz4_frame_info() -> FrameInfo {
    FrameInfo::new()
        .block_size(LZ4_BLOCK_SIZE)
        .block_mode(BlockMode::Linked)
        .content_checksum(true)
}
