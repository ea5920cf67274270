#![forbid(unsafe_code)]

//! GS command stream dumps.
//!
//! A [`DumpSession`] records every transfer, FIFO read and vsync issued to the emulated GS into
//! an append-only file that can later be replayed. Dumps are written either raw (`.gs`) or as a
//! single LZ4 frame (`.gs.lz4`) built incrementally, so long captures do not have to be held in
//! memory. See [`format`] for the byte layout.

mod buffer;
mod error;
pub mod format;
mod gate;
mod io;
mod reader;
mod record;
mod session;
pub mod sink;

pub use crate::buffer::AccumulationBuffer;
pub use crate::error::{DumpError, Result};
pub use crate::format::DumpFormat;
pub use crate::gate::{FrameGate, GateDecision};
pub use crate::reader::{open_dump, DumpHeader, DumpReader};
pub use crate::record::Record;
pub use crate::session::{dump_path, DumpConfig, DumpSession};
