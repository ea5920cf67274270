//! Destinations for encoded records.
//!
//! A session picks one sink when it opens and keeps it until it closes; the two variants are
//! never mixed within one dump.

mod compressing;
mod direct;

pub use compressing::CompressingSink;
pub use direct::DirectSink;

use crate::error::Result;

pub trait DumpSink {
    /// Append already-encoded bytes. Record boundaries are not visible to the sink.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Bytes accepted by [`DumpSink::write`] that have not reached the destination yet.
    fn pending_bytes(&self) -> usize {
        0
    }

    /// Drain everything still buffered, terminate the stream and release the destination.
    ///
    /// The destination is released on the error path as well.
    fn finish(self: Box<Self>) -> Result<()>;
}
