use std::io::Write;

use super::DumpSink;
use crate::error::Result;
use crate::io::WriteLeExt;

/// Sink for the raw variant: every write goes straight to the destination.
#[derive(Debug)]
pub struct DirectSink<W: Write> {
    writer: W,
}

impl<W: Write> DirectSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Flush and hand back the destination.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> DumpSink for DirectSink<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_bytes(bytes)
    }

    fn finish(self: Box<Self>) -> Result<()> {
        self.into_inner().map(drop)
    }
}
