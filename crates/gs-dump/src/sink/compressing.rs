use std::io::Write;

use lz4_flex::frame::FrameEncoder;

use super::DumpSink;
use crate::buffer::AccumulationBuffer;
use crate::error::{DumpError, Result};
use crate::format::lz4_frame_info;

/// Sink for the lz4 variant.
///
/// Records are staged in an [`AccumulationBuffer`] and only pushed through the encoder once the
/// buffer crosses its threshold, or when the sink is finished. The encoder state lives across
/// passes, so the whole dump is a single LZ4 frame; its end mark and content checksum are written
/// exactly once, by [`CompressingSink::finish_into_inner`].
///
/// Passes run inline on the caller's thread; a pass over a full buffer blocks until every block
/// has been written.
pub struct CompressingSink<W: Write> {
    buffer: AccumulationBuffer,
    /// `None` once the stream has failed; anything buffered after that is discarded.
    encoder: Option<FrameEncoder<W>>,
    passes: u64,
}

impl<W: Write> CompressingSink<W> {
    pub fn new(writer: W, flush_threshold: usize) -> Self {
        Self {
            buffer: AccumulationBuffer::new(flush_threshold),
            encoder: Some(FrameEncoder::with_frame_info(lz4_frame_info(), writer)),
            passes: 0,
        }
    }

    /// Number of compression passes that consumed buffered data so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Run the final pass, terminate the frame and hand back the flushed destination.
    pub fn finish_into_inner(mut self) -> Result<W> {
        self.compress_pending()?;
        let encoder = self
            .encoder
            .take()
            .ok_or(DumpError::StreamAborted)?;
        let mut writer = encoder.finish()?;
        writer.flush()?;
        Ok(writer)
    }

    /// Feed the whole buffer to the encoder and clear it.
    ///
    /// The buffer is cleared on failure too, and the encoder is dropped with it: a failed stream
    /// cannot be resumed.
    fn compress_pending(&mut self) -> Result<()> {
        let Some(encoder) = self.encoder.as_mut() else {
            self.buffer.clear();
            return Ok(());
        };
        if self.buffer.is_empty() {
            return Ok(());
        }

        let result = encoder.write_all(self.buffer.as_slice());
        self.buffer.clear();
        self.passes += 1;
        if let Err(err) = result {
            self.encoder = None;
            return Err(err.into());
        }
        Ok(())
    }
}

impl<W: Write> DumpSink for CompressingSink<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.append(bytes)?;
        if self.buffer.over_threshold() {
            tracing::debug!(
                buffered = self.buffer.len(),
                threshold = self.buffer.threshold(),
                "dump buffer over threshold; compressing"
            );
            self.compress_pending()?;
        }
        Ok(())
    }

    fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    fn finish(self: Box<Self>) -> Result<()> {
        self.finish_into_inner().map(drop)
    }
}
