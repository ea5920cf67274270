use crate::error::{DumpError, Result};

/// Growable staging area for records that have not been compressed yet.
///
/// The threshold is a soft cap: an append may take the buffer past it, and the owner is expected
/// to drain the buffer (see [`AccumulationBuffer::over_threshold`]) before accepting more data.
#[derive(Debug)]
pub struct AccumulationBuffer {
    bytes: Vec<u8>,
    threshold: usize,
}

impl AccumulationBuffer {
    pub fn new(threshold: usize) -> Self {
        Self {
            bytes: Vec::new(),
            threshold,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.bytes
            .try_reserve(data.len())
            .map_err(|_| DumpError::OutOfMemory {
                len: self.bytes.len().saturating_add(data.len()),
            })?;
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    pub fn over_threshold(&self) -> bool {
        self.bytes.len() > self.threshold
    }

    /// Drop the buffered bytes but keep the allocation for the next round of appends.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}
