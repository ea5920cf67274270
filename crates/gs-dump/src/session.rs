use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::format::{DumpFormat, DEFAULT_FLUSH_THRESHOLD, DEFAULT_GRACE_FRAMES};
use crate::gate::{FrameGate, GateDecision};
use crate::record::{encode_header, read_fifo_record, transfer_prefix, vsync_records};
use crate::sink::{CompressingSink, DirectSink, DumpSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpConfig {
    pub format: DumpFormat,
    /// Buffered bytes that trigger an incremental compression pass (lz4 only).
    pub flush_threshold: usize,
    /// Initial value of the grace counter, see [`FrameGate`].
    pub grace_frames: i32,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            format: DumpFormat::default(),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            grace_frames: DEFAULT_GRACE_FRAMES,
        }
    }
}

impl DumpConfig {
    pub fn raw() -> Self {
        Self {
            format: DumpFormat::Raw,
            ..Self::default()
        }
    }

    pub fn lz4() -> Self {
        Self {
            format: DumpFormat::Lz4,
            ..Self::default()
        }
    }
}

/// Destination path for a dump started from `base`: the format suffix is appended, not
/// substituted, so `capture.0` becomes `capture.0.gs`.
pub fn dump_path(base: &Path, format: DumpFormat) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format.suffix());
    PathBuf::from(name)
}

struct ActiveDump {
    path: PathBuf,
    sink: Box<dyn DumpSink>,
}

/// Recorder for one GS command stream capture.
///
/// `REGS` is the size of the privileged register snapshot written in the header and at every
/// vsync.
///
/// None of the recording calls report errors. A dump that cannot be created, or whose stream
/// fails part way, leaves the session closed and every later call a no-op; the cause is logged
/// through `tracing`.
///
/// The session is single-writer: it must only be driven from the thread that processes GS
/// commands. Callers must [`DumpSession::close`] a dump explicitly; dropping an open session
/// does not finalize it, and an lz4 dump abandoned that way has no frame trailer.
pub struct DumpSession<const REGS: usize> {
    config: DumpConfig,
    active: Option<ActiveDump>,
    gate: FrameGate,
}

impl<const REGS: usize> Default for DumpSession<REGS> {
    fn default() -> Self {
        Self::new(DumpConfig::default())
    }
}

impl<const REGS: usize> DumpSession<REGS> {
    pub fn new(config: DumpConfig) -> Self {
        Self {
            config,
            active: None,
            gate: FrameGate::new(config.grace_frames),
        }
    }

    pub fn config(&self) -> DumpConfig {
        self.config
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Path of the dump being written, if any.
    pub fn path(&self) -> Option<&Path> {
        self.active.as_ref().map(|active| active.path.as_path())
    }

    pub fn frame_count(&self) -> u64 {
        self.gate.frame_count()
    }

    pub fn extra_frames(&self) -> i32 {
        self.gate.extra_frames()
    }

    /// Bytes staged for compression; raw dumps report zero.
    pub fn pending_bytes(&self) -> usize {
        self.active
            .as_ref()
            .map_or(0, |active| active.sink.pending_bytes())
    }

    /// Start a new dump at `base` plus the format suffix.
    ///
    /// A dump that is already open is closed first.
    pub fn open(
        &mut self,
        base: impl AsRef<Path>,
        crc: u32,
        freeze_data: &[u8],
        registers: &[u8; REGS],
    ) {
        self.close();
        self.gate = FrameGate::new(self.config.grace_frames);

        let path = dump_path(base.as_ref(), self.config.format);
        let header = match encode_header(crc, freeze_data, registers) {
            Ok(header) => header,
            Err(err) => {
                tracing::warn!(path = %path.display(), "not starting GS dump: {err}");
                return;
            }
        };
        let sink = match self.create_sink(&path) {
            Ok(sink) => sink,
            Err(err) => {
                tracing::warn!(path = %path.display(), "failed to create GS dump: {err}");
                return;
            }
        };
        tracing::debug!(path = %path.display(), format = ?self.config.format, "GS dump started");
        self.active = Some(ActiveDump { path, sink });
        self.emit(|sink| sink.write(&header));
    }

    pub fn transfer(&mut self, index: u8, data: &[u8]) {
        if data.is_empty() || self.active.is_none() {
            return;
        }
        let prefix = match transfer_prefix(index, data.len()) {
            Ok(prefix) => prefix,
            Err(err) => {
                tracing::warn!(index, "dropping GS transfer: {err}");
                return;
            }
        };
        self.emit(|sink| {
            sink.write(&prefix)?;
            sink.write(data)
        });
    }

    pub fn read_fifo(&mut self, size: u32) {
        if size == 0 || self.active.is_none() {
            return;
        }
        self.emit(|sink| sink.write(&read_fifo_record(size)));
    }

    /// Record a vsync, then apply the auto-close policy, which may close the dump.
    pub fn vsync(&mut self, field: u8, last: bool, registers: &[u8; REGS]) {
        if self.active.is_none() {
            return;
        }
        self.emit(|sink| sink.write(&vsync_records(field, registers)));
        if self.active.is_none() {
            return;
        }

        if self.gate.on_vsync(last) == GateDecision::Close {
            tracing::debug!(frames = self.gate.frame_count(), "GS dump reached its final frame");
            self.close();
        }
    }

    /// Finalize the dump and release the file. Calling this on a closed session does nothing.
    pub fn close(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        match active.sink.finish() {
            Ok(()) => tracing::debug!(
                path = %active.path.display(),
                frames = self.gate.frame_count(),
                "GS dump closed"
            ),
            Err(err) => {
                tracing::error!(path = %active.path.display(), "failed to finalize GS dump: {err}")
            }
        }
    }

    fn create_sink(&self, path: &Path) -> Result<Box<dyn DumpSink>> {
        let writer = BufWriter::new(File::create(path)?);
        let sink: Box<dyn DumpSink> = match self.config.format {
            DumpFormat::Raw => Box::new(DirectSink::new(writer)),
            DumpFormat::Lz4 => Box::new(CompressingSink::new(writer, self.config.flush_threshold)),
        };
        Ok(sink)
    }

    /// Hand bytes to the active sink; a failing sink aborts the dump.
    fn emit(&mut self, write: impl FnOnce(&mut dyn DumpSink) -> Result<()>) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if let Err(err) = write(active.sink.as_mut()) {
            // Dropping the sink discards whatever is still buffered and closes the file.
            if let Some(active) = self.active.take() {
                tracing::error!(path = %active.path.display(), "aborting GS dump: {err}");
            }
        }
    }
}

impl<const REGS: usize> Drop for DumpSession<REGS> {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            tracing::warn!(
                path = %active.path.display(),
                pending = active.sink.pending_bytes(),
                "GS dump dropped without close; output may be incomplete"
            );
        }
    }
}
