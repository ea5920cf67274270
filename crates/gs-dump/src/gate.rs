use crate::format::DEFAULT_GRACE_FRAMES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Close,
}

/// Auto-close policy for a running dump.
///
/// A dump only stops on an even field count (both fields of an interlaced frame are captured)
/// at a `last` vsync, and only once the grace counter has been driven to zero or below by
/// earlier `last` vsyncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGate {
    frame_count: u64,
    extra_frames: i32,
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_FRAMES)
    }
}

impl FrameGate {
    pub fn new(grace_frames: i32) -> Self {
        Self {
            frame_count: 0,
            extra_frames: grace_frames,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Remaining grace; may be negative.
    pub fn extra_frames(&self) -> i32 {
        self.extra_frames
    }

    /// Advance by one vsync.
    ///
    /// On [`GateDecision::Close`] the grace counter is left as is.
    pub fn on_vsync(&mut self, last: bool) -> GateDecision {
        self.frame_count += 1;
        if self.frame_count % 2 == 0 && last && self.extra_frames <= 0 {
            return GateDecision::Close;
        }
        if last {
            self.extra_frames = self.extra_frames.saturating_sub(1);
        }
        GateDecision::Continue
    }
}
