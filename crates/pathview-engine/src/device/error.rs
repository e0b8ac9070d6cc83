/// What the frame loop does after `Gpu::begin_frame` fails.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// `Lost` or `Outdated`: the surface was configured again, try the next frame.
    Reconfigured,
    /// `Timeout` or `Other`: nothing to present this frame.
    SkipFrame,
    /// Out of memory. The preview shuts down.
    Fatal,
}

impl SurfaceErrorAction {
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Fatal)
    }
}
