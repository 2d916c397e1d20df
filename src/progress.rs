//! Progress reporting for long-running decodes.
//!
//! The decoder reports a percentage in `[0, 100]` to a [`ProgressObserver`]
//! at coarse intervals. Each report is a cooperative yield point: the observer
//! may do other work before returning, or return [`ControlFlow::Break`] to
//! cancel the decode.
//!
//! Any `FnMut(u8) -> ControlFlow<()>` closure is an observer:
//!
//! ```
//! use std::ops::ControlFlow;
//! use vcfscope::decoder::Decoder;
//!
//! let mut seen = Vec::new();
//! let decoded = Decoder::default().decode_with_progress("", &mut |p: u8| {
//!     seen.push(p);
//!     ControlFlow::Continue(())
//! })?;
//! assert!(decoded.data.is_empty());
//! assert_eq!(seen.last(), Some(&100));
//! # Ok::<(), vcfscope::VcfError>(())
//! ```

use std::ops::ControlFlow;

use crate::error::{Result, VcfError};

/// Progress value emitted once header parsing is done and records begin.
pub const RECORDS_START: u8 = 50;

/// Progress value emitted on completion.
pub const COMPLETE: u8 = 100;

/// Receiver of decode progress.
pub trait ProgressObserver {
    /// Called with a non-decreasing percentage. Return
    /// [`ControlFlow::Break`] to cancel the decode.
    fn on_progress(&mut self, percent: u8) -> ControlFlow<()>;
}

impl<F> ProgressObserver for F
where
    F: FnMut(u8) -> ControlFlow<()>,
{
    fn on_progress(&mut self, percent: u8) -> ControlFlow<()> {
        self(percent)
    }
}

/// Observer that ignores progress and never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _percent: u8) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Keeps emitted values monotonic and turns a cancellation into an error.
pub(crate) struct ProgressTracker<'a, O: ProgressObserver + ?Sized> {
    observer: &'a mut O,
    last: Option<u8>,
}

impl<'a, O: ProgressObserver + ?Sized> ProgressTracker<'a, O> {
    pub(crate) fn new(observer: &'a mut O) -> Self {
        ProgressTracker {
            observer,
            last: None,
        }
    }

    /// Emit `percent`, clamped to `[last, 100]`. Repeated values are not re-sent.
    pub(crate) fn emit(&mut self, percent: u8) -> Result<()> {
        let percent = percent.min(COMPLETE).max(self.last.unwrap_or(0));
        if self.last == Some(percent) {
            return Ok(());
        }
        self.last = Some(percent);
        tracing::trace!(percent, "decode progress");
        match self.observer.on_progress(percent) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => Err(VcfError::Cancelled { progress: percent }),
        }
    }

    /// Progress inside the record phase: `50 + 50 * done / total`, capped below 100.
    pub(crate) fn emit_fraction(&mut self, done: usize, total: usize) -> Result<()> {
        let span = usize::from(COMPLETE - RECORDS_START);
        let step = if total == 0 {
            0
        } else {
            (done.min(total) * span / total).min(span - 1)
        };
        // step < 50, so the conversion cannot fail
        let step = u8::try_from(step).unwrap_or(0);
        self.emit(RECORDS_START + step)
    }
}
