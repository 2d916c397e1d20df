//! Background decoding with progress over a bounded channel.
//!
//! [`decode_in_background`] moves the input onto a worker thread and returns
//! a [`BackgroundDecode`] handle. The worker sends [`DecodeEvent::Progress`]
//! events as it goes and a single [`DecodeEvent::Finished`] at the end.
//!
//! - **Backpressure:** the channel is bounded; a slow consumer blocks the
//!   worker at its next progress report.
//! - **Cancellation:** [`BackgroundDecode::cancel`] is observed at the next
//!   progress report and the worker finishes with
//!   [`VcfError::Cancelled`]. Dropping the handle cancels too.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

use crate::decoder::{DecodeOptions, Decoded, Decoder};
use crate::error::{Result, VcfError};
use crate::progress::ProgressObserver;

/// Configuration for a background decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Channel capacity (events)
    pub channel_capacity: usize,
    /// Options for the decode itself
    pub decode: DecodeOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 128,
            decode: DecodeOptions::default(),
        }
    }
}

/// Event sent by the worker.
#[derive(Debug)]
#[allow(clippy::large_enum_variant)]
pub enum DecodeEvent {
    /// Progress percentage, non-decreasing.
    Progress(u8),
    /// Final outcome; always the last event.
    Finished(Result<Decoded>),
}

/// Forwards progress to the channel and checks the cancel flag.
struct ChannelProgress<'a> {
    sender: &'a Sender<DecodeEvent>,
    cancelled: &'a AtomicBool,
}

impl ProgressObserver for ChannelProgress<'_> {
    fn on_progress(&mut self, percent: u8) -> std::ops::ControlFlow<()> {
        if self.cancelled.load(Ordering::Relaxed)
            || self.sender.send(DecodeEvent::Progress(percent)).is_err()
        {
            std::ops::ControlFlow::Break(())
        } else {
            std::ops::ControlFlow::Continue(())
        }
    }
}

/// Worker: decode `text`, then send the outcome.
fn worker_task(text: &str, sender: &Sender<DecodeEvent>, cancelled: &AtomicBool, options: DecodeOptions) {
    let mut observer = ChannelProgress { sender, cancelled };
    let outcome = Decoder::new(options).decode_with_progress(text, &mut observer);
    if let Err(e) = &outcome {
        tracing::debug!(error = %e, "background decode ended with an error");
    }
    // The consumer may already be gone; nothing left to report to.
    let _ = sender.send(DecodeEvent::Finished(outcome));
}

/// Handle to a decode running on a worker thread.
#[derive(Debug)]
pub struct BackgroundDecode {
    receiver: Receiver<DecodeEvent>,
    cancelled: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl BackgroundDecode {
    /// Ask the worker to stop at its next progress report.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Next event, blocking. `None` once the worker is done and drained.
    pub fn next_event(&self) -> Option<DecodeEvent> {
        self.receiver.recv().ok()
    }

    /// Next event if one is ready.
    pub fn try_next_event(&self) -> Option<DecodeEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drain events until the outcome arrives, passing progress to `on_progress`.
    ///
    /// # Errors
    ///
    /// Returns the decode error, or [`VcfError::Decode`] if the worker
    /// stopped without reporting an outcome.
    pub fn wait_with(mut self, mut on_progress: impl FnMut(u8)) -> Result<Decoded> {
        while let Ok(event) = self.receiver.recv() {
            match event {
                DecodeEvent::Progress(percent) => on_progress(percent),
                DecodeEvent::Finished(outcome) => {
                    self.join();
                    return outcome;
                },
            }
        }
        self.join();
        Err(VcfError::Decode(
            "decode worker stopped without a result".to_string(),
        ))
    }

    /// Block until the outcome arrives, discarding progress.
    ///
    /// # Errors
    ///
    /// As [`wait_with`](Self::wait_with).
    pub fn wait(self) -> Result<Decoded> {
        self.wait_with(|_| {})
    }

    fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("decode worker panicked");
            }
        }
    }
}

impl Drop for BackgroundDecode {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Start decoding `text` on a worker thread.
#[must_use]
pub fn decode_in_background(text: impl Into<String>, config: &PipelineConfig) -> BackgroundDecode {
    let text = text.into();
    let (sender, receiver) = bounded(config.channel_capacity.max(1));
    let cancelled = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&cancelled);
    let options = config.decode;
    let worker = thread::spawn(move || worker_task(&text, &sender, &flag, options));

    BackgroundDecode {
        receiver,
        cancelled,
        worker: Some(worker),
    }
}
