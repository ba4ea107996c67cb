//! Background execution of a slideshow run.
//!
//! A [`VideoJob`] runs one [`SlideshowAssembler`] run on a dedicated worker
//! thread. Progress updates cross back to the caller over an unbounded
//! channel, so the worker never waits on the caller; the caller drains
//! [`VideoJob::progress`] at its own pace and collects the result with
//! [`VideoJob::join`].

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, SidecarSpawner, SystemToolRunner, ToolRunner, Toolchain};
use crate::processing::slideshow::{RunSummary, SlideshowAssembler, SlideshowRequest};
use crate::progress_reporting::{LogSink, ProgressUpdate};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Cooperative cancellation flag shared between a caller and a run.
///
/// The run checks it between external tool invocations only.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle to a run executing on a worker thread.
pub struct VideoJob {
    handle: JoinHandle<CoreResult<RunSummary>>,
    progress: Receiver<ProgressUpdate>,
    cancel: CancellationToken,
}

impl VideoJob {
    /// Starts a run with the production tool runner and ffmpeg spawner.
    pub fn spawn(config: CoreConfig, request: SlideshowRequest, sink: Arc<dyn LogSink>) -> CoreResult<Self> {
        Self::spawn_with(
            Toolchain::new(SystemToolRunner, config),
            SidecarSpawner,
            request,
            sink,
        )
    }

    /// Starts a run with explicit tool seams.
    pub fn spawn_with<R, S>(
        tools: Toolchain<R>,
        spawner: S,
        request: SlideshowRequest,
        sink: Arc<dyn LogSink>,
    ) -> CoreResult<Self>
    where
        R: ToolRunner + Send + 'static,
        S: FfmpegSpawner + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let assembler = SlideshowAssembler::new(tools, spawner)
            .with_sink(sink)
            .with_cancellation(cancel.clone());

        let handle = thread::Builder::new()
            .name("picvideo-job".to_string())
            .spawn(move || {
                assembler.run(&request, &mut |update| {
                    // A dropped receiver only means nobody is watching.
                    let _ = tx.send(update);
                })
            })?;

        Ok(Self {
            handle,
            progress: rx,
            cancel,
        })
    }

    /// Progress updates in the order the run produced them.
    ///
    /// The channel disconnects when the run ends, so iterating it blocks
    /// until then.
    pub fn progress(&self) -> &Receiver<ProgressUpdate> {
        &self.progress
    }

    /// Requests cancellation. Takes effect at the next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the run to end and returns its result.
    pub fn join(self) -> CoreResult<RunSummary> {
        self.handle.join().unwrap_or_else(|_| {
            Err(CoreError::OperationFailed(
                "video job thread panicked".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_token_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
