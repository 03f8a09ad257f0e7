use crate::batch::{BatchHandle, BatchOutput};
use crate::error::Result;

type Completion = Box<dyn FnOnce(Result<BatchOutput>)>;

struct PendingBatch {
    handle: BatchHandle,
    on_complete: Completion,
    scheduled_frame: u64,
}

/// Per-frame completion point for batches started with
/// [`BatchSolver::spawn`](crate::BatchSolver::spawn).
///
/// Owned by the game loop and passed to whoever schedules work; there is no global instance.
/// Callbacks run on the thread that calls [`poll`](Self::poll) or
/// [`complete_all`](Self::complete_all), in scheduling order.
#[derive(Default)]
pub struct FrameScheduler {
    pending: Vec<PendingBatch>,
    frame: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Advance the frame counter. Returns the new frame number.
    pub fn begin_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    pub fn schedule<F>(&mut self, handle: BatchHandle, on_complete: F)
    where
        F: FnOnce(Result<BatchOutput>) + 'static,
    {
        self.pending.push(PendingBatch {
            handle,
            on_complete: Box::new(on_complete),
            scheduled_frame: self.frame,
        });
    }

    /// Complete every batch that has already finished, without blocking.
    /// Returns the number of callbacks run.
    pub fn poll(&mut self) -> usize {
        let mut completed = 0;
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].handle.is_complete() {
                let batch = self.pending.remove(i);
                self.finish(batch);
                completed += 1;
            } else {
                i += 1;
            }
        }
        completed
    }

    /// End-of-frame barrier: block until every scheduled batch has completed.
    pub fn complete_all(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let completed = pending.len();
        for batch in pending {
            self.finish(batch);
        }
        completed
    }

    fn finish(&self, batch: PendingBatch) {
        let PendingBatch {
            handle,
            on_complete,
            scheduled_frame,
        } = batch;
        let output = handle.complete();
        tracing::trace!(
            scheduled_frame,
            frame = self.frame,
            ok = output.is_ok(),
            "batch completed"
        );
        on_complete(output);
    }
}

impl core::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("frame", &self.frame)
            .field("pending", &self.pending.len())
            .finish()
    }
}
