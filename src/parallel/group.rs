use crossbeam::channel::{bounded, Sender};
use crossbeam::sync::WaitGroup;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use super::config::GroupConfig;
use super::context::Context;
use super::error::{Result, TransformError};
use super::merge::{merge, Completion};
use super::traits::{Appender, Injector, Transformer};

/// Outcome of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformSummary {
    /// Tasks run, one per input index
    pub tasks: usize,
    /// Worker threads the tasks were spread over
    pub workers: usize,
    /// Values handed to the sink
    pub delivered: usize,
    /// Highest rendezvous occupancy seen by the merge loop
    pub peak_buffered: usize,
}

/// Fan-out/fan-in transform engine.
///
/// Every run creates one task per input index and runs them on a pool of
/// scoped worker threads (see [`GroupConfig::effective_workers`]). Tasks push
/// results into a bounded rendezvous channel of `max_in_flight` slots which a
/// single merge loop on the calling thread drains into the sink. The first
/// failure cancels the run's context; tasks that have not emitted yet see this
/// and drop their value instead of blocking, and idle workers stop claiming
/// new indices.
#[derive(Debug, Default)]
pub struct TransformGroup {
    config: GroupConfig,
    context: Option<Context>,
}

impl TransformGroup {
    pub fn new(config: GroupConfig) -> Self {
        Self {
            config,
            context: None,
        }
    }

    /// Group bound to a context derived from `parent`.
    ///
    /// The returned context is cancelled by the first failing run, and any
    /// cancellation of `parent` (or of the returned context) aborts runs that
    /// are still emitting.
    pub fn with_context(config: GroupConfig, parent: &Context) -> (Self, Context) {
        let context = parent.child();
        let group = Self {
            config,
            context: Some(context.clone()),
        };
        (group, context)
    }

    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Apply `input` to every index and append each value as it arrives.
    ///
    /// The sink sees values in delivery order, which is not input order.
    pub fn run_unordered<I, A>(&self, input: &I, sink: &mut A) -> Result<TransformSummary>
    where
        I: Transformer,
        A: Appender<I::Output> + ?Sized,
    {
        self.execute(input, |_, value| sink.append(value))
    }

    /// Like `run_unordered` for transforms that yield a batch per index;
    /// every item of every batch is appended.
    pub fn run_unordered_batches<I, T, A>(&self, input: &I, sink: &mut A) -> Result<TransformSummary>
    where
        I: Transformer,
        I::Output: IntoIterator<Item = T>,
        A: Appender<T> + ?Sized,
    {
        self.execute(input, |_, batch| sink.append_batch(batch))
    }

    /// Inject values into a sink pre-sized to `input.len()`.
    ///
    /// Position `i` receives the `i`-th value *delivered*, not the value
    /// produced for input index `i`. Use [`TransformGroup::run_indexed`] when
    /// positions must line up with the input.
    pub fn run_ordered<I, S>(&self, input: &I, sink: &mut S) -> Result<TransformSummary>
    where
        I: Transformer,
        S: Injector<I::Output> + ?Sized,
    {
        let mut position = 0;
        self.execute(input, |_, value| {
            sink.inject_at(position, value);
            position += 1;
        })
    }

    /// Delivery-order injection of the first item of each batch.
    /// An empty batch still consumes its delivery position.
    pub fn run_ordered_batches<I, T, S>(&self, input: &I, sink: &mut S) -> Result<TransformSummary>
    where
        I: Transformer,
        I::Output: IntoIterator<Item = T>,
        S: Injector<T> + ?Sized,
    {
        let mut position = 0;
        self.execute(input, |_, batch| {
            if let Some(first) = batch.into_iter().next() {
                sink.inject_at(position, first);
            }
            position += 1;
        })
    }

    /// Inject each value at the index of the task that produced it.
    pub fn run_indexed<I, S>(&self, input: &I, sink: &mut S) -> Result<TransformSummary>
    where
        I: Transformer,
        S: Injector<I::Output> + ?Sized,
    {
        self.execute(input, |index, value| sink.inject_at(index, value))
    }

    fn execute<I, F>(&self, input: &I, deliver: F) -> Result<TransformSummary>
    where
        I: Transformer,
        F: FnMut(usize, I::Output),
    {
        let tasks = input.len();
        let workers = self.config.effective_workers(tasks);
        let capacity = self.config.max_in_flight.max(1);
        let context = self.context.clone().unwrap_or_default();
        let first_error: OnceLock<TransformError> = OnceLock::new();
        let next_index = AtomicUsize::new(0);

        tracing::debug!(
            "running {} transform tasks on {} workers (max in flight: {})",
            tasks,
            workers,
            capacity
        );

        let (out_tx, out_rx) = bounded::<(usize, I::Output)>(capacity);
        let (done_tx, done_rx) = bounded::<Completion>(1);

        let scoped = crossbeam::thread::scope(|s| {
            let wait_group = WaitGroup::new();

            for _ in 0..workers {
                let out_tx = out_tx.clone();
                let wait_group = wait_group.clone();
                let context = &context;
                let first_error = &first_error;
                let next_index = &next_index;

                s.spawn(move |_| {
                    run_worker(input, next_index, &out_tx, context, first_error);
                    drop(wait_group);
                });
            }

            // Only workers may keep the value channel open.
            drop(out_tx);

            let first_error = &first_error;
            s.spawn(move |_| {
                wait_group.wait();
                let completion = if first_error.get().is_some() {
                    Completion::Failed
                } else {
                    Completion::Succeeded
                };
                let _ = done_tx.send(completion);
            });

            merge(out_rx, done_rx, deliver)
        });

        let report = scoped.map_err(|_| TransformError::Panicked)?;

        if report.completion == Completion::Succeeded {
            tracing::debug!(
                "transform run succeeded: {} delivered, peak buffer {}",
                report.delivered,
                report.peak_buffered
            );
            return Ok(TransformSummary {
                tasks,
                workers,
                delivered: report.delivered,
                peak_buffered: report.peak_buffered,
            });
        }

        let error = first_error.into_inner().unwrap_or(TransformError::Panicked);
        tracing::debug!("transform run failed after {} deliveries: {}", report.delivered, error);
        Err(error)
    }
}

/// Claim indices until they run out or the run is cancelled.
fn run_worker<I>(
    input: &I,
    next_index: &AtomicUsize,
    out_tx: &Sender<(usize, I::Output)>,
    context: &Context,
    first_error: &OnceLock<TransformError>,
) where
    I: Transformer,
{
    loop {
        // A run that is already cancelled must still report why.
        if let Some(error) = context.err() {
            record_failure(first_error, context, error);
            return;
        }

        let index = next_index.fetch_add(1, Ordering::Relaxed);
        if index >= input.len() {
            return;
        }
        run_task(input, index, out_tx, context, first_error);
    }
}

/// Body of one task: transform, then check-then-send.
fn run_task<I>(
    input: &I,
    index: usize,
    out_tx: &Sender<(usize, I::Output)>,
    context: &Context,
    first_error: &OnceLock<TransformError>,
) where
    I: Transformer,
{
    let value = match input.transform(index) {
        Ok(value) => value,
        Err(source) => {
            record_failure(first_error, context, TransformError::Transform { index, source });
            return;
        }
    };

    // The check does not interrupt a send that is already blocked; the merge
    // loop dropping its receiver does.
    if let Some(error) = context.err() {
        tracing::trace!("task {} dropping its value: {}", index, error);
        record_failure(first_error, context, error);
        return;
    }

    if out_tx.send((index, value)).is_err() {
        tracing::trace!("task {} found the merge loop gone", index);
        record_failure(first_error, context, TransformError::Cancelled);
    }
}

fn record_failure(slot: &OnceLock<TransformError>, context: &Context, error: TransformError) {
    if slot.set(error).is_ok() {
        context.cancel();
    }
}
