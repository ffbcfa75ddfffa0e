//! Transform engine tests

use super::*;
use anyhow::anyhow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

fn squares(values: &[u64]) -> TransformFn<impl Fn(usize) -> anyhow::Result<u64> + Sync + '_> {
    transform_fn(values.len(), move |i| Ok(values[i] * values[i]))
}

#[test]
fn test_unordered_collects_every_value() {
    let group = TransformGroup::default();
    let mut sink: Vec<u64> = Vec::new();

    let summary = group.run_unordered(&squares(&[2, 3, 4]), &mut sink).unwrap();

    sink.sort();
    assert_eq!(sink, vec![4, 9, 16]);
    assert_eq!(summary.tasks, 3);
    assert_eq!(summary.delivered, 3);
}

#[test]
fn test_empty_input_succeeds() {
    let group = TransformGroup::default();
    let mut sink: Vec<u64> = Vec::new();

    let summary = group.run_unordered(&squares(&[]), &mut sink).unwrap();
    assert!(sink.is_empty());
    assert_eq!(summary, TransformSummary::default());

    let mut ordered: Vec<u64> = Vec::new();
    group.run_ordered(&squares(&[]), &mut ordered).unwrap();
    assert!(ordered.is_empty());
}

#[test]
fn test_each_index_transformed_exactly_once() {
    let calls: Vec<AtomicUsize> = (0..200).map(|_| AtomicUsize::new(0)).collect();
    let input = transform_fn(calls.len(), |i| {
        calls[i].fetch_add(1, Ordering::SeqCst);
        Ok(i)
    });

    let group = TransformGroup::new(GroupConfig::with_max_in_flight(3));
    let mut sink: Vec<usize> = Vec::new();
    group.run_unordered(&input, &mut sink).unwrap();

    assert!(calls.iter().all(|c| c.load(Ordering::SeqCst) == 1));
    sink.sort();
    assert_eq!(sink, (0..200).collect::<Vec<_>>());
}

#[test]
fn test_repeated_runs_produce_same_set() {
    let values: Vec<u64> = (1..=64).collect();
    let group = TransformGroup::default();

    let mut first: Vec<u64> = Vec::new();
    let mut second: Vec<u64> = Vec::new();
    group.run_unordered(&squares(&values), &mut first).unwrap();
    group.run_unordered(&squares(&values), &mut second).unwrap();

    first.sort();
    second.sort();
    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
}

#[test]
fn test_ordered_fills_every_position_in_delivery_order() {
    let group = TransformGroup::default();
    let mut sink = vec![0u64; 3];

    let summary = group.run_ordered(&squares(&[2, 3, 4]), &mut sink).unwrap();
    assert_eq!(summary.delivered, 3);

    // Positions follow delivery order, so only the multiset is guaranteed.
    let mut sorted = sink.clone();
    sorted.sort();
    assert_eq!(sorted, vec![4, 9, 16]);
}

#[test]
fn test_ordered_position_is_delivery_counter_not_source_index() {
    // Index 0 is slowest, so it is delivered last and lands in the last slot.
    let input = transform_fn(3, |i| {
        if i == 0 {
            thread::sleep(Duration::from_millis(200));
        }
        Ok(i)
    });
    let group = TransformGroup::default();
    let mut sink = vec![usize::MAX; 3];

    group.run_ordered(&input, &mut sink).unwrap();

    assert_eq!(sink[2], 0);
    assert_ne!(sink[0], 0);
}

#[test]
fn test_indexed_keeps_source_positions() {
    let input = transform_fn(5, |i| {
        thread::sleep(Duration::from_millis(((5 - i) * 10) as u64));
        Ok(i * 100)
    });
    let group = TransformGroup::default();
    let mut sink = vec![0usize; 5];

    group.run_indexed(&input, &mut sink).unwrap();
    assert_eq!(sink, vec![0, 100, 200, 300, 400]);
}

#[test]
fn test_unordered_batches_flatten() {
    let input = transform_fn(3, |i| Ok(vec![i; i]));
    let group = TransformGroup::default();
    let mut sink: Vec<usize> = Vec::new();

    let summary = group.run_unordered_batches(&input, &mut sink).unwrap();

    sink.sort();
    assert_eq!(sink, vec![1, 2, 2]);
    assert_eq!(summary.delivered, 3);
}

#[test]
fn test_ordered_batches_take_first_item() {
    let input = transform_fn(3, |i| Ok(vec![i * 10, i * 10 + 1]));
    let group = TransformGroup::default();
    let mut sink = vec![usize::MAX; 3];

    group.run_ordered_batches(&input, &mut sink).unwrap();

    sink.sort();
    assert_eq!(sink, vec![0, 10, 20]);
}

#[test]
fn test_ordered_batches_empty_batch_consumes_position() {
    let input = transform_fn(2, |_| Ok(Vec::<u32>::new()));
    let group = TransformGroup::default();
    let mut sink = vec![7u32; 2];

    let summary = group.run_ordered_batches(&input, &mut sink).unwrap();
    assert_eq!(summary.delivered, 2);
    assert_eq!(sink, vec![7, 7]);
}

#[test]
fn test_first_error_is_returned() {
    let input = transform_fn(3, |i| {
        if i == 1 {
            Err(anyhow!("boom"))
        } else {
            Ok(i)
        }
    });
    let group = TransformGroup::default();
    let mut sink: Vec<usize> = Vec::new();

    let err = group.run_unordered(&input, &mut sink).unwrap_err();

    assert_eq!(err.index(), Some(1));
    assert!(err.to_string().contains("boom"));
    assert!(sink.len() < 3);
}

#[test]
fn test_only_one_error_survives() {
    let input = transform_fn(50, |i| -> anyhow::Result<usize> { Err(anyhow!("fail {}", i)) });
    let group = TransformGroup::default();
    let mut sink: Vec<usize> = Vec::new();

    let err = group.run_unordered(&input, &mut sink).unwrap_err();
    assert!(matches!(err, TransformError::Transform { .. }));
    assert!(sink.is_empty());
}

#[test]
fn test_failure_does_not_deadlock_blocked_emitters() {
    // Task 0 fails at once; the rest are slow and would overflow a one-slot
    // buffer nobody drains anymore.
    let input = transform_fn(64, |i| {
        if i == 0 {
            return Err(anyhow!("first task failed"));
        }
        thread::sleep(Duration::from_millis(50));
        Ok(i)
    });
    let group = TransformGroup::new(GroupConfig::with_max_in_flight(1));
    let mut sink: Vec<usize> = Vec::new();

    let started = Instant::now();
    let err = group.run_unordered(&input, &mut sink).unwrap_err();

    assert_eq!(err.index(), Some(0));
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(sink.len() < 64);
}

#[test]
fn test_failure_with_slow_sink_does_not_deadlock() {
    let input = transform_fn(32, |i| {
        if i == 31 {
            thread::sleep(Duration::from_millis(20));
            return Err(anyhow!("late failure"));
        }
        Ok(i)
    });
    let group = TransformGroup::new(GroupConfig::with_max_in_flight(2));
    let mut delivered = 0usize;
    let mut sink = SlowSink {
        delay: Duration::from_millis(5),
        count: &mut delivered,
    };

    let err = group.run_unordered(&input, &mut sink).unwrap_err();
    assert_eq!(err.index(), Some(31));
    assert!(delivered < 32);
}

struct SlowSink<'a> {
    delay: Duration,
    count: &'a mut usize,
}

impl Appender<usize> for SlowSink<'_> {
    fn append(&mut self, _value: usize) {
        thread::sleep(self.delay);
        *self.count += 1;
    }
}

/// Counts values produced by the transform but not yet taken by the sink.
struct Outstanding {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Outstanding {
    fn new() -> Self {
        Self {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    fn produced(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn taken(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

struct CountingSink<'a> {
    outstanding: &'a Outstanding,
    delay: Duration,
    received: Vec<usize>,
}

impl Appender<usize> for CountingSink<'_> {
    fn append(&mut self, value: usize) {
        self.outstanding.taken();
        thread::sleep(self.delay);
        self.received.push(value);
    }
}

#[test]
fn test_buffer_never_exceeds_max_in_flight() {
    const MAX_IN_FLIGHT: usize = 3;
    const WORKERS: usize = 2;

    let outstanding = Outstanding::new();
    let input = transform_fn(40, |i| {
        outstanding.produced();
        Ok(i)
    });
    let group = TransformGroup::new(GroupConfig::with_max_in_flight(MAX_IN_FLIGHT).max_workers(WORKERS));
    let mut sink = CountingSink {
        outstanding: &outstanding,
        delay: Duration::from_millis(2),
        received: Vec::new(),
    };

    let summary = group.run_unordered(&input, &mut sink).unwrap();

    // Besides the buffered values, each worker may hold one value it has not
    // sent yet and the merge loop one it has received but not handed over.
    let peak = outstanding.peak.load(Ordering::SeqCst);
    assert!(peak <= MAX_IN_FLIGHT + WORKERS + 1, "peak outstanding {}", peak);
    assert!(peak >= MAX_IN_FLIGHT, "slow sink never let the buffer fill: {}", peak);
    assert!(summary.peak_buffered <= MAX_IN_FLIGHT);
    assert_eq!(summary.delivered, 40);
    assert_eq!(sink.received.len(), 40);
}

#[test]
fn test_single_worker_holds_at_most_one_extra_value() {
    let outstanding = Outstanding::new();
    let input = transform_fn(30, |i| {
        outstanding.produced();
        Ok(i)
    });
    let group = TransformGroup::new(GroupConfig::with_max_in_flight(2).max_workers(1));
    let mut sink = CountingSink {
        outstanding: &outstanding,
        delay: Duration::from_millis(2),
        received: Vec::new(),
    };

    group.run_unordered(&input, &mut sink).unwrap();

    assert!(outstanding.peak.load(Ordering::SeqCst) <= 2 + 1 + 1);
    sink.received.sort();
    assert_eq!(sink.received, (0..30).collect::<Vec<_>>());
}

#[test]
fn test_large_input_runs_on_bounded_pool() {
    let input = transform_fn(60_000, Ok);
    let group = TransformGroup::default();
    let mut sink: Vec<usize> = Vec::with_capacity(60_000);

    let summary = group.run_unordered(&input, &mut sink).unwrap();

    assert_eq!(summary.tasks, 60_000);
    assert_eq!(summary.delivered, 60_000);
    assert!(summary.workers < 60_000);
    sink.sort_unstable();
    assert!(sink.iter().enumerate().all(|(i, v)| i == *v));
}

#[test]
fn test_live_tasks_never_exceed_max_workers() {
    let running = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    let input = transform_fn(64, |i| {
        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(2));
        running.fetch_sub(1, Ordering::SeqCst);
        Ok(i)
    });
    let group = TransformGroup::new(GroupConfig::default().max_workers(4));
    let mut sink: Vec<usize> = Vec::new();

    let summary = group.run_unordered(&input, &mut sink).unwrap();

    assert_eq!(summary.workers, 4);
    assert!(peak.load(Ordering::SeqCst) <= 4);
    assert_eq!(sink.len(), 64);
}

#[test]
fn test_cancelled_context_aborts_run() {
    let parent = Context::new();
    let (group, ctx) = TransformGroup::with_context(GroupConfig::default(), &parent);
    parent.cancel();
    assert!(ctx.is_cancelled());

    let mut sink: Vec<u64> = Vec::new();
    let err = group.run_unordered(&squares(&[1, 2, 3]), &mut sink).unwrap_err();

    assert!(matches!(err, TransformError::Cancelled));
    assert!(sink.is_empty());
}

#[test]
fn test_expired_deadline_aborts_run() {
    let parent = Context::with_deadline(Instant::now());
    let (group, _ctx) = TransformGroup::with_context(GroupConfig::default(), &parent);

    let mut sink: Vec<u64> = Vec::new();
    let err = group.run_unordered(&squares(&[1, 2]), &mut sink).unwrap_err();
    assert!(matches!(err, TransformError::DeadlineExceeded));
}

#[test]
fn test_failure_cancels_group_context_not_parent() {
    let parent = Context::new();
    let (group, ctx) = TransformGroup::with_context(GroupConfig::default(), &parent);
    let input = transform_fn(2, |i| -> anyhow::Result<usize> {
        if i == 0 {
            Err(anyhow!("nope"))
        } else {
            Ok(i)
        }
    });

    let mut sink: Vec<usize> = Vec::new();
    assert!(group.run_unordered(&input, &mut sink).is_err());
    assert!(ctx.is_cancelled());
    assert!(!parent.is_cancelled());
}

#[test]
fn test_fresh_context_per_run_without_group_context() {
    let group = TransformGroup::default();
    let failing = transform_fn(1, |_| -> anyhow::Result<u64> { Err(anyhow!("once")) });
    let mut sink: Vec<u64> = Vec::new();
    assert!(group.run_unordered(&failing, &mut sink).is_err());

    // A failed run leaves nothing behind for the next one.
    group.run_unordered(&squares(&[5]), &mut sink).unwrap();
    assert_eq!(sink, vec![25]);
}

#[test]
fn test_panicking_transform_is_reported() {
    let input = transform_fn(3, |i| {
        if i == 2 {
            panic!("transform blew up");
        }
        Ok(i)
    });
    let group = TransformGroup::default();
    let mut sink: Vec<usize> = Vec::new();

    let err = group.run_unordered(&input, &mut sink).unwrap_err();
    assert!(matches!(err, TransformError::Panicked));
}
