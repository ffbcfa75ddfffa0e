use crossbeam::channel::Receiver;
use crossbeam::select;

/// Group-level verdict sent by the waiter once every task has exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    Succeeded,
    Failed,
}

/// What the merge loop saw before it reached a terminal state
#[derive(Debug)]
pub(crate) struct MergeReport {
    pub completion: Completion,
    pub delivered: usize,
    pub peak_buffered: usize,
}

/// Single consumer racing "a value is ready" against "the group is done".
///
/// Returning drops `out_rx`, which releases any producer still blocked on a
/// full channel.
pub(crate) fn merge<T, F>(
    out_rx: Receiver<(usize, T)>,
    done_rx: Receiver<Completion>,
    mut deliver: F,
) -> MergeReport
where
    F: FnMut(usize, T),
{
    let mut report = MergeReport {
        completion: Completion::Failed,
        delivered: 0,
        peak_buffered: 0,
    };

    loop {
        report.peak_buffered = report.peak_buffered.max(out_rx.len());

        select! {
            recv(done_rx) -> signal => {
                // A vanished waiter counts as failure; the caller resolves why.
                if signal != Ok(Completion::Succeeded) {
                    tracing::trace!("merge loop observed failure, abandoning {} buffered values", out_rx.len());
                    return report;
                }
                // Every producer has exited, so whatever is buffered is all there is.
                for (index, value) in out_rx.try_iter() {
                    deliver(index, value);
                    report.delivered += 1;
                }
                report.completion = Completion::Succeeded;
                return report;
            }
            recv(out_rx) -> message => match message {
                Ok((index, value)) => {
                    tracing::trace!("delivering value from task {}", index);
                    deliver(index, value);
                    report.delivered += 1;
                }
                Err(_) => {
                    // All senders are gone; only the verdict is left to read.
                    if done_rx.recv() == Ok(Completion::Succeeded) {
                        report.completion = Completion::Succeeded;
                    }
                    return report;
                }
            },
        }
    }
}
