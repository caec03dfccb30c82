//! Synchronous in-place execution.

use crate::bus::DispatchTask;
use crate::runners::TaskRunner;

/// Runs each dispatch task on the publishing thread, before `publish` returns.
///
/// Fully deterministic: handlers complete in registration order and
/// cross-publish order equals publish order. The right choice for tests and
/// for embedders that want no concurrency at all. Handlers block the
/// publisher for their full duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineRunner;

impl TaskRunner for InlineRunner {
    fn execute(&self, task: DispatchTask) {
        task.run();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::bus::Subscription;
    use crate::events::{Event, EventKind};

    #[test]
    fn test_completes_before_returning() {
        let hits = Arc::new(AtomicUsize::new(0));
        let sub = {
            let hits = Arc::clone(&hits);
            Subscription::to(EventKind::Trace, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        InlineRunner.execute(DispatchTask::new(vec![sub], Event::Trace("x".into())));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
