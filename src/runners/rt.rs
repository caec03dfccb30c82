//! Dispatch on a tokio runtime.

use tokio::runtime;

use crate::bus::DispatchTask;
use crate::runners::TaskRunner;

/// Submits each dispatch task to a tokio runtime's blocking pool.
///
/// Handlers are synchronous closures, so they go through
/// [`spawn_blocking`](runtime::Handle::spawn_blocking) rather than onto the
/// async workers. Tasks from separate publishes may run concurrently: this
/// runner gives **no cross-publish ordering guarantee**, only the in-task
/// registration order every runner preserves. Use
/// [`DispatchThread`](crate::DispatchThread) when cross-publish order
/// matters.
#[derive(Debug, Clone)]
pub struct TokioRunner {
    handle: runtime::Handle,
}

impl TokioRunner {
    /// Wraps an explicit runtime handle.
    pub fn new(handle: runtime::Handle) -> Self {
        Self { handle }
    }

    /// Captures the current runtime's handle.
    ///
    /// Panics (in [`runtime::Handle::current`]) when called outside a tokio
    /// runtime.
    pub fn current() -> Self {
        Self::new(runtime::Handle::current())
    }
}

impl TaskRunner for TokioRunner {
    fn execute(&self, task: DispatchTask) {
        // Fire-and-forget: the bus neither joins nor observes task completion.
        let _ = self.handle.spawn_blocking(move || task.run());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::bus::Publisher;
    use crate::events::{Event, EventKind};

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delivers_off_the_publishing_task() {
        let bus = Publisher::new(Arc::new(TokioRunner::current()));

        let hits = Arc::new(AtomicUsize::new(0));
        {
            let hits = Arc::clone(&hits);
            bus.subscribe_to(EventKind::Trace, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        bus.publish(Event::Trace("ping".into()));

        for _ in 0..100 {
            if hits.load(Ordering::SeqCst) == 1 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("event was not delivered within a second");
    }
}
