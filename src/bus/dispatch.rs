//! # Dispatch task: one publish call's unit of work.
//!
//! A [`DispatchTask`] bundles the event with the snapshot of subscriptions
//! that matched it at publish time. The snapshot is immutable: registry
//! mutation after the task was built — including a handler unsubscribing
//! itself mid-run — cannot affect it.
//!
//! ## Rules
//! - Handlers run in subscription registration order.
//! - Each handler invocation is isolated: a panic is caught, reported at
//!   `error` level, and the remaining handlers still run.
//! - Which thread runs the task is the
//!   [`TaskRunner`](crate::TaskRunner)'s choice, not the bus's.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

use crate::bus::subscription::Subscription;
use crate::events::Event;

/// Immutable (event, matching subscriptions) snapshot handed to a task runner.
pub struct DispatchTask {
    subscriptions: Vec<Subscription>,
    event: Event,
}

impl DispatchTask {
    pub(crate) fn new(subscriptions: Vec<Subscription>, event: Event) -> Self {
        Self {
            subscriptions,
            event,
        }
    }

    /// The event being delivered.
    #[inline]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Number of subscribers this task delivers to.
    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// `true` if the task has no subscribers (the bus never submits such a task).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Delivers the event to every snapshotted subscriber, in order.
    ///
    /// A panicking handler does not prevent delivery to the handlers after it.
    pub fn run(&self) {
        for sub in &self.subscriptions {
            let outcome = catch_unwind(AssertUnwindSafe(|| sub.deliver(&self.event)));
            if let Err(panic) = outcome {
                error!(
                    kind = ?self.event.kind(),
                    "subscriber panicked during dispatch: {}",
                    panic_message(&panic)
                );
            }
        }
    }
}

impl fmt::Display for DispatchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: consumed by {} subscriber(s)",
            self.event.kind(),
            self.subscriptions.len()
        )
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_runs_in_registration_order() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let subs = ["a", "b", "c"]
            .into_iter()
            .map(|name| {
                let seen = Arc::clone(&seen);
                Subscription::to(EventKind::Trace, move |_| {
                    seen.lock().unwrap().push(name);
                })
            })
            .collect();

        DispatchTask::new(subs, Event::Trace("x".into())).run();
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_panicking_handler_does_not_stop_delivery() {
        let hits = Arc::new(AtomicUsize::new(0));

        let boom = Subscription::to(EventKind::Trace, |_| panic!("boom"));
        let after = {
            let hits = Arc::clone(&hits);
            Subscription::to(EventKind::Trace, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        DispatchTask::new(vec![boom, after], Event::Trace("x".into())).run();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_display_names_kind_and_count() {
        let subs = vec![
            Subscription::to(EventKind::Trace, |_| {}),
            Subscription::to(EventKind::Trace, |_| {}),
        ];
        let task = DispatchTask::new(subs, Event::Trace("x".into()));
        assert_eq!(task.to_string(), "Trace: consumed by 2 subscriber(s)");
    }
}
