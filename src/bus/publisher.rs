//! # Event publisher: the bus registry and its publish/subscribe protocol.
//!
//! [`Publisher`] owns the category → subscription-list registry and delegates
//! execution of each publish's deliveries to an injected
//! [`TaskRunner`](crate::TaskRunner).
//!
//! ## Architecture
//! ```text
//! Producers (any thread):            Consumers:
//!   discovery ──┐
//!   net/p2p   ──┼── publish(Event) ──► Publisher ── DispatchTask ──► TaskRunner
//!   chain     ──┤                        │                             │
//!   pending   ──┘                        │ registry                    └─► handler(&Event)
//!                                        ▼                                 (per subscriber,
//!                            { EventKind → [Subscription] }                 registration order)
//! ```
//!
//! ## Publish protocol (atomic per category)
//! 1. No bucket for the event's kind → no-op.
//! 2. Snapshot the order-preserving subset whose filter accepts the event.
//! 3. Retirement pass over **every** subscription in the bucket, matched or
//!    not: `retire(event)` true → unsubscribed by this publish.
//! 4. Single-fire kind → the whole bucket is removed unconditionally.
//! 5. Non-empty snapshot → exactly one [`DispatchTask`] goes to the runner.
//!
//! ## Rules
//! - `publish` never blocks on handler execution; the registry lock is
//!   released before the runner sees the task.
//! - Duplicate subscription (same kind + handler allocation) is a logged
//!   no-op, never an error. So are unknown unsubscribes and subscriber-less
//!   publishes.
//! - A bucket exists iff it is non-empty; counts reflect that.
//! - Handlers may subscribe/unsubscribe (including themselves) freely: the
//!   in-flight snapshot is unaffected.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{trace, warn};

use crate::bus::dispatch::DispatchTask;
use crate::bus::subscription::{Handler, Subscription};
use crate::events::{Event, EventKind};
use crate::runners::TaskRunner;

type Registry = HashMap<EventKind, Vec<Subscription>>;

/// Concurrent publish/subscribe event bus keyed by [`EventKind`].
///
/// All methods take `&self` and are callable from any thread. The publisher
/// holds no execution machinery of its own: scheduling of handler invocations
/// belongs entirely to the injected runner.
///
/// ```
/// use std::sync::Arc;
/// use nodebus::{Event, EventKind, InlineRunner, Publisher, Subscription, SyncState};
///
/// let bus = Publisher::new(Arc::new(InlineRunner));
/// bus.subscribe(Subscription::to(EventKind::SyncDone, |ev| {
///     if let Event::SyncDone(state) = ev {
///         println!("sync finished: {state:?}");
///     }
/// }));
///
/// bus.publish(Event::SyncDone(SyncState::Complete));
/// // SyncDone is single-fire: its first publish cleared the category.
/// assert_eq!(bus.subscribers_count(), 0);
/// ```
pub struct Publisher {
    registry: RwLock<Registry>,
    runner: Arc<dyn TaskRunner>,
}

impl Publisher {
    /// Creates a bus that hands dispatch tasks to `runner`.
    pub fn new(runner: Arc<dyn TaskRunner>) -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
            runner,
        }
    }

    /// Registers `subscription` under its kind.
    ///
    /// An equal subscription already present (same kind + handler allocation)
    /// makes this a no-op, logged at `warn` — duplicates are diagnosable, not
    /// failures. Returns `&self` for fluent chaining.
    pub fn subscribe(&self, subscription: Subscription) -> &Self {
        let mut registry = self.write();
        let bucket = registry.entry(subscription.kind()).or_default();
        if bucket.contains(&subscription) {
            warn!(kind = ?subscription.kind(), "subscription already exists, ignoring");
        } else {
            bucket.push(subscription);
        }
        self
    }

    /// Builds a subscription for `(kind, handler)`, registers it, and returns
    /// the handle so the caller can refine it further.
    ///
    /// Refinement after registration is race-safe: the registered copy shares
    /// predicate state with the returned handle.
    pub fn subscribe_to(
        &self,
        kind: EventKind,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> Subscription {
        let subscription = Subscription::to(kind, handler);
        self.subscribe(subscription.clone());
        subscription
    }

    /// Shared-allocation variant of [`subscribe_to`](Self::subscribe_to), for
    /// callers that reuse one [`Handler`] across kinds.
    pub fn subscribe_handler(&self, kind: EventKind, handler: Handler) -> Subscription {
        let subscription = Subscription::with_handler(kind, handler);
        self.subscribe(subscription.clone());
        subscription
    }

    /// Removes `subscription` from its kind's bucket, dropping the bucket if
    /// it becomes empty. Unknown subscriptions are a no-op.
    pub fn unsubscribe(&self, subscription: &Subscription) -> &Self {
        let mut registry = self.write();
        if let Some(bucket) = registry.get_mut(&subscription.kind()) {
            bucket.retain(|existing| existing != subscription);
            if bucket.is_empty() {
                registry.remove(&subscription.kind());
            }
        }
        self
    }

    /// Publishes `event` to its category's subscribers.
    ///
    /// Applies the retirement pass and single-fire removal, then submits at
    /// most one [`DispatchTask`] to the runner. Returns before (and without
    /// any guarantee of) the task completing.
    ///
    /// Filter and retirement predicates run under the registry lock and must
    /// not call back into the bus; handlers run outside it and may.
    pub fn publish(&self, event: Event) -> &Self {
        let kind = event.kind();

        let task = {
            let mut registry = self.write();
            let Some(bucket) = registry.get_mut(&kind) else {
                return self;
            };

            let matching: Vec<Subscription> = bucket
                .iter()
                .filter(|sub| sub.matches(&event))
                .cloned()
                .collect();

            // Retirement is independent of matching: evaluated for every
            // subscription of the kind, even ones the filter just rejected.
            bucket.retain(|sub| !sub.should_retire(&event));

            if kind.is_single_fire() || bucket.is_empty() {
                registry.remove(&kind);
            }

            if matching.is_empty() {
                None
            } else {
                Some(DispatchTask::new(matching, event))
            }
        };

        if let Some(task) = task {
            trace!(%task, "submitting dispatch task");
            self.runner.execute(task);
        }
        self
    }

    /// Number of subscriptions currently registered for `kind`.
    pub fn subscribers_count_of(&self, kind: EventKind) -> usize {
        self.read().get(&kind).map_or(0, Vec::len)
    }

    /// Total number of subscriptions across all kinds.
    ///
    /// A snapshot taken at call time; under concurrent mutation the value is
    /// approximate by nature.
    pub fn subscribers_count(&self) -> usize {
        self.read().values().map(Vec::len).sum()
    }

    // A poisoned lock only means a predicate panicked mid-publish; the map
    // itself is still structurally sound.
    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("subscribers", &self.subscribers_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, OnceLock};

    use super::*;
    use crate::events::types::{BlockSummary, SyncState};
    use crate::runners::InlineRunner;

    fn inline_bus() -> Publisher {
        Publisher::new(Arc::new(InlineRunner))
    }

    fn block(number: u64) -> Event {
        Event::BlockAdded(BlockSummary {
            number,
            hash: bytes::Bytes::new(),
            transactions: Vec::new(),
        })
    }

    fn block_number(ev: &Event) -> u64 {
        match ev {
            Event::BlockAdded(summary) => summary.number,
            other => panic!("unexpected event {other:?}"),
        }
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&Event) + Send + Sync + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = {
            let hits = Arc::clone(&hits);
            move |_: &Event| {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        };
        (hits, handler)
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = inline_bus();
        bus.publish(block(1));
        assert_eq!(bus.subscribers_count(), 0);
    }

    #[test]
    fn test_duplicate_subscription_delivers_once() {
        let bus = inline_bus();
        let (hits, handler) = counter();
        let handler: Handler = Arc::new(handler);

        bus.subscribe(Subscription::with_handler(
            EventKind::BlockAdded,
            handler.clone(),
        ));
        bus.subscribe(Subscription::with_handler(EventKind::BlockAdded, handler));

        assert_eq!(bus.subscribers_count_of(EventKind::BlockAdded), 1);
        bus.publish(block(1));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_with_different_filter_is_still_rejected() {
        let bus = inline_bus();
        let (hits, handler) = counter();
        let handler: Handler = Arc::new(handler);

        bus.subscribe(Subscription::with_handler(
            EventKind::BlockAdded,
            handler.clone(),
        ));
        bus.subscribe(Subscription::with_handler(EventKind::BlockAdded, handler).conditionally(|_| false));

        assert_eq!(bus.subscribers_count_of(EventKind::BlockAdded), 1);
        bus.publish(block(7));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_predicate_filters_delivery() {
        let bus = inline_bus();
        let delivered = Arc::new(Mutex::new(Vec::new()));

        let sub = {
            let delivered = Arc::clone(&delivered);
            Subscription::to(EventKind::BlockAdded, move |ev| {
                delivered.lock().unwrap().push(block_number(ev));
            })
            .conditionally(|ev| block_number(ev) % 2 == 0)
        };
        bus.subscribe(sub);

        for number in 1..=6 {
            bus.publish(block(number));
        }
        assert_eq!(*delivered.lock().unwrap(), vec![2, 4, 6]);
    }

    #[test]
    fn test_delivery_follows_registration_order() {
        let bus = inline_bus();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["a", "b", "c"] {
            let order = Arc::clone(&order);
            bus.subscribe_to(EventKind::BlockAdded, move |_| {
                order.lock().unwrap().push(name);
            });
        }

        bus.publish(block(1));
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_single_fire_exhausts_category() {
        let bus = inline_bus();
        let (hits_a, handler_a) = counter();
        let (hits_b, handler_b) = counter();

        bus.subscribe_to(EventKind::SyncDone, handler_a);
        bus.subscribe_to(EventKind::SyncDone, handler_b);
        assert_eq!(bus.subscribers_count_of(EventKind::SyncDone), 2);

        bus.publish(Event::SyncDone(SyncState::Complete));
        assert_eq!(hits_a.load(Ordering::SeqCst), 1);
        assert_eq!(hits_b.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscribers_count_of(EventKind::SyncDone), 0);

        // Category cleared: the second publish reaches nobody.
        bus.publish(Event::SyncDone(SyncState::Complete));
        assert_eq!(hits_a.load(Ordering::SeqCst), 1);
        assert_eq!(hits_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_single_fire_clears_even_without_matches() {
        let bus = inline_bus();
        let (hits, handler) = counter();

        let sub = Subscription::to(EventKind::SyncDone, handler).conditionally(|_| false);
        bus.subscribe(sub);

        bus.publish(Event::SyncDone(SyncState::Complete));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscribers_count_of(EventKind::SyncDone), 0);
    }

    #[test]
    fn test_resubscribing_after_single_fire_resumes_delivery() {
        let bus = inline_bus();
        let (first, handler) = counter();
        bus.subscribe_to(EventKind::SyncDone, handler);
        bus.publish(Event::SyncDone(SyncState::Unsecure));
        assert_eq!(first.load(Ordering::SeqCst), 1);

        let (second, handler) = counter();
        bus.subscribe_to(EventKind::SyncDone, handler);
        bus.publish(Event::SyncDone(SyncState::Complete));
        assert_eq!(second.load(Ordering::SeqCst), 1);
        // The earlier subscriber stayed cleared.
        assert_eq!(first.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retirement_is_independent_of_matching() {
        let bus = inline_bus();
        let (hits, handler) = counter();

        let sub = Subscription::to(EventKind::BlockAdded, handler)
            .conditionally(|ev| block_number(ev) > 100)
            .retire_after(|ev| block_number(ev) == 5);
        bus.subscribe(sub);

        // Rejected by the filter, but the retirement rule still fires.
        bus.publish(block(5));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscribers_count_of(EventKind::BlockAdded), 0);
    }

    #[test]
    fn test_retired_subscription_is_still_delivered_that_publish() {
        let bus = inline_bus();
        let (hits, handler) = counter();

        let sub = Subscription::to(EventKind::BlockAdded, handler).oneshot();
        bus.subscribe(sub);

        bus.publish(block(1));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscribers_count_of(EventKind::BlockAdded), 0);

        bus.publish(block(2));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_unknown_is_noop() {
        let bus = inline_bus();
        let never_registered = Subscription::to(EventKind::Trace, |_| {});
        bus.unsubscribe(&never_registered);
        assert_eq!(bus.subscribers_count(), 0);
    }

    #[test]
    fn test_category_cleanup_on_last_unsubscribe() {
        let bus = inline_bus();
        let sub = bus.subscribe_to(EventKind::Trace, |_| {});
        assert_eq!(bus.subscribers_count_of(EventKind::Trace), 1);

        bus.unsubscribe(&sub);
        assert_eq!(bus.subscribers_count_of(EventKind::Trace), 0);
        assert_eq!(bus.subscribers_count(), 0);

        // Publishing into the removed category stays a no-op.
        bus.publish(Event::Trace("x".into()));
    }

    #[test]
    fn test_handler_unsubscribing_sibling_does_not_affect_snapshot() {
        let bus = Arc::new(inline_bus());
        let (hits_b, handler_b) = counter();
        let sub_b = Subscription::to(EventKind::BlockAdded, handler_b);

        // A unsubscribes B during its own invocation; B is already in the
        // snapshot for this publish and must still be delivered to.
        let sub_a = {
            let bus = Arc::clone(&bus);
            let sub_b = sub_b.clone();
            Subscription::to(EventKind::BlockAdded, move |_| {
                bus.unsubscribe(&sub_b);
            })
        };

        bus.subscribe(sub_a);
        bus.subscribe(sub_b);

        bus.publish(block(1));
        assert_eq!(hits_b.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscribers_count_of(EventKind::BlockAdded), 1);

        bus.publish(block(2));
        assert_eq!(hits_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_unsubscribing_itself_is_safe() {
        let bus = Arc::new(inline_bus());
        let slot: Arc<OnceLock<Subscription>> = Arc::new(OnceLock::new());
        let (hits, _) = counter();

        let sub = {
            let bus = Arc::clone(&bus);
            let slot = Arc::clone(&slot);
            let hits = Arc::clone(&hits);
            Subscription::to(EventKind::BlockAdded, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
                if let Some(me) = slot.get() {
                    bus.unsubscribe(me);
                }
            })
        };
        slot.set(sub.clone()).ok();
        bus.subscribe(sub);

        bus.publish(block(1));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscribers_count_of(EventKind::BlockAdded), 0);

        bus.publish(block(2));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_refinement_after_registration_is_visible() {
        let bus = inline_bus();
        let (hits, handler) = counter();

        let sub = bus.subscribe_to(EventKind::BlockAdded, handler);
        let _sub = sub.conditionally(|_| false);

        bus.publish(block(1));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_counts_across_kinds() {
        let bus = inline_bus();
        bus.subscribe_to(EventKind::Trace, |_| {});
        bus.subscribe_to(EventKind::Trace, |_| {});
        bus.subscribe_to(EventKind::BlockAdded, |_| {});

        assert_eq!(bus.subscribers_count_of(EventKind::Trace), 2);
        assert_eq!(bus.subscribers_count_of(EventKind::BlockAdded), 1);
        assert_eq!(bus.subscribers_count_of(EventKind::SyncDone), 0);
        assert_eq!(bus.subscribers_count(), 3);
    }

    #[test]
    fn test_concurrent_publish_and_churn() {
        let bus = Arc::new(inline_bus());
        let (hits, handler) = counter();
        bus.subscribe_to(EventKind::BlockAdded, handler);

        let publishers: Vec<_> = (0..4)
            .map(|_| {
                let bus = Arc::clone(&bus);
                std::thread::spawn(move || {
                    for number in 0..100 {
                        bus.publish(block(number));
                    }
                })
            })
            .collect();

        // Unrelated churn on another kind while publishes are in flight.
        let churn = {
            let bus = Arc::clone(&bus);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let sub = bus.subscribe_to(EventKind::Trace, |_| {});
                    bus.unsubscribe(&sub);
                }
            })
        };

        for handle in publishers {
            handle.join().unwrap();
        }
        churn.join().unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 400);
        assert_eq!(bus.subscribers_count_of(EventKind::Trace), 0);
    }

    #[test]
    fn test_lifecycle_scenario() {
        // Two listeners on a persistent kind, one on the single-fire kind.
        let bus = inline_bus();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["a", "b"] {
            let order = Arc::clone(&order);
            bus.subscribe_to(EventKind::BlockAdded, move |ev| {
                order.lock().unwrap().push((name, block_number(ev)));
            });
        }
        bus.publish(block(1));
        assert_eq!(*order.lock().unwrap(), vec![("a", 1), ("b", 1)]);

        let (sync_hits, handler) = counter();
        bus.subscribe_to(EventKind::SyncDone, handler);

        bus.publish(Event::SyncDone(SyncState::Complete));
        assert_eq!(sync_hits.load(Ordering::SeqCst), 1);

        bus.publish(Event::SyncDone(SyncState::Complete));
        assert_eq!(sync_hits.load(Ordering::SeqCst), 1);

        // The persistent kind is unaffected by the single-fire clear.
        bus.publish(block(2));
        assert_eq!(order.lock().unwrap().len(), 4);
    }
}
