//! # Subscriptions: handler + optional filter + optional retirement rule.
//!
//! A [`Subscription`] binds one [`EventKind`] to one handler closure. Two
//! optional predicates refine it:
//! - a **filter** ([`conditionally`](Subscription::conditionally)) decides
//!   whether a published event is delivered to the handler;
//! - a **retirement rule** ([`retire_after`](Subscription::retire_after)) is
//!   evaluated on *every* publish of the kind, matched or not, and removes
//!   the subscription from the bus when it returns `true`.
//!
//! ## Identity and deduplication
//! Equality is defined by `(kind, handler allocation)` only — predicates are
//! not part of the key. Registering "the same handler, different filter" for
//! one kind is therefore a duplicate and the bus rejects it; use a distinct
//! handler allocation to register the same callback twice. This guards
//! against accidental re-registration while still letting one callback carry
//! a custom filter.
//!
//! ## Refinement after registration
//! A `Subscription` is a cheap handle over shared state: the value returned
//! by [`Publisher::subscribe_to`](crate::Publisher::subscribe_to) and the
//! copy held in the registry see the same predicates. Attaching a filter
//! after registration is race-safe against concurrent publishes — a publish
//! observes either the old or the new predicate, never a torn one.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::events::{Event, EventKind};

/// Shared handler closure invoked with each delivered event.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Shared predicate over an event, used for filters and retirement rules.
pub type Predicate = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

struct Inner {
    kind: EventKind,
    handler: Handler,
    filter: RwLock<Option<Predicate>>,
    retire: RwLock<Option<Predicate>>,
}

/// One registered (or registerable) binding of an event kind to a handler.
///
/// Cloning is cheap and yields a handle to the *same* subscription: clones
/// compare equal and share predicate state.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

impl Subscription {
    /// Creates a subscription for `kind` delivering to `handler`.
    ///
    /// ```
    /// use nodebus::{Event, EventKind, Subscription};
    ///
    /// let sub = Subscription::to(EventKind::BlockAdded, |ev| {
    ///     if let Event::BlockAdded(block) = ev {
    ///         println!("imported block #{}", block.number);
    ///     }
    /// });
    /// assert_eq!(sub.kind(), EventKind::BlockAdded);
    /// ```
    pub fn to(kind: EventKind, handler: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        Self::with_handler(kind, Arc::new(handler))
    }

    /// Creates a subscription from an already-shared [`Handler`].
    ///
    /// Use this when the handler allocation must be reused — identity-based
    /// deduplication compares the allocation, so two subscriptions built from
    /// the same `Handler` clone are equal.
    pub fn with_handler(kind: EventKind, handler: Handler) -> Self {
        Self {
            inner: Arc::new(Inner {
                kind,
                handler,
                filter: RwLock::new(None),
                retire: RwLock::new(None),
            }),
        }
    }

    /// Attaches a delivery filter: the handler only fires for events the
    /// predicate accepts.
    ///
    /// May be called before or after registration; the registered copy sees
    /// the new predicate.
    pub fn conditionally(self, filter: impl Fn(&Event) -> bool + Send + Sync + 'static) -> Self {
        *lock_write(&self.inner.filter) = Some(Arc::new(filter));
        self
    }

    /// Attaches a retirement rule: on any publish of this kind for which the
    /// predicate returns `true`, the subscription is unsubscribed — whether
    /// or not that event was delivered to its handler.
    pub fn retire_after(self, retire: impl Fn(&Event) -> bool + Send + Sync + 'static) -> Self {
        *lock_write(&self.inner.retire) = Some(Arc::new(retire));
        self
    }

    /// Retires on the next publish of this kind, regardless of matching.
    pub fn oneshot(self) -> Self {
        self.retire_after(|_| true)
    }

    /// The event kind this subscription listens to.
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.inner.kind
    }

    /// Whether `event` passes the delivery filter (no filter accepts all).
    pub(crate) fn matches(&self, event: &Event) -> bool {
        match &*lock_read(&self.inner.filter) {
            Some(filter) => filter(event),
            None => true,
        }
    }

    /// Whether this publish retires the subscription (default: never).
    pub(crate) fn should_retire(&self, event: &Event) -> bool {
        match &*lock_read(&self.inner.retire) {
            Some(retire) => retire(event),
            None => false,
        }
    }

    /// Invokes the handler. Callers are expected to have filtered already.
    pub(crate) fn deliver(&self, event: &Event) {
        (self.inner.handler)(event);
    }

    fn handler_ptr(&self) -> *const () {
        Arc::as_ptr(&self.inner.handler) as *const ()
    }
}

// Identity: same kind + same handler allocation. Predicates excluded.
impl PartialEq for Subscription {
    fn eq(&self, other: &Self) -> bool {
        self.inner.kind == other.inner.kind && self.handler_ptr() == other.handler_ptr()
    }
}

impl Eq for Subscription {}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.inner.kind)
            .field("handler", &self.handler_ptr())
            .field("filtered", &lock_read(&self.inner.filter).is_some())
            .field("retires", &lock_read(&self.inner.retire).is_some())
            .finish()
    }
}

// A poisoned predicate lock only means a predicate panicked mid-evaluation;
// the Option itself is still structurally sound.
fn lock_read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn lock_write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
