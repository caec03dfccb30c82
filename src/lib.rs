//! # nodebus
//!
//! **nodebus** is a typed, concurrent publish/subscribe event bus for node
//! runtimes: it decouples producers of node-lifecycle notifications (peer
//! handshakes, wire traffic, imported blocks, pending-transaction changes,
//! sync completion) from their consumers, with exactly-once delivery per
//! matching subscriber and a pluggable execution strategy.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  Producers (any thread)                 Publisher                    TaskRunner
//!  ┌───────────┐                 ┌───────────────────────┐       ┌─────────────────┐
//!  │ discovery │─┐               │ registry              │       │ InlineRunner    │
//!  │ net / p2p │─┼─ publish(ev) ─►│ { kind → [subs] }    │──────►│ DispatchThread  │
//!  │ chain     │─┤               │                       │ task  │ TokioRunner     │
//!  │ pending   │─┘               │ 1. snapshot matching  │       └────────┬────────┘
//!  └───────────┘                 │ 2. retirement pass    │                │
//!                                │ 3. single-fire clear  │                ▼
//!  subscribe / unsubscribe ─────►│ 4. submit ≤1 task     │        handler(&Event)
//!  (any thread, any time)        └───────────────────────┘        per subscriber,
//!                                                                 registration order
//! ```
//!
//! ### Delivery semantics
//! - **Per-category snapshot**: each publish snapshots its category's
//!   matching subscribers under the registry lock; nothing that happens
//!   afterwards (unsubscribes, retirements, even from inside a handler)
//!   affects that in-flight task.
//! - **Single-fire kinds**: the first publish of a single-fire kind
//!   ([`EventKind::SyncDone`]) unconditionally clears the whole category.
//! - **Retirement rules**: a per-subscription predicate evaluated on every
//!   publish of its kind — matched or not — that unsubscribes the
//!   subscription when true.
//! - **Ordering**: within one task, registration order; across publishes,
//!   whatever the runner guarantees; across categories, nothing.
//!
//! ## Features
//! | Area            | Description                                              | Key types                              |
//! |-----------------|----------------------------------------------------------|----------------------------------------|
//! | **Bus**         | Registry, publish/subscribe/unsubscribe, counts.         | [`Publisher`]                          |
//! | **Subscriptions**| Fluent filter + retirement refinement, identity dedup.  | [`Subscription`], [`Handler`]          |
//! | **Dispatch**    | Immutable per-publish unit, per-handler panic isolation. | [`DispatchTask`]                       |
//! | **Runners**     | Inline, serialized thread, tokio blocking pool.          | [`TaskRunner`], [`DispatchThread`]     |
//! | **Events**      | Tagged payloads keyed by a static category.              | [`Event`], [`EventKind`]               |
//! | **Wire**        | Shared frame codec + reference message kind.             | [`wire`], [`GetBlockHashes`]           |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use nodebus::{Event, EventKind, InlineRunner, Publisher, Subscription};
//!
//! let bus = Publisher::new(Arc::new(InlineRunner));
//!
//! // Every imported block.
//! bus.subscribe_to(EventKind::BlockAdded, |ev| {
//!     if let Event::BlockAdded(block) = ev {
//!         println!("block #{}", block.number);
//!     }
//! });
//!
//! // Only new chain heads, and stop listening above height 1_000_000.
//! bus.subscribe(
//!     Subscription::to(EventKind::BestBlockAdded, |ev| {
//!         if let Event::BestBlockAdded { summary, .. } = ev {
//!             println!("new head #{}", summary.number);
//!         }
//!     })
//!     .conditionally(|ev| matches!(ev, Event::BestBlockAdded { best: true, .. }))
//!     .retire_after(|ev| {
//!         matches!(ev, Event::BestBlockAdded { summary, .. } if summary.number > 1_000_000)
//!     }),
//! );
//!
//! bus.publish(Event::BlockAdded(nodebus::BlockSummary {
//!     number: 1,
//!     hash: bytes::Bytes::new(),
//!     transactions: Vec::new(),
//! }));
//! ```

mod bus;
mod error;
mod events;
mod runners;
pub mod wire;

// ---- Public re-exports ----

pub use bus::{DispatchTask, Handler, Predicate, Publisher, Subscription};
pub use error::DecodeError;
pub use events::types::{
    BlockSummary, ExecutionSummary, HelloInfo, NodeHandle, PeerHandle, PendingSnapshot,
    PendingTxState, StatusInfo, SyncState, Transaction, TransactionReceipt,
};
pub use events::{Event, EventKind};
pub use runners::{DispatchThread, InlineRunner, TaskRunner, TokioRunner};
pub use wire::{Command, GetBlockHashes, WireMessage};
