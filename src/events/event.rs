//! # Node-lifecycle events and their categories.
//!
//! [`Event`] is an immutable tagged payload: one variant per notification the
//! node runtime emits (discovery, handshakes, wire traffic, blocks, pending
//! transactions, sync). [`EventKind`] is the field-less tag of a variant and
//! serves as the registry key inside the [`Publisher`](crate::Publisher) —
//! two events share a category iff they carry the same kind, never by value
//! equality of their payload.
//!
//! ## Single-fire kinds
//! A kind can be **single-fire**: the first publish of such an event clears
//! every subscriber of that category, permanently ending delivery until new
//! subscriptions are added. This is a structural property of the kind
//! ([`EventKind::is_single_fire`]), not a per-instance flag. [`SyncDone`]
//! is the only single-fire kind: full sync completes once per process.
//!
//! [`SyncDone`]: EventKind::SyncDone

use bytes::Bytes;

use crate::events::types::{
    BlockSummary, ExecutionSummary, HelloInfo, NodeHandle, PeerHandle, PendingSnapshot,
    PendingTxState, StatusInfo, SyncState, Transaction, TransactionReceipt,
};
use crate::wire::Command;

/// Category tag of an [`Event`]; the registry key.
///
/// Statically known per variant — dispatch never inspects payload types at
/// runtime, it matches on this tag alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Free-form diagnostic trace line.
    Trace,
    /// Discovery found a new node.
    NodeDiscovered,
    /// Handshake with a peer completed.
    PeerHandshaked,
    /// A peer refreshed its chain status.
    StatusUpdated,
    /// A wire message arrived from a peer.
    MessageReceived,
    /// A wire message was sent to a peer.
    MessageSent,
    /// A peer connection was closed.
    PeerDisconnected,
    /// A handshaked peer joined the sync pool.
    PeerAddedToSyncPool,
    /// The node lost its last active connection.
    NoConnections,
    /// A block was imported into the chain.
    BlockAdded,
    /// A block was imported and may be the new best block.
    BestBlockAdded,
    /// New transactions entered the pending set.
    PendingTransactionsReceived,
    /// The pending state was rebuilt.
    PendingStateChanged,
    /// A single pending transaction changed state.
    PendingTransactionUpdated,
    /// A transaction finished executing.
    TransactionExecuted,
    /// The VM produced a trace for a transaction.
    VmTraceCreated,
    /// Long-range sync completed. Single-fire.
    SyncDone,
}

impl EventKind {
    /// Returns `true` for kinds whose first publish clears the whole category.
    #[inline]
    pub fn is_single_fire(self) -> bool {
        matches!(self, EventKind::SyncDone)
    }
}

/// An immutable node-lifecycle notification.
///
/// Constructed by a producer immediately before
/// [`publish`](crate::Publisher::publish); after dispatch it is owned by at
/// most one [`DispatchTask`](crate::DispatchTask) and never retained by the
/// bus. Payload values are opaque to the bus.
#[derive(Debug, Clone)]
pub enum Event {
    /// Diagnostic trace output.
    Trace(String),
    /// Discovery found a node.
    NodeDiscovered(NodeHandle),
    /// Handshake completed with `peer`, which greeted with `hello`.
    PeerHandshaked {
        /// The connected peer.
        peer: PeerHandle,
        /// Its handshake greeting.
        hello: HelloInfo,
    },
    /// `peer` advertised a new chain `status`.
    StatusUpdated {
        /// The reporting peer.
        peer: PeerHandle,
        /// Its refreshed status.
        status: StatusInfo,
    },
    /// An encoded frame arrived from `peer`.
    MessageReceived {
        /// The sending peer.
        peer: PeerHandle,
        /// Command the frame carries.
        command: Command,
        /// Raw encoded frame.
        payload: Bytes,
    },
    /// An encoded frame was sent to `peer`.
    MessageSent {
        /// The receiving peer.
        peer: PeerHandle,
        /// Command the frame carries.
        command: Command,
        /// Raw encoded frame.
        payload: Bytes,
    },
    /// The connection to `host:port` was closed.
    PeerDisconnected {
        /// Remote host.
        host: String,
        /// Remote port.
        port: u16,
    },
    /// A handshaked peer became usable for sync.
    PeerAddedToSyncPool(PeerHandle),
    /// The node has no active connections left.
    NoConnections,
    /// A block was imported.
    BlockAdded(BlockSummary),
    /// A block was imported; `best` marks a new chain head.
    BestBlockAdded {
        /// The imported block.
        summary: BlockSummary,
        /// Whether it became the best block.
        best: bool,
    },
    /// Transactions entered the pending set.
    PendingTransactionsReceived(Vec<Transaction>),
    /// The pending state was rebuilt.
    PendingStateChanged(PendingSnapshot),
    /// One pending transaction moved to a new state.
    PendingTransactionUpdated {
        /// Receipt produced for the transaction.
        receipt: TransactionReceipt,
        /// Its new lifecycle state.
        state: PendingTxState,
        /// Block that triggered the update.
        block: BlockSummary,
    },
    /// A transaction finished executing.
    TransactionExecuted(ExecutionSummary),
    /// The VM produced `trace` for `tx_hash`.
    VmTraceCreated {
        /// Hash of the traced transaction.
        tx_hash: Bytes,
        /// Rendered trace.
        trace: String,
    },
    /// Long-range sync finished in the given state. Single-fire.
    SyncDone(SyncState),
}

impl Event {
    /// Returns the category tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Trace(_) => EventKind::Trace,
            Event::NodeDiscovered(_) => EventKind::NodeDiscovered,
            Event::PeerHandshaked { .. } => EventKind::PeerHandshaked,
            Event::StatusUpdated { .. } => EventKind::StatusUpdated,
            Event::MessageReceived { .. } => EventKind::MessageReceived,
            Event::MessageSent { .. } => EventKind::MessageSent,
            Event::PeerDisconnected { .. } => EventKind::PeerDisconnected,
            Event::PeerAddedToSyncPool(_) => EventKind::PeerAddedToSyncPool,
            Event::NoConnections => EventKind::NoConnections,
            Event::BlockAdded(_) => EventKind::BlockAdded,
            Event::BestBlockAdded { .. } => EventKind::BestBlockAdded,
            Event::PendingTransactionsReceived(_) => EventKind::PendingTransactionsReceived,
            Event::PendingStateChanged(_) => EventKind::PendingStateChanged,
            Event::PendingTransactionUpdated { .. } => EventKind::PendingTransactionUpdated,
            Event::TransactionExecuted(_) => EventKind::TransactionExecuted,
            Event::VmTraceCreated { .. } => EventKind::VmTraceCreated,
            Event::SyncDone(_) => EventKind::SyncDone,
        }
    }

    /// Shorthand for `self.kind().is_single_fire()`.
    #[inline]
    pub fn is_single_fire(&self) -> bool {
        self.kind().is_single_fire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let ev = Event::Trace("hello".into());
        assert_eq!(ev.kind(), EventKind::Trace);

        let ev = Event::SyncDone(SyncState::Complete);
        assert_eq!(ev.kind(), EventKind::SyncDone);
    }

    #[test]
    fn test_only_sync_done_is_single_fire() {
        assert!(EventKind::SyncDone.is_single_fire());
        assert!(!EventKind::Trace.is_single_fire());
        assert!(!EventKind::BlockAdded.is_single_fire());
        assert!(!EventKind::NoConnections.is_single_fire());
    }
}
