//! # Example: inline
//!
//! Smallest possible wiring: an [`InlineRunner`] executes every handler on
//! the publishing thread, so the output is fully deterministic.
//!
//! Shows how to:
//! - Subscribe plain handlers and filtered handlers to one category.
//! - Watch a single-fire category ([`EventKind::SyncDone`]) exhaust itself.
//!
//! ## Run
//! ```bash
//! cargo run --example inline
//! ```

use std::sync::Arc;

use bytes::Bytes;
use nodebus::{BlockSummary, Event, EventKind, InlineRunner, Publisher, Subscription, SyncState};

fn block(number: u64) -> Event {
    Event::BlockAdded(BlockSummary {
        number,
        hash: Bytes::new(),
        transactions: Vec::new(),
    })
}

fn main() {
    tracing_subscriber::fmt::init();

    let bus = Publisher::new(Arc::new(InlineRunner));

    bus.subscribe_to(EventKind::BlockAdded, |ev| {
        if let Event::BlockAdded(summary) = ev {
            println!("[every]   block #{}", summary.number);
        }
    });

    bus.subscribe(
        Subscription::to(EventKind::BlockAdded, |ev| {
            if let Event::BlockAdded(summary) = ev {
                println!("[even]    block #{}", summary.number);
            }
        })
        .conditionally(|ev| matches!(ev, Event::BlockAdded(s) if s.number % 2 == 0)),
    );

    bus.subscribe_to(EventKind::SyncDone, |ev| {
        if let Event::SyncDone(state) = ev {
            println!("[sync]    done: {state:?}");
        }
    });

    for number in 1..=4 {
        bus.publish(block(number));
    }

    println!("sync subscribers before: {}", bus.subscribers_count_of(EventKind::SyncDone));
    bus.publish(Event::SyncDone(SyncState::Complete));
    println!("sync subscribers after:  {}", bus.subscribers_count_of(EventKind::SyncDone));

    // Single-fire category is exhausted: this reaches nobody.
    bus.publish(Event::SyncDone(SyncState::Complete));
}
