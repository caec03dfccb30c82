//! # Example: dispatch_thread
//!
//! Production-style wiring: a [`DispatchThread`] runs all handlers on one
//! named worker thread, off the publishers' threads, preserving
//! cross-publish order.
//!
//! Shows how to:
//! - Publish from several threads at once.
//! - Retire a subscription with [`Subscription::retire_after`].
//! - Drain and join the worker with [`DispatchThread::shutdown`].
//!
//! ## Run
//! ```bash
//! cargo run --example dispatch_thread
//! ```

use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use nodebus::{BlockSummary, DispatchThread, Event, EventKind, Publisher, Subscription};

fn block(number: u64) -> Event {
    Event::BlockAdded(BlockSummary {
        number,
        hash: Bytes::new(),
        transactions: Vec::new(),
    })
}

fn main() {
    tracing_subscriber::fmt::init();

    let runner = Arc::new(DispatchThread::named("bus-dispatch").expect("spawn dispatch thread"));
    let bus = Arc::new(Publisher::new(runner.clone()));

    bus.subscribe_to(EventKind::BlockAdded, |ev| {
        if let Event::BlockAdded(summary) = ev {
            println!(
                "[{}] block #{}",
                thread::current().name().unwrap_or("?"),
                summary.number
            );
        }
    });

    // Early-chain watcher: retires itself once the chain passes block 10.
    bus.subscribe(
        Subscription::to(EventKind::BlockAdded, |ev| {
            if let Event::BlockAdded(summary) = ev {
                println!("[early-watcher] block #{}", summary.number);
            }
        })
        .retire_after(|ev| matches!(ev, Event::BlockAdded(s) if s.number >= 10)),
    );

    let producers: Vec<_> = (0..2)
        .map(|producer| {
            let bus = Arc::clone(&bus);
            thread::spawn(move || {
                for offset in 0..8 {
                    bus.publish(block(producer * 8 + offset));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().expect("producer thread");
    }

    runner.shutdown();
    println!(
        "remaining block subscribers: {}",
        bus.subscribers_count_of(EventKind::BlockAdded)
    );
}
