//! # Example: tokio_runner
//!
//! Runs handlers on a tokio runtime's blocking pool via [`TokioRunner`].
//! Useful when the embedding application is already async and wants no
//! dedicated dispatch thread; note that cross-publish ordering is not
//! guaranteed with this runner.
//!
//! ## Run
//! ```bash
//! cargo run --example tokio_runner
//! ```

use std::sync::Arc;
use std::time::Duration;

use nodebus::{Event, EventKind, PeerHandle, Publisher, TokioRunner};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let bus = Publisher::new(Arc::new(TokioRunner::current()));

    bus.subscribe_to(EventKind::PeerAddedToSyncPool, |ev| {
        if let Event::PeerAddedToSyncPool(peer) = ev {
            println!("peer joined sync pool: {} ({})", peer.node_id, peer.remote);
        }
    });

    for n in 0..3 {
        bus.publish(Event::PeerAddedToSyncPool(PeerHandle {
            node_id: format!("node-{n:02}"),
            remote: format!("10.0.0.{}:30303", n + 1),
        }));
    }

    // Give the blocking pool a moment to drain before the runtime exits.
    tokio::time::sleep(Duration::from_millis(100)).await;
}
