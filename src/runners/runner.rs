//! The execution-strategy seam between the bus and its embedder.

use crate::bus::DispatchTask;

/// Executes dispatch tasks according to its own scheduling policy.
///
/// The bus calls [`execute`](TaskRunner::execute) at most once per publish
/// and expects nothing back: no return value, no synchronous-completion
/// guarantee. Whether handlers run inline, on a dedicated thread, or on a
/// pool is entirely the runner's business — and so are the ordering
/// guarantees across publishes (only a serializing runner preserves
/// cross-call order within a category).
pub trait TaskRunner: Send + Sync {
    /// Accepts one unit of work for eventual execution.
    fn execute(&self, task: DispatchTask);
}
