//! Process-wide node identity counter.

use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(0);

/// Returns the next node id. Ids are unique for the lifetime of the
/// process and never reused.
#[inline]
pub fn next_node_id() -> u32 {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}
