//! Core utilities and foundational types for the Arbor engine.
//!
//! Nothing in this crate knows about the scene graph. It provides the
//! building blocks the scene is made of:
//!
//! - [`signal`]: typed synchronous publish/subscribe channels
//! - [`data`]: the per-node property store ([`DataBindings`])
//! - [`tags`]: interned tag identifiers and tag sets
//! - [`id`]: the process-wide node id counter

pub mod data;
pub mod id;
pub mod signal;
pub mod tags;

pub use data::{DataBindings, DataError, Value};
pub use id::next_node_id;
pub use signal::{Handler, Signal, SignalSlot, Subscribers};
pub use tags::{Tag, Tags, existing_tag, tag};
