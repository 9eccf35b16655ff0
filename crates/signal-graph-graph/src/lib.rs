//! Graph store for the Signal Graph engine.
//!
//! Owns the full set of current events (nodes) and causal edges, keyed by
//! pair class, with time-based weight decay and pruning. All mutation
//! funnels through a single update path: read-decay-blend-write per edge
//! happens atomically under one writer lock, so no two updates can read
//! the same decayed weight and double-count decay.
//!
//! The store is the sole mutator of edge state; every other component only
//! reads, either through decayed incoming-edge lookups or through
//! copy-on-read snapshots.

mod decay;
mod error;
mod snapshot;
mod store;

pub use decay::decayed_weight;
pub use error::{GraphError, GraphResult};
pub use snapshot::GraphSnapshot;
pub use store::{EdgeUpdateResult, GraphStore};
