//! Database models for all entities in the system.
//!
//! This module contains Diesel model definitions for all database tables,
//! including structs for querying, inserting, and updating records.

mod change_set;
mod segment_node;
mod transition_edge;

// Change set models
pub use change_set::{ChangeSet, NewChangeSet, UpdateChangeSet};
// Graph models
pub use segment_node::{NewSegmentNode, SegmentNode, UpdateSegmentNode};
pub use transition_edge::{NewTransitionEdge, TransitionEdge, UpdateTransitionEdge};
