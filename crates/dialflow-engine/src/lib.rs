#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for draft resolution operations.
pub const TRACING_TARGET_DRAFT: &str = "dialflow_engine::draft";

/// Tracing target for graph clone operations.
pub const TRACING_TARGET_CLONE: &str = "dialflow_engine::clone";

/// Tracing target for publish orchestration.
pub const TRACING_TARGET_PUBLISH: &str = "dialflow_engine::publish";

/// Tracing target for discard/cleanup operations.
pub const TRACING_TARGET_DISCARD: &str = "dialflow_engine::discard";

/// Tracing target for validation operations.
pub const TRACING_TARGET_VALIDATE: &str = "dialflow_engine::validate";

mod cloner;
mod collab;
mod discard;
mod draft;
mod error;
pub mod mock;
mod publish;
mod service;

pub use cloner::{CloneOutcome, clone_graph};
pub use collab::{Diagnostic, FlowOwnership, FlowValidator, ProjectDirectory, Severity};
pub use error::{BoxError, Error, Result};
pub use service::FlowVersionService;

// Re-exported so embedding applications don't need a direct
// dialflow-postgres dependency for the common types.
pub use dialflow_postgres::model::{ChangeSet, SegmentNode, TransitionEdge};
pub use dialflow_postgres::query::Pagination;
pub use dialflow_postgres::types::{ChangeSetStatus, GraphScope};
pub use dialflow_postgres::{PgClient, PgConfig};
