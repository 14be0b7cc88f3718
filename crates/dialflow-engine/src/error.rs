//! Error taxonomy for the versioning engine.

use dialflow_postgres::PgError;
use dialflow_postgres::types::{ChangeSetStatus, GraphScope};
use uuid::Uuid;

use crate::collab::Diagnostic;

/// Type-erased error produced by collaborator implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Specialized [`Result`] type for versioning engine operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for all versioning engine operations.
///
/// The first four variants are caller mistakes and recoverable; everything
/// else is fatal for the request and rolls back the surrounding transaction.
#[derive(Debug, thiserror::Error)]
#[must_use = "engine errors should be handled appropriately"]
pub enum Error {
    /// The flow is unknown to the project directory.
    #[error("flow {flow_id} does not exist")]
    FlowNotFound {
        /// Flow that failed to resolve.
        flow_id: Uuid,
    },

    /// The change set does not exist.
    #[error("change set {change_set_id} does not exist")]
    ChangeSetNotFound {
        /// Change set that failed to resolve.
        change_set_id: Uuid,
    },

    /// The requested operation is illegal for the change set's current status.
    #[error("change set status may not move from {from} to {to}")]
    InvalidStateTransition {
        /// Status the change set is currently in.
        from: ChangeSetStatus,
        /// Status the operation tried to move to.
        to: ChangeSetStatus,
    },

    /// The flow has no resolvable owning project.
    ///
    /// This is an upstream data integrity fault and is surfaced rather than
    /// silently defaulted.
    #[error("flow {flow_id} has no resolvable owning project")]
    MissingOwnership {
        /// Flow whose ownership failed to resolve.
        flow_id: Uuid,
    },

    /// The draft graph failed structural validation.
    #[error("flow graph failed structural validation with {} diagnostic(s)", diagnostics.len())]
    InvalidFlow {
        /// Diagnostics reported by the structural validator.
        diagnostics: Vec<Diagnostic>,
    },

    /// A clone or archival step encountered an edge whose target cannot be
    /// resolved within the expected scope.
    ///
    /// Unreachable while the scope invariants hold; treated as fatal and
    /// never retried.
    #[error("edge {edge_id} references node {node_id} outside scope {scope}")]
    IntegrityViolation {
        /// Edge with the dangling reference.
        edge_id: Uuid,
        /// Node id that failed to resolve.
        node_id: Uuid,
        /// Scope the reference was expected in.
        scope: GraphScope,
    },

    /// A collaborator (project directory or structural validator) failed.
    #[error("collaborator {service} failed: {source}")]
    Collaborator {
        /// Name of the failing collaborator.
        service: &'static str,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },

    /// A database operation failed.
    #[error(transparent)]
    Database(#[from] PgError),
}

impl Error {
    /// Creates a collaborator failure error.
    pub fn collaborator(service: &'static str, source: BoxError) -> Self {
        Self::Collaborator { service, source }
    }

    /// Returns whether this error was caused by the caller and is safe to
    /// surface as a client error.
    ///
    /// Everything else indicates an infrastructure or integrity fault; the
    /// surrounding transaction has been rolled back and nothing was applied.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::FlowNotFound { .. }
                | Error::ChangeSetNotFound { .. }
                | Error::InvalidStateTransition { .. }
                | Error::InvalidFlow { .. }
        )
    }
}

// Lets engine errors flow out of diesel transaction closures, so any step
// failing inside `build_transaction().run(..)` rolls the whole unit back.
impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(PgError::Query(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_classification() {
        let err = Error::InvalidStateTransition {
            from: ChangeSetStatus::Published,
            to: ChangeSetStatus::Published,
        };
        assert!(err.is_client_error());

        let err = Error::ChangeSetNotFound {
            change_set_id: Uuid::new_v4(),
        };
        assert!(err.is_client_error());

        let err = Error::IntegrityViolation {
            edge_id: Uuid::new_v4(),
            node_id: Uuid::new_v4(),
            scope: GraphScope::Published,
        };
        assert!(!err.is_client_error());
    }

    #[test]
    fn diesel_errors_become_database_errors() {
        let err = Error::from(diesel::result::Error::NotFound);
        assert!(matches!(err, Error::Database(_)));
        assert!(!err.is_client_error());
    }
}
