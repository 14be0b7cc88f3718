//! Collaborator interfaces supplied by the embedding application.
//!
//! The engine assumes its caller is already authorized. What it still needs
//! from the outside world is the flow-to-project association (stamped on
//! change sets at draft creation) and structural graph validation (invoked
//! before a draft may move to validated). Both are consumed as traits so the
//! engine stays free of any API- or directory-specific code.

use async_trait::async_trait;
use dialflow_postgres::types::GraphScope;
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::error::BoxError;

/// Ownership record resolved for a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowOwnership {
    /// Flow the record describes.
    pub flow_id: Uuid,
    /// Project that owns the flow, if resolvable.
    pub project_id: Option<Uuid>,
    /// Customer the project belongs to, if known.
    pub customer_id: Option<Uuid>,
}

impl FlowOwnership {
    /// Creates an ownership record for a project-owned flow.
    pub fn new(flow_id: Uuid, project_id: Uuid) -> Self {
        Self {
            flow_id,
            project_id: Some(project_id),
            customer_id: None,
        }
    }

    /// Returns whether the flow has a resolvable owning project.
    #[inline]
    pub fn is_owned(&self) -> bool {
        self.project_id.is_some()
    }
}

/// Resolves flows to their owning project.
///
/// Returning `Ok(None)` means the flow does not exist at all, while an
/// ownership record without a project id means the flow exists but its
/// ownership chain is broken.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Resolves the ownership record for a flow.
    async fn resolve_flow(&self, flow_id: Uuid) -> Result<Option<FlowOwnership>, BoxError>;
}

/// Severity of a structural validation diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory finding; does not block validation.
    #[strum(serialize = "warning")]
    Warning,
    /// Structural fault; the draft cannot be validated.
    #[strum(serialize = "error")]
    Error,
}

/// One finding produced by the structural validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Finding severity.
    pub severity: Severity,
    /// Segment node the finding is attached to, if any.
    pub segment_id: Option<Uuid>,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Creates an error-severity diagnostic.
    pub fn error(segment_id: Option<Uuid>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            segment_id,
            message: message.into(),
        }
    }

    /// Creates a warning-severity diagnostic.
    pub fn warning(segment_id: Option<Uuid>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            segment_id,
            message: message.into(),
        }
    }

    /// Returns whether this diagnostic blocks validation.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Checks a flow graph scope for structural faults.
///
/// Reachability and terminal-segment analysis live behind this trait; the
/// publish orchestrator itself never inspects graph shape.
#[async_trait]
pub trait FlowValidator: Send + Sync {
    /// Checks the graph under `scope` and returns all findings.
    async fn check_scope(
        &self,
        flow_id: Uuid,
        scope: GraphScope,
    ) -> Result<Vec<Diagnostic>, BoxError>;
}

/// Returns whether any diagnostic in the slice blocks validation.
pub(crate) fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_checks() {
        let flow_id = Uuid::new_v4();
        let owned = FlowOwnership::new(flow_id, Uuid::new_v4());
        assert!(owned.is_owned());

        let orphaned = FlowOwnership {
            flow_id,
            project_id: None,
            customer_id: None,
        };
        assert!(!orphaned.is_owned());
    }

    #[test]
    fn diagnostics_severity() {
        let warning = Diagnostic::warning(None, "segment unreachable from entry");
        let error = Diagnostic::error(Some(Uuid::new_v4()), "no terminal segment");

        assert!(!warning.is_error());
        assert!(error.is_error());
        assert!(!has_errors(&[warning.clone()]));
        assert!(has_errors(&[warning, error]));
    }
}
