//! Mock collaborator implementations for tests and embedding callers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dialflow_postgres::types::GraphScope;
use uuid::Uuid;

use crate::collab::{Diagnostic, FlowOwnership, FlowValidator, ProjectDirectory};
use crate::error::BoxError;

/// In-memory project directory backed by a fixed flow table.
#[derive(Debug, Default, Clone)]
pub struct MockProjectDirectory {
    flows: HashMap<Uuid, FlowOwnership>,
}

impl MockProjectDirectory {
    /// Creates an empty directory; every flow resolves as unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a flow owned by the given project.
    pub fn with_flow(mut self, flow_id: Uuid, project_id: Uuid) -> Self {
        self.flows
            .insert(flow_id, FlowOwnership::new(flow_id, project_id));
        self
    }

    /// Registers a flow whose ownership chain is broken.
    pub fn with_orphaned_flow(mut self, flow_id: Uuid) -> Self {
        self.flows.insert(
            flow_id,
            FlowOwnership {
                flow_id,
                project_id: None,
                customer_id: None,
            },
        );
        self
    }

    /// Wraps the directory for handing to the engine.
    pub fn into_arc(self) -> Arc<dyn ProjectDirectory> {
        Arc::new(self)
    }
}

#[async_trait]
impl ProjectDirectory for MockProjectDirectory {
    async fn resolve_flow(&self, flow_id: Uuid) -> Result<Option<FlowOwnership>, BoxError> {
        Ok(self.flows.get(&flow_id).copied())
    }
}

/// Structural validator returning a fixed set of diagnostics.
#[derive(Debug, Default, Clone)]
pub struct MockFlowValidator {
    diagnostics: Vec<Diagnostic>,
}

impl MockFlowValidator {
    /// Creates a validator that accepts every scope.
    pub fn accepting() -> Self {
        Self::default()
    }

    /// Creates a validator that reports the given diagnostics for every
    /// scope.
    pub fn reporting(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Wraps the validator for handing to the engine.
    pub fn into_arc(self) -> Arc<dyn FlowValidator> {
        Arc::new(self)
    }
}

#[async_trait]
impl FlowValidator for MockFlowValidator {
    async fn check_scope(
        &self,
        _flow_id: Uuid,
        _scope: GraphScope,
    ) -> Result<Vec<Diagnostic>, BoxError> {
        Ok(self.diagnostics.clone())
    }
}
