use thiserror::Error;

use crate::types::{CrudRole, HttpMethod};

/// Errors raised while building a tenant stack. Every variant is fatal to the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("Route '{segment}' already registered under '{parent}'")]
    DuplicateRoute { parent: String, segment: String },

    #[error("Method {method} already attached to '{path}'")]
    DuplicateMethod { path: String, method: HttpMethod },

    #[error("Service '{service}' is missing handlers for: {missing:?}")]
    IncompleteHandlerSet { service: String, missing: Vec<CrudRole> },

    #[error("Unknown identity provider kind: {0}")]
    UnknownProviderKind(String),

    #[error("Identity provider '{kind}' is missing required detail '{field}'")]
    MissingProviderDetail { kind: String, field: String },

    #[error("Invalid route segment: {0:?}")]
    InvalidSegment(String),

    #[error("Service declared more than once: {0}")]
    DuplicateService(String),

    #[error("Route segment '{0}' is reserved for an auxiliary service")]
    ReservedSegment(String),

    #[error("Route node {0} does not exist")]
    UnknownNode(usize),

    #[error("Invalid provisioning configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ProvisionError {
    fn from(err: serde_json::Error) -> Self {
        ProvisionError::Serialization(err.to_string())
    }
}
