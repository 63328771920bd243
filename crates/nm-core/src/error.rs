//! Error types for the narrative engine.
//!
//! Every variant is a configuration or shape mismatch between the engine and
//! its inputs. Row-level data noise is never an error; see
//! [`AssemblyWarning`](crate::columns::AssemblyWarning).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("roles {requested:?} not in declared roles {declared:?}")]
    UnknownRoles {
        requested: Vec<String>,
        declared: Vec<String>,
    },

    #[error("invalid role configuration: {0}")]
    InvalidRoleConfig(String),

    #[error("role '{role}' is neither embeddable nor a modifier role")]
    UnsupportedRole { role: String },

    #[error("no clustering result for embeddable role '{role}'")]
    MissingClustering { role: String },

    #[error("clustering for role '{role}' has {ids} ids but {index} statement indices")]
    ColumnShape {
        role: String,
        ids: usize,
        index: usize,
    },

    #[error("mask for role '{role}' has {mask} entries but the column has {column}")]
    MaskShape {
        role: String,
        mask: usize,
        column: usize,
    },

    #[error("statement index {index} appears twice in clustering for role '{role}'")]
    DuplicateStatementIndex { role: String, index: usize },

    #[error("role '{role}' has no display priority")]
    MissingDisplayPriority { role: String },

    #[error("no label for value {value} of role '{role}'")]
    MissingLabel { role: String, value: String },
}

pub type Result<T> = std::result::Result<T, NarrativeError>;
