//! Narrative mining engine.
//!
//! Assembles per-statement semantic-role values (cluster ids, negation
//! flags, modal labels, verb text) into one statement-indexed table, then
//! counts and scores co-occurring role tuples ("narratives") by frequency
//! and pointwise mutual information. Independently mines a fixed entity
//! vocabulary out of role tokens before they are embedded.
//!
//! Zero I/O: inputs arrive as in-memory structures and results are returned
//! as insertion-ordered maps.

pub mod columns;
pub mod constants;
pub mod cooccurrence;
pub mod counting;
pub mod entities;
pub mod error;
pub mod labels;
pub mod narrative;
pub mod roles;

pub use columns::{
    AlignedTable, Assembled, AssemblyWarning, ClusterColumn, ClusteringMask, ClusteringResult,
    ColumnAssembler, build_table,
};
pub use constants::{
    ARG0, ARG1, ARG2, DEFAULT_DISPLAY_ORDER, DEFAULT_EMBEDDABLE_ROLES, DEFAULT_ENTITY_ROLES,
    DEFAULT_USED_ROLES, MODAL, NEGATION, VERB,
};
pub use cooccurrence::CoOccurrence;
pub use counting::{compute_pmi, unique_counts, unique_tuple_values_counts};
pub use entities::{EntityIndex, EntityMiner, Mined, is_subsequence, mine_entities};
pub use error::{NarrativeError, Result};
pub use labels::LabelTable;
pub use narrative::{KeyPart, Narrative, NarrativeKey, flatten_key, plain_key, split_compound};
pub use roles::{RoleEntry, RoleKind, RoleValue, Statement, UsedRoles};
