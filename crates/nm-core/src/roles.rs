use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EMBEDDABLE_ROLES, DEFAULT_USED_ROLES, MODAL, NEGATION, VERB};
use crate::error::{NarrativeError, Result};

/// How a role's column is built and what kind of value it holds.
/// Resolved once per declared role, never per row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoleKind {
    /// Nullable boolean, one value per statement.
    Negation,
    /// Sparse single label, only statements with a well-formed label list.
    Modal,
    /// Space-joined verb tokens, one value per statement.
    VerbText,
    /// Cluster ids supplied by the upstream clustering stage.
    EmbeddableCluster,
}

impl RoleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negation => "negation",
            Self::Modal => "modal",
            Self::VerbText => "verb-text",
            Self::EmbeddableCluster => "embeddable-cluster",
        }
    }
}

/// A raw cell value of the aligned table. Null cells are `None` at the
/// table level, never a variant here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleValue {
    Cluster(i64),
    Flag(bool),
    Label(String),
    Text(String),
}

impl RoleValue {
    /// Parse a textual key (as found in JSON label tables) into the value
    /// type a role of `kind` holds.
    pub fn parse(kind: RoleKind, raw: &str) -> Option<Self> {
        match kind {
            RoleKind::EmbeddableCluster => raw.trim().parse().ok().map(Self::Cluster),
            RoleKind::Negation => match raw.trim().to_lowercase().as_str() {
                "true" => Some(Self::Flag(true)),
                "false" => Some(Self::Flag(false)),
                _ => None,
            },
            RoleKind::Modal => Some(Self::Label(raw.to_string())),
            RoleKind::VerbText => Some(Self::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for RoleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleValue::Cluster(id) => write!(f, "{id}"),
            RoleValue::Flag(b) => write!(f, "{b}"),
            RoleValue::Label(s) | RoleValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One postprocessed role of a statement: a token list (most roles, and the
/// candidate labels of the modal role) or a boolean presence flag (negation).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleEntry {
    Tokens(Vec<String>),
    Flag(bool),
}

impl RoleEntry {
    pub fn tokens(&self) -> Option<&[String]> {
        match self {
            RoleEntry::Tokens(tokens) => Some(tokens),
            RoleEntry::Flag(_) => None,
        }
    }

    pub fn flag(&self) -> Option<bool> {
        match self {
            RoleEntry::Flag(b) => Some(*b),
            RoleEntry::Tokens(_) => None,
        }
    }
}

/// Postprocessed roles of one statement, keyed by role name.
pub type Statement = BTreeMap<String, RoleEntry>;

/// The declared role universe and its embeddable subset.
///
/// Declaration order matters: it fixes column order in the aligned table and
/// the position of the verb inside compound keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsedRoles {
    used: Vec<String>,
    embeddable: BTreeSet<String>,
}

impl UsedRoles {
    pub fn new<I, J, S, T>(used: I, embeddable: J) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let used: Vec<String> = used.into_iter().map(Into::into).collect();
        let embeddable: BTreeSet<String> = embeddable.into_iter().map(Into::into).collect();

        let mut seen = BTreeSet::new();
        for role in &used {
            if !seen.insert(role.as_str()) {
                return Err(NarrativeError::InvalidRoleConfig(format!(
                    "role '{role}' declared twice"
                )));
            }
        }
        if let Some(stray) = embeddable.iter().find(|r| !seen.contains(r.as_str())) {
            return Err(NarrativeError::InvalidRoleConfig(format!(
                "embeddable role '{stray}' is not a used role"
            )));
        }

        let roles = Self { used, embeddable };
        for role in &roles.used {
            roles.kind(role)?;
        }
        Ok(roles)
    }

    pub fn used(&self) -> &[String] {
        &self.used
    }

    pub fn embeddable(&self) -> &BTreeSet<String> {
        &self.embeddable
    }

    pub fn contains(&self, role: &str) -> bool {
        self.used.iter().any(|r| r == role)
    }

    pub fn is_embeddable(&self, role: &str) -> bool {
        self.embeddable.contains(role)
    }

    /// Resolve how `role` is represented.
    pub fn kind(&self, role: &str) -> Result<RoleKind> {
        match role {
            NEGATION => Ok(RoleKind::Negation),
            MODAL => Ok(RoleKind::Modal),
            VERB => Ok(RoleKind::VerbText),
            _ if self.is_embeddable(role) => Ok(RoleKind::EmbeddableCluster),
            _ => Err(NarrativeError::UnsupportedRole {
                role: role.to_string(),
            }),
        }
    }
}

impl Default for UsedRoles {
    fn default() -> Self {
        Self {
            used: DEFAULT_USED_ROLES.iter().map(|r| r.to_string()).collect(),
            embeddable: DEFAULT_EMBEDDABLE_ROLES.iter().map(|r| r.to_string()).collect(),
        }
    }
}
