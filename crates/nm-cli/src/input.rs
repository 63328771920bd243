//! JSON input bundle: the outputs of the upstream stages the engine
//! consumes (postprocessed statements, clustering, labels).

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use nm_core::{ClusteringMask, ClusteringResult, LabelTable, RoleValue, Statement, UsedRoles};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bundle {
    pub statements: Vec<Statement>,
    #[serde(default)]
    pub clustering: ClusteringResult,
    #[serde(default)]
    pub mask: Option<ClusteringMask>,
    /// role -> raw value (as text) -> description, display string first.
    #[serde(default)]
    pub labels: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Bundle {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse label keys into raw values according to each role's kind.
    pub fn label_table(&self, roles: &UsedRoles) -> Result<LabelTable> {
        let mut table = LabelTable::new();
        for (role, entries) in &self.labels {
            if !roles.contains(role) {
                tracing::warn!("labels given for undeclared role '{role}', ignored");
                continue;
            }
            let kind = roles.kind(role)?;
            for (raw, description) in entries {
                let Some(value) = RoleValue::parse(kind, raw) else {
                    bail!(
                        "label key '{raw}' is not a valid {} value for role '{role}'",
                        kind.as_str()
                    );
                };
                table.insert(role.clone(), value, description.clone());
            }
        }
        Ok(table)
    }
}

/// Entity vocabulary, one entity per line. Blank lines and `#` comments are
/// skipped.
pub fn load_entities(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(parse_entities(&text))
}

fn parse_entities(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect()
}

pub fn load_statements(path: &Path) -> Result<Vec<Statement>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
