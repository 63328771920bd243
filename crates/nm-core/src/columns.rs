//! Column assembly: one aligned, statement-indexed table out of the
//! heterogeneous per-role sources (cluster ids, negation flags, modal label
//! lists, verb tokens).
//!
//! Every column is built as a sparse series keyed by statement index and the
//! series are joined on that index, never on position. Cluster columns carry
//! their own statement indices and may cover only part of the corpus.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NarrativeError, Result};
use crate::roles::{RoleKind, RoleValue, Statement, UsedRoles};

/// Cluster ids for one embeddable role, aligned with the statement indices
/// they were computed for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterColumn {
    pub ids: Vec<i64>,
    pub index: Vec<usize>,
}

impl ClusterColumn {
    /// Signed ids up to 64 bits and unsigned ids up to 32 bits widen
    /// losslessly into `i64`.
    pub fn new<T: Into<i64>>(ids: impl IntoIterator<Item = T>, index: Vec<usize>) -> Self {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Upstream clustering output, keyed by role.
pub type ClusteringResult = BTreeMap<String, ClusterColumn>;

/// Per-role positional row masks over a [`ClusterColumn`]. `true` keeps the entry.
pub type ClusteringMask = BTreeMap<String, Vec<bool>>;

/// Row-level data problems. Reported to the caller, never fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssemblyWarning {
    /// The modal role was present with no labels; the statement is left out
    /// of the modal column.
    EmptyModal { statement: usize },
    /// The modal role carried several labels; the first one was used.
    MultipleModals { statement: usize, labels: Vec<String> },
    /// The entry has the wrong shape for its role (a flag where tokens are
    /// expected or the reverse); the cell is left null.
    MalformedEntry { statement: usize, role: String },
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyWarning::EmptyModal { statement } => {
                write!(f, "no labels in statement {statement}")
            }
            AssemblyWarning::MultipleModals { statement, labels } => write!(
                f,
                "multiple labels {labels:?} in statement {statement}, first one is picked"
            ),
            AssemblyWarning::MalformedEntry { statement, .. } => {
                write!(f, "wrong entry shape in statement {statement}, skipped")
            }
        }
    }
}

/// Sparse column: key present = statement in the column's domain,
/// value `None` = null cell.
type Series = BTreeMap<usize, Option<RoleValue>>;

/// One row per statement index, one column per declared role.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlignedTable {
    roles: Vec<String>,
    index: Vec<usize>,
    rows: Vec<Vec<Option<RoleValue>>>,
}

impl AlignedTable {
    /// Outer-join named series on statement index. Rows come out in
    /// ascending statement order.
    fn join(columns: Vec<(String, Series)>) -> Self {
        let index: Vec<usize> = columns
            .iter()
            .flat_map(|(_, series)| series.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = index
            .iter()
            .map(|i| {
                columns
                    .iter()
                    .map(|(_, series)| series.get(i).cloned().flatten())
                    .collect()
            })
            .collect();

        Self {
            roles: columns.into_iter().map(|(role, _)| role).collect(),
            index,
            rows,
        }
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Statement index of every row, in row order.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (`statement`, `role`). `None` if the statement has no row,
    /// the role has no column, or the cell is null.
    pub fn get(&self, statement: usize, role: &str) -> Option<&RoleValue> {
        let col = self.roles.iter().position(|r| r == role)?;
        let row = self.index.binary_search(&statement).ok()?;
        self.rows[row][col].as_ref()
    }

    /// Restrict to `roles` (in the given order) and drop every row holding a
    /// null in any of them. Row order is preserved.
    pub fn complete_rows(&self, roles: &[String]) -> Result<Vec<Vec<RoleValue>>> {
        let positions = roles
            .iter()
            .map(|role| {
                self.roles
                    .iter()
                    .position(|r| r == role)
                    .ok_or_else(|| NarrativeError::UnknownRoles {
                        requested: vec![role.clone()],
                        declared: self.roles.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self
            .rows
            .iter()
            .filter_map(|row| {
                positions
                    .iter()
                    .map(|&p| row[p].clone())
                    .collect::<Option<Vec<_>>>()
            })
            .collect())
    }
}

/// Output of [`ColumnAssembler::assemble`].
#[derive(Clone, Debug)]
pub struct Assembled {
    pub table: AlignedTable,
    pub warnings: Vec<AssemblyWarning>,
}

/// Builds the [`AlignedTable`] for a declared role universe. Each role's
/// construction rule is fixed when the assembler is created.
#[derive(Clone, Debug)]
pub struct ColumnAssembler {
    columns: Vec<(String, RoleKind)>,
}

impl ColumnAssembler {
    pub fn new(roles: &UsedRoles) -> Result<Self> {
        let columns = roles
            .used()
            .iter()
            .map(|role| Ok((role.clone(), roles.kind(role)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    pub fn assemble(
        &self,
        clustering: &ClusteringResult,
        statements: &[Statement],
        mask: Option<&ClusteringMask>,
    ) -> Result<Assembled> {
        let mut warnings = Vec::new();
        let mut columns = Vec::with_capacity(self.columns.len());

        for (role, kind) in &self.columns {
            let series = match kind {
                RoleKind::Negation => negation_series(role, statements, &mut warnings),
                RoleKind::Modal => modal_series(role, statements, &mut warnings),
                RoleKind::VerbText => verb_series(role, statements, &mut warnings),
                RoleKind::EmbeddableCluster => {
                    let column = clustering.get(role).ok_or_else(|| {
                        NarrativeError::MissingClustering { role: role.clone() }
                    })?;
                    let role_mask = mask.and_then(|m| m.get(role)).map(Vec::as_slice);
                    cluster_series(role, column, role_mask)?
                }
            };
            columns.push((role.clone(), series));
        }

        let table = AlignedTable::join(columns);
        tracing::debug!(
            "assembled {} rows x {} roles from {} statements ({} warnings)",
            table.len(),
            table.roles().len(),
            statements.len(),
            warnings.len()
        );
        Ok(Assembled { table, warnings })
    }
}

/// Convenience wrapper: resolve the assembler for `roles` and run it once.
pub fn build_table(
    roles: &UsedRoles,
    clustering: &ClusteringResult,
    statements: &[Statement],
    mask: Option<&ClusteringMask>,
) -> Result<Assembled> {
    ColumnAssembler::new(roles)?.assemble(clustering, statements, mask)
}

fn report(role: &str, warning: AssemblyWarning, warnings: &mut Vec<AssemblyWarning>) {
    tracing::warn!("{role}: {warning}");
    warnings.push(warning);
}

fn malformed(role: &str, statement: usize, warnings: &mut Vec<AssemblyWarning>) {
    let warning = AssemblyWarning::MalformedEntry {
        statement,
        role: role.to_string(),
    };
    report(role, warning, warnings);
}

fn negation_series(
    role: &str,
    statements: &[Statement],
    warnings: &mut Vec<AssemblyWarning>,
) -> Series {
    let mut series = Series::new();
    for (i, statement) in statements.iter().enumerate() {
        let value = match statement.get(role) {
            None => None,
            Some(entry) => {
                let flag = entry.flag();
                if flag.is_none() {
                    malformed(role, i, warnings);
                }
                flag.map(RoleValue::Flag)
            }
        };
        series.insert(i, value);
    }
    series
}

fn verb_series(
    role: &str,
    statements: &[Statement],
    warnings: &mut Vec<AssemblyWarning>,
) -> Series {
    let mut series = Series::new();
    for (i, statement) in statements.iter().enumerate() {
        let value = match statement.get(role) {
            None => None,
            Some(entry) => {
                let tokens = entry.tokens();
                if tokens.is_none() {
                    malformed(role, i, warnings);
                }
                tokens
                    .filter(|tokens| !tokens.is_empty())
                    .map(|tokens| RoleValue::Text(tokens.join(" ")))
            }
        };
        series.insert(i, value);
    }
    series
}

fn modal_series(
    role: &str,
    statements: &[Statement],
    warnings: &mut Vec<AssemblyWarning>,
) -> Series {
    let mut series = Series::new();
    for (i, statement) in statements.iter().enumerate() {
        let Some(entry) = statement.get(role) else {
            continue;
        };
        let Some(labels) = entry.tokens() else {
            malformed(role, i, warnings);
            continue;
        };
        let Some(first) = labels.first() else {
            report(role, AssemblyWarning::EmptyModal { statement: i }, warnings);
            continue;
        };
        if labels.len() > 1 {
            let warning = AssemblyWarning::MultipleModals {
                statement: i,
                labels: labels.to_vec(),
            };
            report(role, warning, warnings);
        }
        series.insert(i, Some(RoleValue::Label(first.clone())));
    }
    series
}

fn cluster_series(role: &str, column: &ClusterColumn, mask: Option<&[bool]>) -> Result<Series> {
    if column.ids.len() != column.index.len() {
        return Err(NarrativeError::ColumnShape {
            role: role.to_string(),
            ids: column.ids.len(),
            index: column.index.len(),
        });
    }
    if let Some(mask) = mask
        && mask.len() != column.len()
    {
        return Err(NarrativeError::MaskShape {
            role: role.to_string(),
            mask: mask.len(),
            column: column.len(),
        });
    }

    let mut series = Series::new();
    for (pos, (&id, &statement)) in column.ids.iter().zip(&column.index).enumerate() {
        if mask.is_some_and(|m| !m[pos]) {
            continue;
        }
        if series.insert(statement, Some(RoleValue::Cluster(id))).is_some() {
            return Err(NarrativeError::DuplicateStatementIndex {
                role: role.to_string(),
                index: statement,
            });
        }
    }
    Ok(series)
}
