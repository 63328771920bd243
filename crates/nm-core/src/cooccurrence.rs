//! Narrative co-occurrence: counts and PMI of role-value tuples over a
//! selectable subset of roles.
//!
//! Selecting a subset rebuilds every derived structure at once:
//! 1. Order the subset by role declaration (not by the caller's order).
//! 2. Keep only statements with a value for every selected role.
//! 3. If the verb is selected together with negation and/or modal, nest the
//!    verb and every role after it into one compound key part.
//!
//! Results are relabelled through the [`LabelTable`] and reordered by the
//! display priority before being returned.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::columns::AlignedTable;
use crate::constants::{DEFAULT_DISPLAY_ORDER, MODAL, NEGATION, VERB};
use crate::counting::{compute_pmi, unique_counts};
use crate::error::{NarrativeError, Result};
use crate::labels::LabelTable;
use crate::narrative::{KeyPart, Narrative, NarrativeKey, flatten_key, plain_key, split_compound};
use crate::roles::UsedRoles;

#[derive(Clone, Debug)]
pub struct CoOccurrence {
    table: AlignedTable,
    labels: LabelTable,
    roles: UsedRoles,
    display_priority: Vec<String>,

    sublist: Vec<String>,
    /// Position of the verb in `sublist` when a compound key was formed.
    compound_at: Option<usize>,
    keys: Vec<NarrativeKey>,
}

impl CoOccurrence {
    /// Engine over all declared roles with the default display priority.
    pub fn new(table: AlignedTable, labels: LabelTable, roles: UsedRoles) -> Result<Self> {
        Self::with_display_order(table, labels, roles, DEFAULT_DISPLAY_ORDER)
    }

    pub fn with_display_order<I, S>(
        table: AlignedTable,
        labels: LabelTable,
        roles: UsedRoles,
        display_priority: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut engine = Self {
            table,
            labels,
            roles,
            display_priority: display_priority.into_iter().map(Into::into).collect(),
            sublist: Vec::new(),
            compound_at: None,
            keys: Vec::new(),
        };
        engine.set_subset(None)?;
        Ok(engine)
    }

    /// Select the roles narratives are built from. `None` selects every
    /// declared role. On error the previous selection is kept.
    pub fn set_subset(&mut self, subset: Option<&BTreeSet<String>>) -> Result<()> {
        let sublist: Vec<String> = match subset {
            None => self.roles.used().to_vec(),
            Some(requested) => {
                let unknown: Vec<String> = requested
                    .iter()
                    .filter(|r| !self.roles.contains(r))
                    .cloned()
                    .collect();
                if !unknown.is_empty() {
                    return Err(NarrativeError::UnknownRoles {
                        requested: unknown,
                        declared: self.roles.used().to_vec(),
                    });
                }
                self.roles
                    .used()
                    .iter()
                    .filter(|r| requested.contains(*r))
                    .cloned()
                    .collect()
            }
        };

        let rows = self.table.complete_rows(&sublist)?;

        let has = |role: &str| sublist.iter().any(|r| r == role);
        let compound_at = if has(NEGATION) || has(MODAL) {
            sublist.iter().position(|r| r == VERB)
        } else {
            None
        };

        let keys: Vec<NarrativeKey> = match compound_at {
            Some(position) => rows
                .into_iter()
                .map(|row| split_compound(row, position))
                .collect(),
            None => rows.into_iter().map(plain_key).collect(),
        };

        tracing::debug!(
            "subset {:?}: {} complete rows of {}, compound key at {:?}",
            sublist,
            keys.len(),
            self.table.len(),
            compound_at
        );

        self.sublist = sublist;
        self.compound_at = compound_at;
        self.keys = keys;
        Ok(())
    }

    /// Roles currently selected.
    pub fn subset(&self) -> BTreeSet<String> {
        self.sublist.iter().cloned().collect()
    }

    /// Roles currently selected, in declaration order.
    pub fn sublist(&self) -> &[String] {
        &self.sublist
    }

    /// Selected roles sorted by display priority.
    pub fn display_order(&self) -> Result<Vec<&str>> {
        let permutation = self.display_permutation()?;
        Ok(permutation
            .into_iter()
            .map(|i| self.sublist[i].as_str())
            .collect())
    }

    /// Layout of the counting key: one group per key part, each listing the
    /// roles it covers.
    pub fn normal_order(&self) -> Vec<Vec<&str>> {
        let names: Vec<&str> = self.sublist.iter().map(String::as_str).collect();
        match self.compound_at {
            Some(position) => {
                let mut groups: Vec<Vec<&str>> =
                    names[..position].iter().map(|r| vec![*r]).collect();
                groups.push(names[position..].to_vec());
                groups
            }
            None => names.into_iter().map(|r| vec![r]).collect(),
        }
    }

    /// Counting keys of the current selection, in table row order.
    pub fn keys(&self) -> &[NarrativeKey] {
        &self.keys
    }

    /// Number of statements with a value for every selected role.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Labelled narratives with their occurrence count, most frequent first.
    pub fn narratives_counts(&self) -> Result<IndexMap<Narrative, usize>> {
        self.narratives_counts_sorted(true)
    }

    pub fn narratives_counts_sorted(&self, descending: bool) -> Result<IndexMap<Narrative, usize>> {
        self.relabel_all(unique_counts(&self.keys, descending))
    }

    /// Labelled narratives with their PMI score, highest first.
    pub fn narratives_pmi(&self) -> Result<IndexMap<Narrative, f64>> {
        self.narratives_pmi_sorted(true)
    }

    pub fn narratives_pmi_sorted(&self, descending: bool) -> Result<IndexMap<Narrative, f64>> {
        self.relabel_all(compute_pmi(&self.keys, descending))
    }

    /// Splice compound parts back into role order, replace every raw value
    /// by its display string, and reorder by display priority.
    pub fn flatten_and_relabel(&self, key: &[KeyPart]) -> Result<Narrative> {
        let permutation = self.display_permutation()?;
        self.relabel(key, &permutation)
    }

    fn relabel_all<V>(&self, raw: IndexMap<NarrativeKey, V>) -> Result<IndexMap<Narrative, V>> {
        let permutation = self.display_permutation()?;
        let mut out = IndexMap::with_capacity(raw.len());
        for (key, value) in raw {
            let narrative = self.relabel(&key, &permutation)?;
            if out.insert(narrative, value).is_some() {
                tracing::warn!(
                    "{:?} shares its labels with an earlier narrative, later value kept",
                    key
                );
            }
        }
        Ok(out)
    }

    fn relabel(&self, key: &[KeyPart], permutation: &[usize]) -> Result<Narrative> {
        let values = flatten_key(key);
        let labelled = self
            .sublist
            .iter()
            .zip(values)
            .map(|(role, value)| self.labels.display(role, value).map(str::to_string))
            .collect::<Result<Vec<_>>>()?;
        Ok(Narrative(
            permutation.iter().map(|&i| labelled[i].clone()).collect(),
        ))
    }

    /// For each display slot, the position in `sublist` that fills it.
    fn display_permutation(&self) -> Result<Vec<usize>> {
        let mut positions: Vec<usize> = (0..self.sublist.len()).collect();
        let ranks = self
            .sublist
            .iter()
            .map(|role| self.priority(role))
            .collect::<Result<Vec<_>>>()?;
        positions.sort_by_key(|&i| ranks[i]);
        Ok(positions)
    }

    fn priority(&self, role: &str) -> Result<usize> {
        self.display_priority
            .iter()
            .position(|r| r == role)
            .ok_or_else(|| NarrativeError::MissingDisplayPriority {
                role: role.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{ClusterColumn, ClusteringResult, build_table};
    use crate::constants::{ARG0, ARG1};
    use crate::roles::{RoleEntry, RoleValue, Statement};
    use approx::assert_relative_eq;

    fn tokens(words: &[&str]) -> RoleEntry {
        RoleEntry::Tokens(words.iter().map(|w| w.to_string()).collect())
    }

    fn statement(verb: &str, negated: bool, modal: Option<&str>) -> Statement {
        let mut s = Statement::new();
        s.insert(VERB.into(), tokens(&[verb]));
        s.insert(NEGATION.into(), RoleEntry::Flag(negated));
        if let Some(m) = modal {
            s.insert(MODAL.into(), tokens(&[m]));
        }
        s
    }

    fn roles() -> UsedRoles {
        UsedRoles::new([ARG0, VERB, NEGATION, MODAL, ARG1], [ARG0, VERB, ARG1]).unwrap()
    }

    fn labels() -> LabelTable {
        let mut l = LabelTable::new();
        l.insert_display(ARG0, RoleValue::Cluster(0), "government");
        l.insert_display(ARG0, RoleValue::Cluster(1), "people");
        l.insert_display(ARG1, RoleValue::Cluster(1), "tax");
        l.insert_display(ARG1, RoleValue::Cluster(2), "price");
        l.insert_display(VERB, RoleValue::Text("raise".into()), "raise");
        l.insert_display(VERB, RoleValue::Text("pay".into()), "pay");
        l.insert_display(NEGATION, RoleValue::Flag(true), "not");
        l.insert_display(NEGATION, RoleValue::Flag(false), "-");
        l.insert_display(MODAL, RoleValue::Label("will".into()), "will");
        l
    }

    fn engine() -> CoOccurrence {
        let statements = vec![
            statement("raise", false, Some("will")),
            statement("raise", false, Some("will")),
            statement("pay", true, None),
            statement("raise", false, None),
            statement("pay", false, None),
        ];
        let mut clustering = ClusteringResult::new();
        clustering.insert(ARG0.into(), ClusterColumn::new([0i64, 0, 1, 0], vec![0, 1, 2, 3]));
        clustering.insert(
            ARG1.into(),
            ClusterColumn::new([1i64, 1, 1, 2, 1], vec![0, 1, 2, 3, 4]),
        );
        let assembled = build_table(&roles(), &clustering, &statements, None).unwrap();
        CoOccurrence::new(assembled.table, labels(), roles()).unwrap()
    }

    fn set(roles: &[&str]) -> BTreeSet<String> {
        roles.iter().map(|r| r.to_string()).collect()
    }

    fn narrative(parts: &[&str]) -> Narrative {
        Narrative(parts.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn test_default_subset_is_all_roles() {
        let e = engine();
        assert_eq!(e.sublist(), roles().used());
        assert_eq!(e.subset(), set(&[ARG0, VERB, NEGATION, MODAL, ARG1]));
    }

    #[test]
    fn test_sublist_follows_declaration_order() {
        let mut e = engine();
        e.set_subset(Some(&set(&[ARG1, VERB, ARG0]))).unwrap();
        assert_eq!(e.sublist(), &[ARG0, VERB, ARG1]);
    }

    #[test]
    fn test_unknown_role_rejected_and_state_kept() {
        let mut e = engine();
        e.set_subset(Some(&set(&[ARG0, VERB]))).unwrap();
        let err = e.set_subset(Some(&set(&[ARG0, "ARG7"]))).unwrap_err();
        assert!(matches!(
            err,
            NarrativeError::UnknownRoles { ref requested, .. } if requested == &["ARG7"]
        ));
        assert_eq!(e.subset(), set(&[ARG0, VERB]));
    }

    #[test]
    fn test_counts_without_modifiers() {
        let mut e = engine();
        e.set_subset(Some(&set(&[ARG0, VERB, ARG1]))).unwrap();
        assert_eq!(e.normal_order(), vec![vec![ARG0], vec![VERB], vec![ARG1]]);

        let counts: Vec<_> = e.narratives_counts().unwrap().into_iter().collect();
        assert_eq!(
            counts,
            vec![
                (narrative(&["government", "raise", "tax"]), 2),
                (narrative(&["people", "pay", "tax"]), 1),
                (narrative(&["government", "raise", "price"]), 1),
            ]
        );
    }

    #[test]
    fn test_full_subset_uses_display_order() {
        let e = engine();
        assert_eq!(
            e.display_order().unwrap(),
            vec![ARG0, MODAL, VERB, NEGATION, ARG1]
        );
        let counts = e.narratives_counts().unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[&narrative(&["government", "will", "raise", "-", "tax"])], 2);
    }

    #[test]
    fn test_compound_key_formed_with_negation() {
        let mut e = engine();
        e.set_subset(Some(&set(&[ARG0, VERB, NEGATION]))).unwrap();
        assert_eq!(e.normal_order(), vec![vec![ARG0], vec![VERB, NEGATION]]);
        assert!(e.keys().iter().all(|k| k.len() == 2));
        assert!(matches!(e.keys()[0][1], KeyPart::Compound(ref v) if v.len() == 2));
    }

    #[test]
    fn test_pmi_counts_verb_and_modifiers_jointly() {
        let mut e = engine();
        e.set_subset(Some(&set(&[ARG0, VERB, NEGATION]))).unwrap();
        let pmi: Vec<_> = e.narratives_pmi().unwrap().into_iter().collect();
        // (people, [pay, not]) : 1 / (1 * 1)
        // (government, [raise, -]) : 3 / (3 * 3)
        assert_eq!(pmi[0].0, narrative(&["people", "pay", "not"]));
        assert_relative_eq!(pmi[0].1, 0.0);
        assert_eq!(pmi[1].0, narrative(&["government", "raise", "-"]));
        assert_relative_eq!(pmi[1].1, (1.0f64 / 3.0).ln());
    }

    #[test]
    fn test_pmi_flat_key() {
        let mut e = engine();
        e.set_subset(Some(&set(&[ARG0, VERB, ARG1]))).unwrap();
        let pmi = e.narratives_pmi().unwrap();
        let keys: Vec<_> = pmi.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                narrative(&["people", "pay", "tax"]),
                narrative(&["government", "raise", "price"]),
                narrative(&["government", "raise", "tax"]),
            ]
        );
        assert_relative_eq!(pmi[&keys[2]], (2.0f64 / 27.0).ln());
    }

    #[test]
    fn test_verb_first_compound() {
        let mut e = engine();
        e.set_subset(Some(&set(&[VERB, NEGATION]))).unwrap();
        assert_eq!(e.normal_order(), vec![vec![VERB, NEGATION]]);
        let counts = e.narratives_counts().unwrap();
        assert_eq!(counts[&narrative(&["raise", "-"])], 3);
        assert_eq!(counts[&narrative(&["pay", "not"])], 1);
        assert_eq!(counts[&narrative(&["pay", "-"])], 1);
    }

    #[test]
    fn test_idempotent_subset() {
        let mut e = engine();
        e.set_subset(Some(&set(&[ARG0, VERB]))).unwrap();
        let first = e.narratives_counts().unwrap();
        e.set_subset(Some(&set(&[ARG0, VERB]))).unwrap();
        assert_eq!(first, e.narratives_counts().unwrap());
    }

    #[test]
    fn test_counts_sum_to_complete_rows() {
        let mut e = engine();
        for subset in [
            vec![ARG0, VERB],
            vec![VERB, NEGATION],
            vec![ARG0, VERB, NEGATION, MODAL, ARG1],
            vec![ARG1],
        ] {
            e.set_subset(Some(&set(&subset))).unwrap();
            let total: usize = e.narratives_counts().unwrap().values().sum();
            assert_eq!(total, e.len());
            assert!(total <= 5);
        }
    }

    #[test]
    fn test_reset_subset_selects_every_role() {
        let mut e = engine();
        e.set_subset(Some(&set(&[VERB, NEGATION]))).unwrap();
        assert_eq!(e.len(), 5);
        e.set_subset(None).unwrap();
        assert_eq!(e.sublist(), roles().used());
        assert_eq!(e.normal_order(), vec![vec![ARG0], vec![VERB, NEGATION, MODAL, ARG1]]);
        assert_eq!(e.len(), 2);
    }

    #[test]
    fn test_label_collision_keeps_later_value_at_first_position() {
        let base = engine();
        let mut merged = labels();
        merged.insert_display(ARG1, RoleValue::Cluster(2), "tax");
        let mut e = CoOccurrence::new(base.table.clone(), merged, roles()).unwrap();
        e.set_subset(Some(&set(&[ARG0, VERB, ARG1]))).unwrap();

        let counts: Vec<_> = e.narratives_counts().unwrap().into_iter().collect();
        assert_eq!(
            counts,
            vec![
                (narrative(&["government", "raise", "tax"]), 1),
                (narrative(&["people", "pay", "tax"]), 1),
            ]
        );
        assert!(counts.iter().map(|(_, c)| c).sum::<usize>() < e.len());
    }

    #[test]
    fn test_missing_display_priority() {
        let assembled = engine();
        let e = CoOccurrence::with_display_order(
            assembled.table.clone(),
            labels(),
            roles(),
            [ARG0, VERB, NEGATION, MODAL],
        )
        .unwrap();
        let err = e.narratives_counts().unwrap_err();
        assert!(matches!(err, NarrativeError::MissingDisplayPriority { role } if role == ARG1));
        assert!(e.display_order().is_err());
    }

    #[test]
    fn test_missing_label() {
        let base = engine();
        let mut partial = labels();
        partial.insert(ARG1, RoleValue::Cluster(2), Vec::new());
        let mut e = CoOccurrence::new(base.table.clone(), partial, roles()).unwrap();
        e.set_subset(Some(&set(&[ARG0, ARG1]))).unwrap();
        let err = e.narratives_counts().unwrap_err();
        assert!(matches!(err, NarrativeError::MissingLabel { role, .. } if role == ARG1));
    }

    #[test]
    fn test_flatten_and_relabel_single_key() {
        let e = engine();
        let n = e.flatten_and_relabel(&e.keys()[0]).unwrap();
        assert_eq!(n, narrative(&["government", "will", "raise", "-", "tax"]));
    }
}
