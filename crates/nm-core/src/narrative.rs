//! Counting keys and their display form.
//!
//! A counting key is one [`KeyPart`] per independent component. When the verb
//! is selected together with a modifier role, the verb and every role after
//! it collapse into a single [`KeyPart::Compound`] so that verb plus
//! modifiers are counted jointly. [`split_compound`] builds that layout and
//! [`flatten_key`] undoes it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::roles::RoleValue;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Single(RoleValue),
    Compound(Vec<RoleValue>),
}

pub type NarrativeKey = Vec<KeyPart>;

/// One independent part per value.
pub fn plain_key(row: Vec<RoleValue>) -> NarrativeKey {
    row.into_iter().map(KeyPart::Single).collect()
}

/// Keep `row[..verb_position]` as separate parts and nest
/// `row[verb_position..]` into one compound part.
///
/// A `verb_position` past the end of the row leaves the row flat.
pub fn split_compound(mut row: Vec<RoleValue>, verb_position: usize) -> NarrativeKey {
    if verb_position >= row.len() {
        return plain_key(row);
    }
    let tail = row.split_off(verb_position);
    let mut key = plain_key(row);
    key.push(KeyPart::Compound(tail));
    key
}

/// Values of `key` in role order, compound parts spliced back in place.
pub fn flatten_key(key: &[KeyPart]) -> Vec<&RoleValue> {
    key.iter()
        .flat_map(|part| match part {
            KeyPart::Single(value) => std::slice::from_ref(value),
            KeyPart::Compound(values) => values.as_slice(),
        })
        .collect()
}

/// Human-readable narrative: one display string per role, in display order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Narrative(pub Vec<String>);

impl Narrative {
    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Vec<RoleValue> {
        vec![
            RoleValue::Cluster(1),
            RoleValue::Text("pay".into()),
            RoleValue::Flag(true),
            RoleValue::Label("must".into()),
            RoleValue::Cluster(9),
        ]
    }

    #[test]
    fn test_split_nests_from_verb() {
        let key = split_compound(row(), 1);
        assert_eq!(key.len(), 2);
        assert_eq!(key[0], KeyPart::Single(RoleValue::Cluster(1)));
        assert_eq!(key[1], KeyPart::Compound(row()[1..].to_vec()));
    }

    #[test]
    fn test_split_verb_first() {
        let key = split_compound(row(), 0);
        assert_eq!(key, vec![KeyPart::Compound(row())]);
    }

    #[test]
    fn test_split_past_end_is_flat() {
        assert_eq!(split_compound(row(), 5), plain_key(row()));
    }

    #[test]
    fn test_flatten_inverts_split() {
        for position in 0..=row().len() {
            let key = split_compound(row(), position);
            let flat: Vec<RoleValue> = flatten_key(&key).into_iter().cloned().collect();
            assert_eq!(flat, row(), "verb position {position}");
        }
    }

    #[test]
    fn test_narrative_display() {
        let n = Narrative(vec!["government".into(), "raise".into(), "tax".into()]);
        assert_eq!(n.to_string(), "(government, raise, tax)");
        assert_eq!(Narrative(Vec::new()).to_string(), "()");
    }
}
