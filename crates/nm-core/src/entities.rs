//! Named-entity mining over postprocessed roles.
//!
//! An entity matches a role when its whitespace-split tokens appear in the
//! role's tokens in order, gaps allowed. Matched roles are emptied in the
//! returned copy of the statements so they never reach embedding or
//! clustering. The statement index of every match is recorded under
//! (role, entity) in an [`EntityIndex`] that the caller threads through
//! successive batches together with the running statement offset.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ENTITY_ROLES;
use crate::roles::{RoleEntry, Statement};

/// Whether `needle` is a (not necessarily contiguous) subsequence of
/// `haystack`. Each haystack token is consumed at most once.
pub fn is_subsequence<A, B>(needle: &[A], haystack: &[B]) -> bool
where
    B: PartialEq<A>,
{
    let mut remaining = haystack.iter();
    needle.iter().all(|n| remaining.any(|h| h == n))
}

/// Absolute statement indices per role, per entity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIndex(BTreeMap<String, BTreeMap<String, BTreeSet<usize>>>);

impl EntityIndex {
    /// Index with an empty entry for every (role, entity) pair.
    pub fn with_entries<R, E>(roles: &[R], entities: &[E]) -> Self
    where
        R: AsRef<str>,
        E: AsRef<str>,
    {
        let inner = roles
            .iter()
            .map(|role| {
                let per_entity = entities
                    .iter()
                    .map(|e| (e.as_ref().to_string(), BTreeSet::new()))
                    .collect();
                (role.as_ref().to_string(), per_entity)
            })
            .collect();
        Self(inner)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Statements in which `entity` was found in `role`.
    pub fn statements(&self, role: &str, entity: &str) -> Option<&BTreeSet<usize>> {
        self.0.get(role)?.get(entity)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every (role, entity, statements) triple.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &BTreeSet<usize>)> {
        self.0.iter().flat_map(|(role, per_entity)| {
            per_entity
                .iter()
                .map(move |(entity, hits)| (role.as_str(), entity.as_str(), hits))
        })
    }

    fn record(&mut self, role: &str, entity: &str, statement: usize) {
        self.0
            .entry(role.to_string())
            .or_default()
            .entry(entity.to_string())
            .or_default()
            .insert(statement);
    }
}

/// Output of one [`mine_entities`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mined {
    /// Offset for the next batch.
    pub offset: usize,
    pub index: EntityIndex,
    /// Copy of the input with every matched role emptied.
    pub statements: Vec<Statement>,
}

/// Mine `entities` out of `roles` of every statement.
///
/// Statement `i` of this batch is recorded as `offset + i`. An empty `index`
/// is initialised with an empty entry for every (role, entity) pair.
pub fn mine_entities<E, R>(
    statements: &[Statement],
    entities: &[E],
    offset: usize,
    index: EntityIndex,
    roles: &[R],
) -> Mined
where
    E: AsRef<str>,
    R: AsRef<str>,
{
    let mut index = if index.is_empty() {
        EntityIndex::with_entries(roles, entities)
    } else {
        index
    };

    let entity_tokens: Vec<(&str, Vec<&str>)> = entities
        .iter()
        .map(|e| (e.as_ref(), e.as_ref().split_whitespace().collect()))
        .collect();

    let mut stripped = statements.to_vec();
    let mut matches = 0usize;

    for (i, statement) in statements.iter().enumerate() {
        for role in roles {
            let role: &str = role.as_ref();
            let Some(tokens) = statement.get(role).and_then(RoleEntry::tokens) else {
                continue;
            };
            for (entity, needle) in &entity_tokens {
                if is_subsequence(needle.as_slice(), tokens) {
                    index.record(role, entity, i + offset);
                    stripped[i].insert(role.to_string(), RoleEntry::Tokens(Vec::new()));
                    matches += 1;
                }
            }
        }
    }

    tracing::debug!(
        "mined {matches} entity matches in statements {offset}..{}",
        offset + statements.len()
    );

    Mined {
        offset: offset + statements.len(),
        index,
        statements: stripped,
    }
}

/// Single-writer mining state: the running offset and accumulated index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityMiner {
    roles: Vec<String>,
    offset: usize,
    index: EntityIndex,
}

impl EntityMiner {
    /// Miner searching the default roles (ARG0, ARG1).
    pub fn new() -> Self {
        Self::with_roles(DEFAULT_ENTITY_ROLES)
    }

    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            offset: 0,
            index: EntityIndex::default(),
        }
    }

    /// Mine the next batch. Returns the batch with matched roles emptied.
    pub fn mine<E: AsRef<str>>(
        &mut self,
        statements: &[Statement],
        entities: &[E],
    ) -> Vec<Statement> {
        let index = std::mem::take(&mut self.index);
        let mined = mine_entities(statements, entities, self.offset, index, &self.roles);
        self.offset = mined.offset;
        self.index = mined.index;
        mined.statements
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn index(&self) -> &EntityIndex {
        &self.index
    }

    pub fn into_index(self) -> EntityIndex {
        self.index
    }
}

impl Default for EntityMiner {
    fn default() -> Self {
        Self::new()
    }
}
