//! Index-based participant list and item assignment.
//!
//! Positions double as identity here, so removing a participant re-keys every
//! assignment set. [`crate::domain::SplitSession`] avoids this with stable ids and
//! projects back onto these types for allocation.

use std::collections::{BTreeMap, BTreeSet};

/// Item index -> set of participant indices sharing that item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    sets: BTreeMap<usize, BTreeSet<usize>>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Participants assigned to `item`; empty when the item is unassigned.
    pub fn assigned(&self, item: usize) -> impl Iterator<Item = usize> + '_ {
        self.sets.get(&item).into_iter().flatten().copied()
    }

    pub fn assigned_count(&self, item: usize) -> usize {
        self.sets.get(&item).map_or(0, BTreeSet::len)
    }

    pub fn is_assigned(&self, item: usize, participant: usize) -> bool {
        self.sets
            .get(&item)
            .is_some_and(|set| set.contains(&participant))
    }

    pub fn assign(&mut self, item: usize, participant: usize) {
        self.sets.entry(item).or_default().insert(participant);
    }

    /// Adds if absent, removes if present. Returns whether the participant is now assigned.
    pub fn toggle(&mut self, item: usize, participant: usize) -> bool {
        let set = self.sets.entry(item).or_default();
        if set.remove(&participant) {
            false
        } else {
            set.insert(participant);
            true
        }
    }

    /// Drops `index` from every set and shifts higher indices down by one.
    pub fn remove_participant(&mut self, index: usize) {
        for set in self.sets.values_mut() {
            *set = set
                .iter()
                .filter(|&&p| p != index)
                .map(|&p| if p > index { p - 1 } else { p })
                .collect();
        }
    }
}

/// Ordered participant names. Starts with a single blank entry ready for editing.
///
/// This is the index-based input of [`crate::domain::allocate`]. [`SplitSession`] keeps
/// stable ids and projects into it with [`SplitSession::registry`]; callers without
/// stable ids can edit it directly together with an [`Assignment`].
///
/// [`SplitSession`]: crate::domain::SplitSession
/// [`SplitSession::registry`]: crate::domain::SplitSession::registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRegistry {
    names: Vec<String>,
}

impl Default for ParticipantRegistry {
    fn default() -> Self {
        Self {
            names: vec![String::new()],
        }
    }
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of participants with a non-blank name.
    pub fn named_count(&self) -> usize {
        self.names.iter().filter(|n| !n.trim().is_empty()).count()
    }

    /// Appends a blank participant and returns its index.
    pub fn add(&mut self) -> usize {
        self.names.push(String::new());
        self.names.len() - 1
    }

    /// Returns false when `index` is out of range. Duplicate names are allowed.
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.names.get_mut(index) {
            Some(slot) => {
                *slot = name.into();
                true
            }
            None => false,
        }
    }

    /// Removes the participant and cascades the removal into `assignment`.
    pub fn remove(&mut self, index: usize, assignment: &mut Assignment) -> Option<String> {
        if index >= self.names.len() {
            return None;
        }
        let removed = self.names.remove(index);
        assignment.remove_participant(index);
        Some(removed)
    }
}
