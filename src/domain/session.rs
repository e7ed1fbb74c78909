//! Split session: the state of one "split the bill" step.
//!
//! Built from a staged [`Bill`]; items and participants get stable ids on creation,
//! so removing someone never re-keys assignments. Index-based views are projected on
//! demand for [`allocate`].

use crate::domain::{
    Allocation, Assignment, Bill, DomainError, ItemId, LineItem, Participant, ParticipantId,
    ParticipantRegistry, allocate,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A bill line with its session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionItem {
    pub id: ItemId,
    pub item: LineItem,
}

#[derive(Debug, Clone)]
pub struct SplitSession {
    items: Vec<SessionItem>,
    participants: Vec<Participant>,
    assignments: HashMap<ItemId, HashSet<ParticipantId>>,
    opened_at: DateTime<Utc>,
}

impl SplitSession {
    /// Opens a session with one blank participant and every item unassigned.
    pub fn new(bill: Bill) -> Self {
        let items: Vec<SessionItem> = bill
            .items()
            .iter()
            .cloned()
            .map(|item| SessionItem {
                id: ItemId::new(),
                item,
            })
            .collect();
        let assignments = items.iter().map(|i| (i.id, HashSet::new())).collect();
        Self {
            items,
            participants: vec![Participant::blank()],
            assignments,
            opened_at: Utc::now(),
        }
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn items(&self) -> &[SessionItem] {
        &self.items
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Participants that take part in the allocation.
    pub fn named_participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_named())
    }

    pub fn bill_total(&self) -> Decimal {
        Bill::new(self.items.iter().map(|i| i.item.clone()).collect()).total()
    }

    pub fn add_participant(&mut self) -> ParticipantId {
        let participant = Participant::blank();
        let id = participant.id;
        self.participants.push(participant);
        id
    }

    pub fn rename_participant(
        &mut self,
        id: ParticipantId,
        name: impl Into<String>,
    ) -> Result<(), DomainError> {
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::UnknownParticipant(id.to_string()))?;
        participant.name = name.into();
        Ok(())
    }

    /// Removes the participant and their assignments. The last participant stays.
    pub fn remove_participant(&mut self, id: ParticipantId) -> Result<Participant, DomainError> {
        let index = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DomainError::UnknownParticipant(id.to_string()))?;
        if self.participants.len() == 1 {
            return Err(DomainError::LastParticipant);
        }
        for assigned in self.assignments.values_mut() {
            assigned.remove(&id);
        }
        debug!(participant = %id, "participant removed");
        Ok(self.participants.remove(index))
    }

    /// Adds if absent, removes if present. Returns whether the participant is now assigned.
    pub fn toggle_assignment(
        &mut self,
        item: ItemId,
        participant: ParticipantId,
    ) -> Result<bool, DomainError> {
        self.ensure_participant(participant)?;
        let assigned = self
            .assignments
            .get_mut(&item)
            .ok_or_else(|| DomainError::UnknownItem(item.to_string()))?;
        if assigned.remove(&participant) {
            Ok(false)
        } else {
            assigned.insert(participant);
            Ok(true)
        }
    }

    /// Replaces the assignees of `item`.
    pub fn set_assignees(
        &mut self,
        item: ItemId,
        participants: &[ParticipantId],
    ) -> Result<(), DomainError> {
        for &p in participants {
            self.ensure_participant(p)?;
        }
        let assigned = self
            .assignments
            .get_mut(&item)
            .ok_or_else(|| DomainError::UnknownItem(item.to_string()))?;
        *assigned = participants.iter().copied().collect();
        Ok(())
    }

    pub fn is_assigned(&self, item: ItemId, participant: ParticipantId) -> bool {
        self.assignments
            .get(&item)
            .is_some_and(|set| set.contains(&participant))
    }

    /// Index view of the assignments, in current item and participant order.
    pub fn assignment(&self) -> Assignment {
        let positions: HashMap<ParticipantId, usize> = self
            .participants
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();
        let mut assignment = Assignment::new();
        for (item_index, item) in self.items.iter().enumerate() {
            let Some(assigned) = self.assignments.get(&item.id) else {
                continue;
            };
            for id in assigned {
                if let Some(&p) = positions.get(id) {
                    assignment.assign(item_index, p);
                }
            }
        }
        assignment
    }

    /// Participant names in display order, positioned to match [`Self::assignment`].
    pub fn registry(&self) -> ParticipantRegistry {
        ParticipantRegistry::from_names(self.participants.iter().map(|p| p.name.clone()))
    }

    /// Per-person totals. Needs at least one named participant.
    pub fn calculate(&self) -> Result<Allocation, DomainError> {
        let registry = self.registry();
        if registry.named_count() == 0 {
            return Err(DomainError::NoParticipants);
        }
        let items: Vec<LineItem> = self.items.iter().map(|i| i.item.clone()).collect();
        Ok(allocate(&items, registry.names(), &self.assignment()))
    }

    fn ensure_participant(&self, id: ParticipantId) -> Result<(), DomainError> {
        if self.participants.iter().any(|p| p.id == id) {
            Ok(())
        } else {
            Err(DomainError::UnknownParticipant(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn pizza_and_soda() -> SplitSession {
        SplitSession::new(Bill::new(vec![
            LineItem::new("Pizza", "10.00"),
            LineItem::new("Soda", "2.50"),
        ]))
    }

    #[test]
    fn test_new_session_has_one_blank_participant() {
        let session = pizza_and_soda();
        assert_eq!(session.participants().len(), 1);
        assert!(!session.participants()[0].is_named());
        assert_eq!(session.items().len(), 2);
        assert_eq!(session.bill_total(), d("12.50"));
        assert!(matches!(session.calculate(), Err(DomainError::NoParticipants)));
    }

    #[test]
    fn test_calculate_split() {
        let mut session = pizza_and_soda();
        let alice = session.participants()[0].id;
        session.rename_participant(alice, "Alice").unwrap();
        let bob = session.add_participant();
        session.rename_participant(bob, "Bob").unwrap();

        let pizza = session.items()[0].id;
        let soda = session.items()[1].id;
        assert!(session.toggle_assignment(pizza, alice).unwrap());
        session.set_assignees(soda, &[alice, bob]).unwrap();

        let result = session.calculate().unwrap();
        assert_eq!(result.get("Alice"), Some(d("11.25")));
        assert_eq!(result.get("Bob"), Some(d("1.25")));
    }

    #[test]
    fn test_toggle_twice_unassigns() {
        let mut session = pizza_and_soda();
        let p = session.participants()[0].id;
        let item = session.items()[0].id;
        assert!(session.toggle_assignment(item, p).unwrap());
        assert!(session.is_assigned(item, p));
        assert!(!session.toggle_assignment(item, p).unwrap());
        assert!(!session.is_assigned(item, p));
    }

    #[test]
    fn test_remove_participant_keeps_other_assignments() {
        let mut session = pizza_and_soda();
        let a = session.participants()[0].id;
        let b = session.add_participant();
        let c = session.add_participant();
        for (id, name) in [(a, "A"), (b, "B"), (c, "C")] {
            session.rename_participant(id, name).unwrap();
        }
        let pizza = session.items()[0].id;
        session.set_assignees(pizza, &[a, b, c]).unwrap();

        session.remove_participant(b).unwrap();

        assert!(!session.is_assigned(pizza, b));
        assert!(session.is_assigned(pizza, c));
        // the index projection shifts C from 2 to 1
        let assignment = session.assignment();
        assert_eq!(assignment.assigned(0).collect::<Vec<_>>(), vec![0, 1]);

        let result = session.calculate().unwrap();
        assert_eq!(result.get("A"), Some(d("5.00")));
        assert_eq!(result.get("C"), Some(d("5.00")));
        assert_eq!(result.get("B"), None);
    }

    #[test]
    fn test_projection_matches_index_registry() {
        let mut session = pizza_and_soda();
        let a = session.participants()[0].id;
        let b = session.add_participant();
        let c = session.add_participant();
        for (id, name) in [(a, "A"), (b, "B"), (c, "C")] {
            session.rename_participant(id, name).unwrap();
        }
        let pizza = session.items()[0].id;
        session.set_assignees(pizza, &[a, b, c]).unwrap();

        let mut registry = ParticipantRegistry::from_names(["A", "B", "C"]);
        let mut assignment = Assignment::new();
        for p in 0..3 {
            assignment.assign(0, p);
        }
        assert_eq!(session.registry(), registry);
        assert_eq!(session.assignment(), assignment);

        session.remove_participant(b).unwrap();
        registry.remove(1, &mut assignment);
        assert_eq!(session.registry(), registry);
        assert_eq!(session.assignment(), assignment);
        assert_eq!(session.registry().named_count(), 2);
        assert_eq!(session.named_participants().count(), 2);
    }

    #[test]
    fn test_cannot_remove_last_participant() {
        let mut session = pizza_and_soda();
        let only = session.participants()[0].id;
        assert!(matches!(
            session.remove_participant(only),
            Err(DomainError::LastParticipant)
        ));
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let mut session = pizza_and_soda();
        let p = session.participants()[0].id;
        let item = session.items()[0].id;
        assert!(matches!(
            session.toggle_assignment(ItemId::new(), p),
            Err(DomainError::UnknownItem(_))
        ));
        assert!(matches!(
            session.toggle_assignment(item, ParticipantId::new()),
            Err(DomainError::UnknownParticipant(_))
        ));
        assert!(session.rename_participant(ParticipantId::new(), "x").is_err());
        assert!(session.remove_participant(ParticipantId::new()).is_err());
    }
}
