//! Bill-splitting allocation.
//!
//! Each assigned item is divided evenly between its assignees; the running totals are
//! rounded to cents only at the end. Rounded shares are not reconciled against the
//! bill total, so they may drift from it by a few cents.

use crate::domain::{Assignment, LineItem, money};
use rust_decimal::Decimal;
use serde::Serialize;

/// What one participant owes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    pub name: String,
    pub amount: Decimal,
}

/// Per-participant amounts keyed by trimmed name, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Allocation {
    shares: Vec<Share>,
}

impl Allocation {
    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    pub fn get(&self, name: &str) -> Option<Decimal> {
        self.shares
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.amount)
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Sum of the rounded shares. Compare with the bill total to see rounding drift
    /// and unassigned items.
    pub fn total(&self) -> Decimal {
        money::sum(self.shares.iter().map(|s| s.amount))
    }

    fn slot(&mut self, name: &str) -> usize {
        match self.shares.iter().position(|s| s.name == name) {
            Some(i) => i,
            None => {
                self.shares.push(Share {
                    name: name.to_string(),
                    amount: Decimal::ZERO,
                });
                self.shares.len() - 1
            }
        }
    }
}

/// Computes what each named participant owes.
///
/// * Blank participants get no entry and absorb nothing.
/// * Participants with the same trimmed name share one entry.
/// * Unassigned items are dropped, not split between everyone.
/// * Bad prices count as zero; indices outside `participants` are ignored.
pub fn allocate(items: &[LineItem], participants: &[String], assignment: &Assignment) -> Allocation {
    let mut result = Allocation::default();
    // participant index -> result slot
    let slots: Vec<Option<usize>> = participants
        .iter()
        .map(|name| {
            let key = name.trim();
            (!key.is_empty()).then(|| result.slot(key))
        })
        .collect();

    for (index, item) in items.iter().enumerate() {
        let count = assignment.assigned_count(index);
        if count == 0 {
            continue;
        }
        let per_person = item.amount() / Decimal::from(count);
        for participant in assignment.assigned(index) {
            if let Some(Some(slot)) = slots.get(participant) {
                let share = &mut result.shares[*slot];
                share.amount = money::saturating_add(share.amount, per_person);
            }
        }
    }

    for share in &mut result.shares {
        share.amount = money::round_cents(share.amount);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn assignment(pairs: &[(usize, &[usize])]) -> Assignment {
        let mut a = Assignment::new();
        for (item, people) in pairs {
            for p in *people {
                a.assign(*item, *p);
            }
        }
        a
    }

    #[test]
    fn test_even_split() {
        let items = vec![LineItem::new("Pizza", "10.00")];
        let result = allocate(&items, &names(&["Alice", "Bob"]), &assignment(&[(0, &[0, 1])]));
        assert_eq!(result.get("Alice"), Some(d("5.00")));
        assert_eq!(result.get("Bob"), Some(d("5.00")));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_mixed_assignment() {
        let items = vec![
            LineItem::new("Pizza", "10.00"),
            LineItem::new("Soda", "2.50"),
        ];
        let result = allocate(
            &items,
            &names(&["Alice", "Bob"]),
            &assignment(&[(0, &[0]), (1, &[0, 1])]),
        );
        assert_eq!(result.get("Alice"), Some(d("11.25")));
        assert_eq!(result.get("Bob"), Some(d("1.25")));
    }

    #[test]
    fn test_single_assignee_pays_full_price() {
        let items = vec![
            LineItem::new("Steak", "27.99"),
            LineItem::new("Salad", "8.45"),
        ];
        let result = allocate(
            &items,
            &names(&["Alice", "Bob"]),
            &assignment(&[(0, &[1]), (1, &[0])]),
        );
        assert_eq!(result.get("Alice"), Some(d("8.45")));
        assert_eq!(result.get("Bob"), Some(d("27.99")));
    }

    #[test]
    fn test_unassigned_items_are_dropped() {
        let items = vec![
            LineItem::new("Pizza", "10.00"),
            LineItem::new("Wine", "30.00"),
        ];
        let result = allocate(&items, &names(&["Alice", "Bob"]), &assignment(&[(0, &[0])]));
        assert_eq!(result.get("Alice"), Some(d("10.00")));
        assert_eq!(result.get("Bob"), Some(d("0.00")));
        assert_eq!(result.total(), d("10.00"));
    }

    #[test]
    fn test_blank_participants_excluded() {
        let items = vec![LineItem::new("Pizza", "9.00")];
        let result = allocate(
            &items,
            &names(&["Alice", "  ", ""]),
            &assignment(&[(0, &[0, 1, 2])]),
        );
        // the blank assignees still count as divisors
        assert_eq!(result.shares().len(), 1);
        assert_eq!(result.get("Alice"), Some(d("3.00")));
        assert_eq!(result.get(""), None);
    }

    #[test]
    fn test_duplicate_names_accumulate() {
        let items = vec![LineItem::new("A", "4.00"), LineItem::new("B", "6.00")];
        let result = allocate(
            &items,
            &names(&["Sam", " Sam "]),
            &assignment(&[(0, &[0]), (1, &[1])]),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("Sam"), Some(d("10.00")));
    }

    #[test]
    fn test_rounding_happens_after_accumulation() {
        // 1/3 + 1/3 + 1/3 per person would be 0.99 if rounded per item
        let items = vec![
            LineItem::new("a", "1.00"),
            LineItem::new("b", "1.00"),
            LineItem::new("c", "1.00"),
        ];
        let result = allocate(
            &items,
            &names(&["X", "Y", "Z"]),
            &assignment(&[(0, &[0, 1, 2]), (1, &[0, 1, 2]), (2, &[0, 1, 2])]),
        );
        assert_eq!(result.get("X"), Some(d("1.00")));
    }

    #[test]
    fn test_rounding_drift_is_not_reconciled() {
        let items = vec![LineItem::new("Cake", "10.00")];
        let result = allocate(
            &items,
            &names(&["X", "Y", "Z"]),
            &assignment(&[(0, &[0, 1, 2])]),
        );
        for share in result.shares() {
            assert_eq!(share.amount, d("3.33"));
        }
        assert_eq!(result.total(), d("9.99"));
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        let items = vec![LineItem::new("Gum", "0.25")];
        let result = allocate(&items, &names(&["X", "Y"]), &assignment(&[(0, &[0, 1])]));
        assert_eq!(result.get("X"), Some(d("0.13")));
    }

    #[test]
    fn test_bad_prices_count_as_zero() {
        let items = vec![
            LineItem::new("Mystery", "n/a"),
            LineItem::new("Water", "2.00x"),
        ];
        let result = allocate(&items, &names(&["X"]), &assignment(&[(0, &[0]), (1, &[0])]));
        assert_eq!(result.get("X"), Some(d("2.00")));
    }

    #[test]
    fn test_out_of_range_participant_ignored() {
        let items = vec![LineItem::new("Pizza", "10.00")];
        let result = allocate(&items, &names(&["Alice"]), &assignment(&[(0, &[0, 4])]));
        assert_eq!(result.get("Alice"), Some(d("5.00")));
    }

    #[test]
    fn test_result_order_follows_participants() {
        let result = allocate(&[], &names(&["Zed", "", "Amy"]), &Assignment::new());
        let order: Vec<&str> = result.shares().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(order, vec!["Zed", "Amy"]);
        assert!(result.shares().iter().all(|s| s.amount.is_zero()));
    }

    #[test]
    fn test_huge_prices_do_not_overflow() {
        let max = "79228162514264337593543950335";
        let items = vec![
            LineItem::new("A", max),
            LineItem::new("B", max),
            LineItem::new("C", "4.00"),
        ];
        let result = allocate(
            &items,
            &names(&["X", "Y"]),
            &assignment(&[(0, &[0]), (1, &[0]), (2, &[0, 1])]),
        );
        assert_eq!(result.get("X"), Some(d("2.00")));
        assert_eq!(result.get("Y"), Some(d("2.00")));
        assert_eq!(result.total(), d("4.00"));
    }
}
