//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Two steps: parse a receipt and edit its items, then split the staged bill between
//! people. Esc in a prompt goes back one level.

use crate::domain::{
    Allocation, Bill, DomainError, Extraction, ItemId, ParticipantId, SplitSession, money,
};
use crate::ports::InputPort;
use crate::usecases::{ExtractionService, SplitService};
use async_trait::async_trait;
use inquire::ui::RenderConfig;
use inquire::{Confirm, InquireError, Select, Text};
use rust_decimal::Decimal;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Applies the colored inquire theme globally.
pub fn apply_theme() {
    inquire::set_global_render_config(RenderConfig::default_colored());
}

/// `Ok(None)` when the user pressed Esc.
fn answer<T>(result: Result<T, InquireError>) -> Result<Option<T>, DomainError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

/// Index of `choice` in `options`. Labels carry a position prefix, so they are unique.
fn pick(options: &[String], choice: &str) -> Option<usize> {
    options.iter().position(|o| o == choice)
}

fn money_label(value: Decimal, currency: &str) -> String {
    let amount = money::format_cents(value);
    if currency.is_empty() {
        format!("${}", amount)
    } else {
        format!("{} {}", amount, currency)
    }
}

fn item_label(index: usize, name: &str, price: &str) -> String {
    let name = if name.trim().is_empty() { "(unnamed)" } else { name };
    format!("{}. {} ({})", index + 1, name, price)
}

/// The name, or a "(Person N name)" placeholder for blank entries.
fn display_name(index: usize, name: &str) -> String {
    if name.trim().is_empty() {
        format!("(Person {} name)", index + 1)
    } else {
        name.to_string()
    }
}

fn participant_label(index: usize, name: &str) -> String {
    format!("{}. {}", index + 1, display_name(index, name))
}

/// Toggle choices for `item`: named people, plus blank ones still assigned to it.
/// Blank assignees divide the price without receiving a share, so they stay visible.
fn toggle_choices(session: &SplitSession, item: ItemId) -> Vec<(ParticipantId, String)> {
    session
        .participants()
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_named() || session.is_assigned(item, p.id))
        .map(|(i, p)| {
            let mark = if session.is_assigned(item, p.id) { "[x]" } else { "[ ]" };
            (p.id, format!("{} {}", mark, participant_label(i, &p.name)))
        })
        .collect()
}

/// Item list with total and price warnings.
fn render_bill(bill: &Bill, currency: &str) -> String {
    let mut out = String::from("\nExtracted items\n");
    if bill.is_empty() {
        out.push_str("  (no items)\n");
    }
    for (i, item) in bill.items().iter().enumerate() {
        out.push_str(&format!("  {}\n", item_label(i, &item.name, &item.price)));
    }
    out.push_str(&format!("Total: {}\n", money_label(bill.total(), currency)));
    let invalid = bill.invalid_prices();
    if !invalid.is_empty() {
        let positions: Vec<String> = invalid.iter().map(|i| (i + 1).to_string()).collect();
        out.push_str(&format!(
            "Warning: item(s) {} have no valid price and count as 0.00\n",
            positions.join(", ")
        ));
    }
    out
}

/// Participants and who shares each item.
fn render_session(session: &SplitSession) -> String {
    let mut out = String::from("\nPeople\n");
    for (i, p) in session.participants().iter().enumerate() {
        out.push_str(&format!("  {}\n", participant_label(i, &p.name)));
    }
    out.push_str("Items\n");
    for (i, entry) in session.items().iter().enumerate() {
        let names: Vec<String> = session
            .participants()
            .iter()
            .enumerate()
            .filter(|(_, p)| session.is_assigned(entry.id, p.id))
            .map(|(i, p)| display_name(i, &p.name))
            .collect();
        let who = if names.is_empty() {
            "unassigned".to_string()
        } else {
            names.join(", ")
        };
        out.push_str(&format!(
            "  {} [{}]\n",
            item_label(i, &entry.item.name, &entry.item.price),
            who
        ));
    }
    out
}

/// Split results followed by the bill total. Mentions any gap between the two.
fn render_results(allocation: &Allocation, bill_total: Decimal) -> String {
    let mut out = String::from("\nSplit results\n");
    for share in allocation.shares() {
        out.push_str(&format!("  {:<20} {}\n", share.name, money_label(share.amount, "")));
    }
    out.push_str(&format!("Total: {}\n", money_label(bill_total, "")));
    let gap = bill_total - allocation.total();
    if !gap.is_zero() {
        out.push_str(&format!(
            "Note: shares add up to {} ({} not covered by unassigned items or rounding)\n",
            money_label(allocation.total(), ""),
            money_label(gap, "")
        ));
    }
    out
}

#[derive(Clone, Copy)]
enum MainAction {
    ParseReceipt,
    SplitStaged,
    ResetStaged,
    Quit,
}

impl fmt::Display for MainAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MainAction::ParseReceipt => "Parse a receipt photo",
            MainAction::SplitStaged => "Split the last parsed bill",
            MainAction::ResetStaged => "Forget the last parsed bill",
            MainAction::Quit => "Quit",
        })
    }
}

#[derive(Clone, Copy)]
enum EditAction {
    EditItem,
    AddItem,
    RemoveItem,
    SplitBill,
    Discard,
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditAction::EditItem => "Edit an item",
            EditAction::AddItem => "Add item",
            EditAction::RemoveItem => "Remove an item",
            EditAction::SplitBill => "Split the bill",
            EditAction::Discard => "Discard and go back",
        })
    }
}

#[derive(Clone, Copy)]
enum SplitAction {
    AddPerson,
    RenamePerson,
    RemovePerson,
    AssignItem,
    Calculate,
    Back,
}

impl fmt::Display for SplitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplitAction::AddPerson => "Add person",
            SplitAction::RenamePerson => "Name a person",
            SplitAction::RemovePerson => "Remove a person",
            SplitAction::AssignItem => "Assign an item",
            SplitAction::Calculate => "Calculate split",
            SplitAction::Back => "Back to bill parser",
        })
    }
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    extraction: Arc<ExtractionService>,
    split: Arc<SplitService>,
}

impl TuiInputPort {
    pub fn new(extraction: Arc<ExtractionService>, split: Arc<SplitService>) -> Self {
        Self { extraction, split }
    }

    async fn parse_receipt(&self) -> Result<(), DomainError> {
        let Some(raw_path) = answer(Text::new("Receipt image path:").prompt())? else {
            return Ok(());
        };
        let path = PathBuf::from(raw_path.trim().trim_matches(|c: char| c == '"' || c == '\''));

        let pb = crate::adapters::ui::progress::spinner("Processing...");
        let result = self.extraction.extract_file(&path).await;
        pb.finish_and_clear();

        let extracted = match result {
            Ok(Extraction::Parsed(extracted)) => extracted,
            Ok(Extraction::Unparsed { error, raw_text }) => {
                println!("\n{}\n--- model reply ---\n{}\n-------------------", error, raw_text);
                return Ok(());
            }
            Err(e) => {
                println!("\n{}", e);
                return Ok(());
            }
        };

        let currency = extracted.currency.clone().unwrap_or_default();
        let mut bill = Bill::new(extracted.items);
        if self.edit_bill(&mut bill, &currency)? {
            self.split.stage_bill(&bill).await?;
            self.split_staged().await?;
        }
        Ok(())
    }

    /// Returns true when the user wants to split the edited bill.
    fn edit_bill(&self, bill: &mut Bill, currency: &str) -> Result<bool, DomainError> {
        loop {
            println!("{}", render_bill(bill, currency));
            let actions = vec![
                EditAction::SplitBill,
                EditAction::EditItem,
                EditAction::AddItem,
                EditAction::RemoveItem,
                EditAction::Discard,
            ];
            let Some(action) = answer(Select::new("What next?", actions).prompt())? else {
                return Ok(false);
            };
            match action {
                EditAction::SplitBill => return Ok(true),
                EditAction::Discard => return Ok(false),
                EditAction::AddItem => {
                    let index = bill.add_item();
                    self.edit_item(bill, index)?;
                }
                EditAction::EditItem => {
                    if let Some(index) = self.choose_item(bill, "Edit which item?")? {
                        self.edit_item(bill, index)?;
                    }
                }
                EditAction::RemoveItem => {
                    if let Some(index) = self.choose_item(bill, "Remove which item?")? {
                        bill.remove_item(index);
                    }
                }
            }
        }
    }

    fn choose_item(&self, bill: &Bill, message: &str) -> Result<Option<usize>, DomainError> {
        if bill.is_empty() {
            println!("No items yet.");
            return Ok(None);
        }
        let options: Vec<String> = bill
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| item_label(i, &item.name, &item.price))
            .collect();
        let choice = answer(Select::new(message, options.clone()).prompt())?;
        Ok(choice.and_then(|c| pick(&options, &c)))
    }

    fn edit_item(&self, bill: &mut Bill, index: usize) -> Result<(), DomainError> {
        let Some(item) = bill.items().get(index).cloned() else {
            return Ok(());
        };
        if let Some(name) = answer(
            Text::new("Item name:")
                .with_default(&item.name)
                .prompt(),
        )? {
            bill.update_name(index, name);
        }
        if let Some(price) = answer(Text::new("Price:").with_default(&item.price).prompt())? {
            if money::parse_strict(&price).is_err() {
                println!("{:?} is not a valid price; it will count as 0.00", price);
            }
            bill.update_price(index, price);
        }
        Ok(())
    }

    async fn split_staged(&self) -> Result<(), DomainError> {
        let mut session = match self.split.open_session().await {
            Ok(session) => session,
            Err(DomainError::MissingBill) => {
                println!("\n{}", DomainError::MissingBill);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        info!(opened_at = %session.opened_at(), "splitting bill");

        loop {
            println!("{}", render_session(&session));
            let actions = vec![
                SplitAction::RenamePerson,
                SplitAction::AddPerson,
                SplitAction::AssignItem,
                SplitAction::Calculate,
                SplitAction::RemovePerson,
                SplitAction::Back,
            ];
            let Some(action) = answer(Select::new("What next?", actions).prompt())? else {
                return Ok(());
            };
            match action {
                SplitAction::Back => return Ok(()),
                SplitAction::AddPerson => {
                    let id = session.add_participant();
                    self.rename_person(&mut session, id)?;
                }
                SplitAction::RenamePerson => {
                    if let Some(id) = self.choose_person(&session, "Name which person?")? {
                        self.rename_person(&mut session, id)?;
                    }
                }
                SplitAction::RemovePerson => {
                    if let Some(id) = self.choose_person(&session, "Remove which person?")? {
                        if let Err(e) = session.remove_participant(id) {
                            println!("{}", e);
                        }
                    }
                }
                SplitAction::AssignItem => self.assign_item(&mut session)?,
                SplitAction::Calculate => match session.calculate() {
                    Ok(allocation) => {
                        println!("{}", render_results(&allocation, session.bill_total()));
                        let done = answer(
                            Confirm::new("Done with this bill?")
                                .with_default(false)
                                .prompt(),
                        )?;
                        if done == Some(true) {
                            return Ok(());
                        }
                    }
                    Err(e) => println!("{}", e),
                },
            }
        }
    }

    fn choose_person(
        &self,
        session: &SplitSession,
        message: &str,
    ) -> Result<Option<ParticipantId>, DomainError> {
        let people: Vec<(ParticipantId, String)> = session
            .participants()
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, participant_label(i, &p.name)))
            .collect();
        let options: Vec<String> = people.iter().map(|(_, label)| label.clone()).collect();
        let choice = answer(Select::new(message, options.clone()).prompt())?;
        Ok(choice
            .and_then(|c| pick(&options, &c))
            .map(|index| people[index].0))
    }

    fn rename_person(
        &self,
        session: &mut SplitSession,
        id: ParticipantId,
    ) -> Result<(), DomainError> {
        let current = session
            .participants()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        if let Some(name) = answer(Text::new("Name:").with_default(&current).prompt())? {
            session.rename_participant(id, name)?;
        }
        Ok(())
    }

    /// Pick an item, then toggle people on it until "Done".
    fn assign_item(&self, session: &mut SplitSession) -> Result<(), DomainError> {
        let options: Vec<String> = session
            .items()
            .iter()
            .enumerate()
            .map(|(i, entry)| item_label(i, &entry.item.name, &entry.item.price))
            .collect();
        if options.is_empty() {
            println!("This bill has no items.");
            return Ok(());
        }
        let Some(choice) = answer(Select::new("Assign which item?", options.clone()).prompt())?
        else {
            return Ok(());
        };
        let Some(index) = pick(&options, &choice) else {
            return Ok(());
        };
        let item: ItemId = session.items()[index].id;

        const DONE: &str = "Done";
        loop {
            let people = toggle_choices(session, item);
            if people.is_empty() {
                println!("Name at least one person first.");
                return Ok(());
            }
            let mut labels: Vec<String> = people.iter().map(|(_, l)| l.clone()).collect();
            labels.push(DONE.to_string());
            let Some(choice) = answer(Select::new("Toggle who shares it:", labels.clone()).prompt())?
            else {
                return Ok(());
            };
            match pick(&labels, &choice) {
                Some(i) if i < people.len() => {
                    session.toggle_assignment(item, people[i].0)?;
                }
                _ => return Ok(()),
            }
        }
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let actions = vec![
                MainAction::ParseReceipt,
                MainAction::SplitStaged,
                MainAction::ResetStaged,
                MainAction::Quit,
            ];
            let Some(action) = answer(Select::new("Smart Bill Parser", actions).prompt())? else {
                return Ok(());
            };
            match action {
                MainAction::ParseReceipt => self.parse_receipt().await?,
                MainAction::SplitStaged => self.split_staged().await?,
                MainAction::ResetStaged => self.split.reset().await?,
                MainAction::Quit => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineItem;

    #[test]
    fn test_render_bill_warns_about_bad_prices() {
        let bill = Bill::new(vec![
            LineItem::new("Pizza", "10.00"),
            LineItem::new("", "ten"),
        ]);
        let text = render_bill(&bill, "USD");
        assert!(text.contains("1. Pizza (10.00)"));
        assert!(text.contains("2. (unnamed) (ten)"));
        assert!(text.contains("Total: 10.00 USD"));
        assert!(text.contains("item(s) 2 have no valid price"));
    }

    #[test]
    fn test_render_results_reports_gap() {
        let mut session = SplitSession::new(Bill::new(vec![
            LineItem::new("Cake", "10.00"),
            LineItem::new("Tea", "2.00"),
        ]));
        let ids: Vec<ParticipantId> = (0..2).map(|_| session.add_participant()).collect();
        let first = session.participants()[0].id;
        for (id, name) in [(first, "X"), (ids[0], "Y"), (ids[1], "Z")] {
            session.rename_participant(id, name).unwrap();
        }
        let cake = session.items()[0].id;
        session.set_assignees(cake, &[first, ids[0], ids[1]]).unwrap();

        let allocation = session.calculate().unwrap();
        let text = render_results(&allocation, session.bill_total());
        assert!(text.contains("$3.33"));
        assert!(text.contains("Total: $12.00"));
        assert!(text.contains("shares add up to $9.99 ($2.01 not covered"));
    }

    #[test]
    fn test_render_session_lists_assignees() {
        let mut session = SplitSession::new(Bill::new(vec![LineItem::new("Soup", "4.00")]));
        let p = session.participants()[0].id;
        let soup = session.items()[0].id;
        let before = render_session(&session);
        assert!(before.contains("1. (Person 1 name)"));
        assert!(before.contains("[unassigned]"));

        session.rename_participant(p, "Ann").unwrap();
        session.toggle_assignment(soup, p).unwrap();
        assert!(render_session(&session).contains("1. Soup (4.00) [Ann]"));
    }

    #[test]
    fn test_blank_assignee_stays_visible() {
        let mut session = SplitSession::new(Bill::new(vec![LineItem::new("Soup", "4.00")]));
        let ann = session.participants()[0].id;
        let bob = session.add_participant();
        session.rename_participant(ann, "Ann").unwrap();
        session.rename_participant(bob, "Bob").unwrap();
        let soup = session.items()[0].id;
        session.set_assignees(soup, &[ann, bob]).unwrap();
        session.rename_participant(bob, "  ").unwrap();

        assert!(render_session(&session).contains("1. Soup (4.00) [Ann, (Person 2 name)]"));
        let labels: Vec<String> = toggle_choices(&session, soup)
            .into_iter()
            .map(|(_, label)| label)
            .collect();
        assert_eq!(labels, vec!["[x] 1. Ann", "[x] 2. (Person 2 name)"]);

        session.toggle_assignment(soup, bob).unwrap();
        assert!(render_session(&session).contains("[Ann]"));
        assert_eq!(toggle_choices(&session, soup).len(), 1);
    }

    #[test]
    fn test_pick_by_label() {
        let options = vec![participant_label(0, "Sam"), participant_label(1, "Sam")];
        assert_eq!(pick(&options, "2. Sam"), Some(1));
        assert_eq!(pick(&options, "3. Sam"), None);
    }
}
