//! Cross-reference slots and the sub-build budget validator.
//!
//! Some selections point at externally stored sub-builds — companions,
//! beasts, vehicles, weapons — kept in a library the engine only reads.
//! A slot holds at most one assignment; assigning is gated by the slot's
//! current budget and tag filters, both recomputed on every call.
//!
//! Budgets can shrink after an assignment is made (a boost that raised the
//! budget goes off). The engine deliberately does not un-assign in that
//! case: the stale assignment is reported as over budget by
//! [`assignment_status`] and it is the host's call what to do about it.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::content::{GroupConfig, SlotDef};
use crate::error::{EngineError, IneligibleReason};
use crate::state::GroupState;

/// One externally stored sub-build, keyed by (category, name).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LibraryEntry {
    pub category: String,
    pub name: String,
    /// Resolved point cost of the sub-build.
    pub cost: u32,
    pub tags: BTreeSet<String>,
}

/// Read-only view over the external sub-build library.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubBuildLibrary {
    entries: BTreeMap<(String, String), LibraryEntry>,
}

impl SubBuildLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: LibraryEntry) {
        self.entries
            .insert((entry.category.clone(), entry.name.clone()), entry);
    }

    pub fn get(&self, category: &str, name: &str) -> Option<&LibraryEntry> {
        self.entries
            .get(&(category.to_string(), name.to_string()))
    }

    /// Entries of one category, in name order.
    pub fn in_category<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a LibraryEntry> {
        let category = category.to_string();
        self.entries
            .values()
            .filter(move |e| e.category == category)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tag constraints applied when filling a slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    /// At least one of these must be present (empty = unconstrained).
    pub include: Vec<String>,
    /// None of these may be present.
    pub exclude: Vec<String>,
    /// This exact tag must be present.
    pub required: Option<String>,
}

impl TagFilter {
    pub fn from_slot(slot: &SlotDef) -> Self {
        Self {
            include: slot.include_tags.clone(),
            exclude: slot.exclude_tags.clone(),
            required: slot.required_tag.clone(),
        }
    }
}

/// Check one entry against a budget and filter. `Ok` means assignable.
pub fn check_eligibility(
    entry: &LibraryEntry,
    budget: u32,
    filter: &TagFilter,
) -> Result<(), IneligibleReason> {
    if entry.cost > budget {
        return Err(IneligibleReason::OverBudget {
            cost: entry.cost,
            budget,
        });
    }
    if !filter.include.is_empty()
        && !filter.include.iter().any(|t| entry.tags.contains(t))
    {
        return Err(IneligibleReason::NotIncluded);
    }
    if let Some(excluded) = filter.exclude.iter().find(|t| entry.tags.contains(*t)) {
        return Err(IneligibleReason::ExcludedTag(excluded.clone()));
    }
    if let Some(required) = &filter.required {
        if !entry.tags.contains(required) {
            return Err(IneligibleReason::MissingRequiredTag(required.clone()));
        }
    }
    Ok(())
}

/// All library entries a slot with this budget and filter could take,
/// sorted by name for stable display.
pub fn list_eligible<'a>(
    library: &'a SubBuildLibrary,
    category: &str,
    budget: u32,
    filter: &TagFilter,
) -> Vec<&'a LibraryEntry> {
    library
        .in_category(category)
        .filter(|e| check_eligibility(e, budget, filter).is_ok())
        .collect()
}

/// A slot's budget right now: base plus any active-boost bonus.
pub fn slot_budget(config: &GroupConfig, state: &GroupState, slot: &SlotDef) -> u32 {
    let mut budget = slot.base_budget;
    if let Some((boost_key, bonus)) = &slot.boost_budget {
        if state.active_boost(boost_key).is_some() {
            budget += bonus;
        }
    }
    budget
}

/// Current standing of a slot's assignment, re-validated on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentStatus {
    pub name: String,
    pub cost: u32,
    pub budget: u32,
    /// The budget shrank below the assignment's cost since it was made.
    pub over_budget: bool,
}

/// Assign a named sub-build to a slot, replacing any current assignment.
/// The write path re-checks budget and tags even though a well-behaved
/// host only offers names from [`list_eligible`].
pub fn assign_slot(
    config: &GroupConfig,
    state: &mut GroupState,
    library: &SubBuildLibrary,
    slot: &str,
    name: &str,
) -> Result<(), EngineError> {
    let slot_def = config
        .slot(slot)
        .ok_or_else(|| EngineError::UnknownSlot(slot.to_string()))?;
    let entry = library
        .get(&slot_def.category, name)
        .ok_or_else(|| EngineError::UnknownEntry {
            category: slot_def.category.clone(),
            name: name.to_string(),
        })?;

    let budget = slot_budget(config, state, slot_def);
    let filter = TagFilter::from_slot(slot_def);
    check_eligibility(entry, budget, &filter).map_err(|reason| {
        EngineError::IneligibleAssignment {
            slot: slot.to_string(),
            name: name.to_string(),
            reason,
        }
    })?;

    state.assignments.insert(slot.to_string(), name.to_string());
    debug!("{}: slot {slot} assigned {name}", config.id);
    Ok(())
}

/// Clear a slot. Clearing an empty slot is an accepted no-op.
pub fn clear_slot(
    config: &GroupConfig,
    state: &mut GroupState,
    slot: &str,
) -> Result<(), EngineError> {
    if config.slot(slot).is_none() {
        return Err(EngineError::UnknownSlot(slot.to_string()));
    }
    if state.assignments.remove(slot).is_some() {
        debug!("{}: slot {slot} cleared", config.id);
    }
    Ok(())
}

/// Re-validate a slot's assignment against its current budget. `None` if
/// the slot is unknown, empty, or its entry vanished from the library.
pub fn assignment_status(
    config: &GroupConfig,
    state: &GroupState,
    library: &SubBuildLibrary,
    slot: &str,
) -> Option<AssignmentStatus> {
    let slot_def = config.slot(slot)?;
    let name = state.assignments.get(slot)?;
    let entry = library.get(&slot_def.category, name)?;
    let budget = slot_budget(config, state, slot_def);
    Some(AssignmentStatus {
        name: name.clone(),
        cost: entry.cost,
        budget,
        over_budget: entry.cost > budget,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boost::set_boost;
    use crate::content::{BoostDef, CategoryDef, GroupConfig, SlotDef};
    use crate::ledger::{Currency, Ledger, SigilKind};

    fn entry(name: &str, cost: u32, tags: &[&str]) -> LibraryEntry {
        LibraryEntry {
            category: "companion".into(),
            name: name.into(),
            cost,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn library() -> SubBuildLibrary {
        let mut lib = SubBuildLibrary::new();
        lib.insert(entry("Ashmane", 55, &["fierce", "mounted"]));
        lib.insert(entry("Bellwether", 35, &["gentle"]));
        lib.insert(entry("Cinder", 40, &["fierce"]));
        lib.insert(entry("Drift", 20, &["gentle", "winged"]));
        lib
    }

    fn slotted_group() -> GroupConfig {
        GroupConfig {
            id: "slotted".into(),
            name: "Slotted".into(),
            special_sigil: SigilKind::Purth,
            nodes: vec![],
            categories: vec![CategoryDef {
                id: "cat".into(),
                name: "Cat".into(),
                base_quota: 0,
                options: vec![],
            }],
            boosts: vec![BoostDef {
                key: "patron".into(),
                categories: vec!["cat".into()],
                bonus: 0,
                variants: vec![SigilKind::Kyrrin],
            }],
            shared_bonus: None,
            slots: vec![SlotDef {
                id: "companion_slot".into(),
                category: "companion".into(),
                base_budget: 40,
                boost_budget: Some(("patron".into(), 30)),
                include_tags: vec![],
                exclude_tags: vec![],
                required_tag: None,
            }],
        }
    }

    #[test]
    fn listing_respects_budget_and_sorts_by_name() {
        let lib = library();
        let names: Vec<_> = list_eligible(&lib, "companion", 40, &TagFilter::default())
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bellwether", "Cinder", "Drift"]);
    }

    #[test]
    fn tag_filters_apply() {
        let lib = library();
        let filter = TagFilter {
            include: vec!["fierce".into()],
            ..Default::default()
        };
        let names: Vec<_> = list_eligible(&lib, "companion", 100, &filter)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ashmane", "Cinder"]);

        let filter = TagFilter {
            exclude: vec!["fierce".into()],
            required: Some("winged".into()),
            ..Default::default()
        };
        let names: Vec<_> = list_eligible(&lib, "companion", 100, &filter)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Drift"]);
    }

    #[test]
    fn boost_raises_budget_on_next_query() {
        let config = slotted_group();
        let lib = library();
        let mut state = GroupState::new();
        let mut ledger = Ledger::new();
        ledger.credit(Currency::Sigil(SigilKind::Kyrrin), 1);

        let slot = config.slot("companion_slot").unwrap();
        assert_eq!(slot_budget(&config, &state, slot), 40);
        assert!(matches!(
            assign_slot(&config, &mut state, &lib, "companion_slot", "Ashmane"),
            Err(EngineError::IneligibleAssignment {
                reason: IneligibleReason::OverBudget { cost: 55, budget: 40 },
                ..
            })
        ));

        set_boost(&config, &mut state, &mut ledger, "patron", Some(SigilKind::Kyrrin))
            .unwrap();
        assert_eq!(slot_budget(&config, &state, slot), 70);
        assign_slot(&config, &mut state, &lib, "companion_slot", "Ashmane").unwrap();
        assert_eq!(
            state.assignments.get("companion_slot").map(String::as_str),
            Some("Ashmane")
        );
    }

    #[test]
    fn budget_shrink_flags_but_keeps_the_assignment() {
        let config = slotted_group();
        let lib = library();
        let mut state = GroupState::new();
        let mut ledger = Ledger::new();
        ledger.credit(Currency::Sigil(SigilKind::Kyrrin), 1);

        set_boost(&config, &mut state, &mut ledger, "patron", Some(SigilKind::Kyrrin))
            .unwrap();
        assign_slot(&config, &mut state, &lib, "companion_slot", "Ashmane").unwrap();
        set_boost(&config, &mut state, &mut ledger, "patron", None).unwrap();

        let status = assignment_status(&config, &state, &lib, "companion_slot").unwrap();
        assert_eq!(status.name, "Ashmane");
        assert!(status.over_budget);
        assert_eq!(status.budget, 40);
        // Still assigned — the engine never auto-removes.
        assert!(state.assignments.contains_key("companion_slot"));
    }

    #[test]
    fn assignment_is_a_pure_pointer_update() {
        let config = slotted_group();
        let lib = library();
        let mut state = GroupState::new();

        assign_slot(&config, &mut state, &lib, "companion_slot", "Drift").unwrap();
        // Replacing and clearing touch no ledger and no other state.
        assign_slot(&config, &mut state, &lib, "companion_slot", "Cinder").unwrap();
        assert_eq!(
            state.assignments.get("companion_slot").map(String::as_str),
            Some("Cinder")
        );
        clear_slot(&config, &mut state, "companion_slot").unwrap();
        clear_slot(&config, &mut state, "companion_slot").unwrap();
        assert!(state.assignments.is_empty());
    }

    #[test]
    fn unknown_slot_and_entry_rejected() {
        let config = slotted_group();
        let lib = library();
        let mut state = GroupState::new();
        assert!(matches!(
            assign_slot(&config, &mut state, &lib, "nope", "Drift"),
            Err(EngineError::UnknownSlot(_))
        ));
        assert!(matches!(
            assign_slot(&config, &mut state, &lib, "companion_slot", "Nobody"),
            Err(EngineError::UnknownEntry { .. })
        ));
    }
}
