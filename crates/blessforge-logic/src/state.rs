//! Runtime state of one Blessing.
//!
//! A [`GroupState`] starts empty at session start and is mutated only
//! through the operations in [`crate::graph`], [`crate::quota`],
//! [`crate::boost`], and [`crate::crossref`]. Quotas and budgets are never
//! stored here — they are pure functions of this state plus the group's
//! [`crate::content::GroupConfig`], so they can never drift from the
//! selections that justify them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ledger::SigilKind;

/// The meta point charge recorded when the magician multiplier was
/// enabled. Disabling credits exactly these amounts back, even if the
/// tree changed in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicianCharge {
    pub blessing_points: u32,
    pub fortune_points: u32,
}

/// Mutable per-group state. Selection lists preserve insertion order for
/// display; membership checks treat them as sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupState {
    /// Selected tree nodes, in selection order.
    pub selected_nodes: Vec<String>,
    /// Nodes whose sigil cost was actually debited (not overridden at
    /// selection time). Deselection credits only these.
    pub paid_nodes: BTreeSet<String>,
    /// Picked options per category, in pick order.
    pub selections: BTreeMap<String, Vec<String>>,
    /// Active boost variants: boost key → paying sigil kind.
    pub boosts: BTreeMap<String, SigilKind>,
    /// Nodes with the KP override active — their sigil gate is waived.
    pub overrides: BTreeSet<String>,
    /// Set while the feature-wide cost multiplier is enabled.
    pub magician: Option<MagicianCharge>,
    /// Cross-reference slot assignments: slot id → sub-build name.
    pub assignments: BTreeMap<String, String>,
}

impl GroupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_node_selected(&self, node: &str) -> bool {
        self.selected_nodes.iter().any(|n| n == node)
    }

    pub fn is_option_selected(&self, category: &str, option: &str) -> bool {
        self.selections
            .get(category)
            .is_some_and(|picks| picks.iter().any(|o| o == option))
    }

    /// Number of options currently picked in a category.
    pub fn selection_count(&self, category: &str) -> usize {
        self.selections.get(category).map_or(0, Vec::len)
    }

    pub fn is_overridden(&self, node: &str) -> bool {
        self.overrides.contains(node)
    }

    pub fn active_boost(&self, key: &str) -> Option<SigilKind> {
        self.boosts.get(key).copied()
    }

    /// Every selected identifier in the group — options across all
    /// categories plus tree nodes. This is the universe option `requires`
    /// lists are resolved against.
    pub fn selected_ids(&self) -> BTreeSet<&str> {
        self.selections
            .values()
            .flatten()
            .map(String::as_str)
            .chain(self.selected_nodes.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_has_nothing_selected() {
        let state = GroupState::new();
        assert!(!state.is_node_selected("anything"));
        assert_eq!(state.selection_count("anything"), 0);
        assert!(state.selected_ids().is_empty());
    }

    #[test]
    fn selected_ids_spans_options_and_nodes() {
        let mut state = GroupState::new();
        state.selected_nodes.push("node_a".into());
        state
            .selections
            .insert("cat".into(), vec!["opt_x".into(), "opt_y".into()]);
        let ids = state.selected_ids();
        assert!(ids.contains("node_a"));
        assert!(ids.contains("opt_x"));
        assert!(ids.contains("opt_y"));
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn selection_order_is_preserved() {
        let mut state = GroupState::new();
        state
            .selections
            .insert("cat".into(), vec!["b".into(), "a".into()]);
        assert_eq!(state.selections["cat"], vec!["b", "a"]);
    }
}
