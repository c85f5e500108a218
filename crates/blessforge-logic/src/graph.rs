//! Sigil tree evaluation — prerequisite-gated node selection.
//!
//! Nodes form a directed acyclic graph (validated at load time by
//! [`crate::content::validate_group`]). A node is selectable once all its
//! prerequisites are selected and its sigil cost is affordable, unless the
//! KP override waives the cost gate. Selection debits the ledger;
//! deselection credits it back, but only if the node was actually paid
//! for.
//!
//! Deselection is protected twice: it is rejected while any selected node
//! still lists the target as a prerequisite, and rejected if losing the
//! node's benefits would strand a category over its reduced quota. The
//! engine never silently drops a user's existing picks.

use log::debug;

use crate::content::GroupConfig;
use crate::error::EngineError;
use crate::ledger::{Currency, Ledger};
use crate::quota::available_quota;
use crate::state::GroupState;

/// Whether `node` can be selected (or is already selected — a selected
/// node reports selectable so a UI can treat clicks as toggles).
pub fn is_selectable(
    config: &GroupConfig,
    state: &GroupState,
    ledger: &Ledger,
    node: &str,
) -> bool {
    let Some(node_def) = config.node(node) else {
        return false;
    };
    if state.is_node_selected(node) {
        return true;
    }
    if node_def
        .prereqs
        .iter()
        .any(|p| !state.is_node_selected(p))
    {
        return false;
    }
    if state.is_overridden(node) {
        return true;
    }
    ledger.can_afford(Currency::Sigil(node_def.cost_kind), node_def.cost)
}

/// Selected nodes that list `node` as a prerequisite.
pub fn dependents_of<'a>(
    config: &'a GroupConfig,
    state: &GroupState,
    node: &str,
) -> Vec<&'a str> {
    config
        .nodes
        .iter()
        .filter(|n| state.is_node_selected(&n.id))
        .filter(|n| n.prereqs.iter().any(|p| p == node))
        .map(|n| n.id.as_str())
        .collect()
}

/// Select a tree node, debiting its sigil cost unless overridden.
/// Selecting an already-selected node is an accepted no-op.
pub fn select_node(
    config: &GroupConfig,
    state: &mut GroupState,
    ledger: &mut Ledger,
    node: &str,
) -> Result<(), EngineError> {
    let node_def = config
        .node(node)
        .ok_or_else(|| EngineError::UnknownNode(node.to_string()))?;
    if state.is_node_selected(node) {
        return Ok(());
    }
    if let Some(missing) = node_def
        .prereqs
        .iter()
        .find(|p| !state.is_node_selected(p))
    {
        return Err(EngineError::PrerequisiteNotMet {
            node: node.to_string(),
            missing: missing.clone(),
        });
    }

    let overridden = state.is_overridden(node);
    if !overridden {
        ledger.debit(Currency::Sigil(node_def.cost_kind), node_def.cost)?;
        state.paid_nodes.insert(node.to_string());
    }
    state.selected_nodes.push(node.to_string());
    debug!(
        "{}: selected node {node} ({}, paid: {})",
        config.id,
        node_def.cost_kind.name(),
        !overridden
    );
    Ok(())
}

/// Deselect a tree node, crediting its sigil cost back if it was paid.
/// Rejected while a dependent node is selected or while the node's quota
/// benefits are still in use. Deselecting an unselected node is an
/// accepted no-op.
pub fn deselect_node(
    config: &GroupConfig,
    state: &mut GroupState,
    ledger: &mut Ledger,
    node: &str,
) -> Result<(), EngineError> {
    let node_def = config
        .node(node)
        .ok_or_else(|| EngineError::UnknownNode(node.to_string()))?;
    if !state.is_node_selected(node) {
        return Ok(());
    }
    if let Some(dependent) = dependents_of(config, state, node).first() {
        return Err(EngineError::DependencyViolation {
            node: node.to_string(),
            dependent: dependent.to_string(),
        });
    }

    // Trial-remove the node and make sure no category ends up holding
    // more picks than its reduced quota allows.
    let mut trial = state.clone();
    trial.selected_nodes.retain(|n| n != node);
    for category in &config.categories {
        let selected = trial.selection_count(&category.id);
        let quota = available_quota(config, &trial, &category.id);
        if selected as u32 > quota {
            return Err(EngineError::QuotaWouldBeExceeded {
                category: category.id.clone(),
                selected,
                quota,
            });
        }
    }

    state.selected_nodes.retain(|n| n != node);
    if state.paid_nodes.remove(node) {
        ledger.credit(Currency::Sigil(node_def.cost_kind), node_def.cost);
    }
    debug!("{}: deselected node {node}", config.id);
    Ok(())
}

/// Nominal sigil cost of every currently selected, non-overridden node.
/// Feeds the magician Blessing Point charge.
pub fn total_sigil_tree_cost(config: &GroupConfig, state: &GroupState) -> u32 {
    state
        .selected_nodes
        .iter()
        .filter(|id| !state.is_overridden(id))
        .filter_map(|id| config.node(id))
        .map(|n| n.cost)
        .sum()
}

/// Selected, non-overridden nodes paying in the group's special sigil
/// kind. Feeds the magician Fortune Point charge.
pub fn special_sigil_count(config: &GroupConfig, state: &GroupState) -> u32 {
    state
        .selected_nodes
        .iter()
        .filter(|id| !state.is_overridden(id))
        .filter_map(|id| config.node(id))
        .filter(|n| n.cost_kind == config.special_sigil)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CategoryDef, NodeDef, OptionDef};
    use crate::ledger::SigilKind;
    use crate::quota::toggle_option;
    use std::collections::BTreeMap;

    const PURTH: Currency = Currency::Sigil(SigilKind::Purth);
    const UMBRA: Currency = Currency::Sigil(SigilKind::Umbra);

    /// Chain root → branch, where branch grants 2 picks in "gifts".
    fn chain_group() -> GroupConfig {
        GroupConfig {
            id: "chain".into(),
            name: "Chain".into(),
            special_sigil: SigilKind::Purth,
            nodes: vec![
                NodeDef {
                    id: "root".into(),
                    name: "Root".into(),
                    prereqs: vec![],
                    cost_kind: SigilKind::Purth,
                    cost: 1,
                    benefits: BTreeMap::new(),
                },
                NodeDef {
                    id: "branch".into(),
                    name: "Branch".into(),
                    prereqs: vec!["root".into()],
                    cost_kind: SigilKind::Umbra,
                    cost: 2,
                    benefits: BTreeMap::from([("gifts".to_string(), 2)]),
                },
            ],
            categories: vec![CategoryDef {
                id: "gifts".into(),
                name: "Gifts".into(),
                base_quota: 0,
                options: vec![
                    OptionDef {
                        id: "g1".into(),
                        name: "G1".into(),
                        requires: vec![],
                    },
                    OptionDef {
                        id: "g2".into(),
                        name: "G2".into(),
                        requires: vec![],
                    },
                ],
            }],
            boosts: vec![],
            shared_bonus: None,
            slots: vec![],
        }
    }

    fn funded_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.credit(PURTH, 3);
        ledger.credit(UMBRA, 3);
        ledger
    }

    #[test]
    fn prerequisite_gates_selection() {
        let config = chain_group();
        let mut state = GroupState::new();
        let mut ledger = funded_ledger();

        assert!(!is_selectable(&config, &state, &ledger, "branch"));
        let err = select_node(&config, &mut state, &mut ledger, "branch").unwrap_err();
        assert_eq!(
            err,
            EngineError::PrerequisiteNotMet {
                node: "branch".into(),
                missing: "root".into(),
            }
        );
        assert_eq!(ledger.get(UMBRA), 3);

        select_node(&config, &mut state, &mut ledger, "root").unwrap();
        assert!(is_selectable(&config, &state, &ledger, "branch"));
        select_node(&config, &mut state, &mut ledger, "branch").unwrap();
        assert_eq!(ledger.get(PURTH), 2);
        assert_eq!(ledger.get(UMBRA), 1);
    }

    #[test]
    fn select_deselect_restores_balances_exactly() {
        let config = chain_group();
        let mut state = GroupState::new();
        let mut ledger = funded_ledger();

        select_node(&config, &mut state, &mut ledger, "root").unwrap();
        select_node(&config, &mut state, &mut ledger, "branch").unwrap();
        deselect_node(&config, &mut state, &mut ledger, "branch").unwrap();
        deselect_node(&config, &mut state, &mut ledger, "root").unwrap();

        assert_eq!(ledger, funded_ledger());
        assert!(state.selected_nodes.is_empty());
        assert!(state.paid_nodes.is_empty());
    }

    #[test]
    fn dependent_blocks_deselect() {
        let config = chain_group();
        let mut state = GroupState::new();
        let mut ledger = funded_ledger();

        select_node(&config, &mut state, &mut ledger, "root").unwrap();
        select_node(&config, &mut state, &mut ledger, "branch").unwrap();
        let err = deselect_node(&config, &mut state, &mut ledger, "root").unwrap_err();
        assert_eq!(
            err,
            EngineError::DependencyViolation {
                node: "root".into(),
                dependent: "branch".into(),
            }
        );
        assert!(state.is_node_selected("root"));
        assert_eq!(ledger.get(PURTH), 2);
    }

    #[test]
    fn used_benefits_block_deselect() {
        let config = chain_group();
        let mut state = GroupState::new();
        let mut ledger = funded_ledger();

        select_node(&config, &mut state, &mut ledger, "root").unwrap();
        select_node(&config, &mut state, &mut ledger, "branch").unwrap();
        assert_eq!(available_quota(&config, &state, "gifts"), 2);
        toggle_option(&config, &mut state, "gifts", "g1").unwrap();
        toggle_option(&config, &mut state, "gifts", "g2").unwrap();

        let err = deselect_node(&config, &mut state, &mut ledger, "branch").unwrap_err();
        assert_eq!(
            err,
            EngineError::QuotaWouldBeExceeded {
                category: "gifts".into(),
                selected: 2,
                quota: 0,
            }
        );
        assert!(state.is_node_selected("branch"));

        // Removing one pick is not enough; both must go.
        toggle_option(&config, &mut state, "gifts", "g2").unwrap();
        assert!(matches!(
            deselect_node(&config, &mut state, &mut ledger, "branch"),
            Err(EngineError::QuotaWouldBeExceeded { .. })
        ));
        toggle_option(&config, &mut state, "gifts", "g1").unwrap();
        deselect_node(&config, &mut state, &mut ledger, "branch").unwrap();
        assert_eq!(ledger.get(UMBRA), 3);
    }

    #[test]
    fn override_bypasses_cost_but_not_prereqs() {
        let config = chain_group();
        let mut state = GroupState::new();
        let mut ledger = Ledger::new(); // every balance zero

        state.overrides.insert("branch".into());
        // Prerequisite check still applies.
        assert!(!is_selectable(&config, &state, &ledger, "branch"));

        state.overrides.insert("root".into());
        assert!(is_selectable(&config, &state, &ledger, "root"));
        select_node(&config, &mut state, &mut ledger, "root").unwrap();
        select_node(&config, &mut state, &mut ledger, "branch").unwrap();
        assert_eq!(ledger.get(PURTH), 0);
        assert_eq!(ledger.get(UMBRA), 0);
        assert!(state.paid_nodes.is_empty());
    }

    #[test]
    fn overridden_node_credits_nothing_on_deselect() {
        let config = chain_group();
        let mut state = GroupState::new();
        let mut ledger = funded_ledger();

        state.overrides.insert("root".into());
        select_node(&config, &mut state, &mut ledger, "root").unwrap();
        assert_eq!(ledger.get(PURTH), 3);
        deselect_node(&config, &mut state, &mut ledger, "root").unwrap();
        assert_eq!(ledger.get(PURTH), 3);
    }

    #[test]
    fn reselect_is_noop() {
        let config = chain_group();
        let mut state = GroupState::new();
        let mut ledger = funded_ledger();

        select_node(&config, &mut state, &mut ledger, "root").unwrap();
        select_node(&config, &mut state, &mut ledger, "root").unwrap();
        assert_eq!(ledger.get(PURTH), 2);
        assert_eq!(state.selected_nodes.len(), 1);
    }

    #[test]
    fn tree_cost_skips_overridden_nodes() {
        let config = chain_group();
        let mut state = GroupState::new();
        let mut ledger = funded_ledger();

        select_node(&config, &mut state, &mut ledger, "root").unwrap();
        select_node(&config, &mut state, &mut ledger, "branch").unwrap();
        assert_eq!(total_sigil_tree_cost(&config, &state), 3);
        assert_eq!(special_sigil_count(&config, &state), 1); // root pays Purth

        state.overrides.insert("root".into());
        assert_eq!(total_sigil_tree_cost(&config, &state), 2);
        assert_eq!(special_sigil_count(&config, &state), 0);
    }

    #[test]
    fn unknown_node_rejected() {
        let config = chain_group();
        let mut state = GroupState::new();
        let mut ledger = funded_ledger();
        assert!(!is_selectable(&config, &state, &ledger, "nope"));
        assert_eq!(
            select_node(&config, &mut state, &mut ledger, "nope"),
            Err(EngineError::UnknownNode("nope".into()))
        );
    }
}
