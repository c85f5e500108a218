//! Pick-pool quotas and option selection.
//!
//! A category's quota is never stored: it is recomputed on every call as
//! base quota + benefits from currently selected tree nodes + active boost
//! bonuses + (possibly) a shared bonus. Any mutation elsewhere in the
//! engine is therefore reflected by the very next quota query.
//!
//! # Shared bonus
//!
//! Some groups grant a single bonus usable by only a few of several
//! categories at once ("whichever is using it"). A category *consumes* the
//! shared bonus when its selection count exceeds its base-only quota (the
//! quota with the shared bonus excluded). While fewer categories consume
//! it than its capacity allows, the bonus still shows up in every eligible
//! category's `available_quota`; at capacity it disappears from the
//! others, without ever invalidating existing selections.

use log::debug;

use crate::content::GroupConfig;
use crate::error::EngineError;
use crate::state::GroupState;

/// Outcome of a successful [`toggle_option`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
}

/// Quota contribution from active boosts for one category.
pub fn boost_bonus(config: &GroupConfig, state: &GroupState, category: &str) -> u32 {
    config
        .boosts
        .iter()
        .filter(|b| state.active_boost(&b.key).is_some())
        .filter(|b| b.categories.iter().any(|c| c == category))
        .map(|b| b.bonus)
        .sum()
}

/// Quota excluding any shared bonus: base + node benefits + boost bonus.
pub fn base_only_quota(config: &GroupConfig, state: &GroupState, category: &str) -> u32 {
    let base = config.category(category).map_or(0, |c| c.base_quota);
    let from_nodes: u32 = state
        .selected_nodes
        .iter()
        .filter_map(|id| config.node(id))
        .filter_map(|node| node.benefits.get(category))
        .sum();
    base + from_nodes + boost_bonus(config, state, category)
}

/// Categories currently consuming the shared bonus: those holding more
/// selections than their base-only quota covers, in the configuration's
/// category order, capped at the bonus capacity. The cap matters when a
/// quota-reducing action is being trialled: a state where more categories
/// lean on the bonus than its capacity covers must leave the excess ones
/// without it, so the trial fails instead of double-counting one slot.
pub fn shared_bonus_consumers<'a>(
    config: &'a GroupConfig,
    state: &GroupState,
) -> Vec<&'a str> {
    let Some(shared) = &config.shared_bonus else {
        return Vec::new();
    };
    if !state.is_node_selected(&shared.node) {
        return Vec::new();
    }
    shared
        .categories
        .iter()
        .map(String::as_str)
        .filter(|cat| state.selection_count(cat) as u32 > base_only_quota(config, state, cat))
        .take(shared.capacity as usize)
        .collect()
}

/// The quota a category may fill right now.
pub fn available_quota(config: &GroupConfig, state: &GroupState, category: &str) -> u32 {
    let base_only = base_only_quota(config, state, category);
    let Some(shared) = &config.shared_bonus else {
        return base_only;
    };
    if !state.is_node_selected(&shared.node) || !shared.categories.iter().any(|c| c == category)
    {
        return base_only;
    }
    let consumers = shared_bonus_consumers(config, state);
    if consumers.contains(&category) || (consumers.len() as u32) < shared.capacity {
        base_only + shared.bonus
    } else {
        base_only
    }
}

/// Whether clicking `option` in `category` would do anything.
///
/// A selected option is always "selectable" — clicking it deselects it.
pub fn can_select_option(
    config: &GroupConfig,
    state: &GroupState,
    category: &str,
    option: &str,
) -> bool {
    if state.is_option_selected(category, option) {
        return true;
    }
    let Some(category_def) = config.category(category) else {
        return false;
    };
    let Some(option_def) = category_def.options.iter().find(|o| o.id == option) else {
        return false;
    };
    let selected = state.selected_ids();
    if option_def
        .requires
        .iter()
        .any(|req| !selected.contains(req.as_str()))
    {
        return false;
    }
    (state.selection_count(category) as u32) < available_quota(config, state, category)
}

/// Toggle an option in a pick-pool. Selecting consumes quota; deselecting
/// frees it. No ledger effect either way — quota was already paid for when
/// the granting nodes or boosts were.
pub fn toggle_option(
    config: &GroupConfig,
    state: &mut GroupState,
    category: &str,
    option: &str,
) -> Result<Toggle, EngineError> {
    let category_def = config
        .category(category)
        .ok_or_else(|| EngineError::UnknownCategory(category.to_string()))?;
    let option_def = category_def
        .options
        .iter()
        .find(|o| o.id == option)
        .ok_or_else(|| EngineError::UnknownOption {
            category: category.to_string(),
            option: option.to_string(),
        })?;

    if state.is_option_selected(category, option) {
        if let Some(picks) = state.selections.get_mut(category) {
            picks.retain(|o| o != option);
        }
        debug!("{}: deselected option {option} in {category}", config.id);
        return Ok(Toggle::Deselected);
    }

    let selected = state.selected_ids();
    if let Some(missing) = option_def
        .requires
        .iter()
        .find(|req| !selected.contains(req.as_str()))
    {
        return Err(EngineError::RequirementNotMet {
            option: option.to_string(),
            missing: missing.clone(),
        });
    }

    let quota = available_quota(config, state, category);
    if state.selection_count(category) as u32 >= quota {
        return Err(EngineError::QuotaExhausted {
            category: category.to_string(),
            quota,
        });
    }

    state
        .selections
        .entry(category.to_string())
        .or_default()
        .push(option.to_string());
    debug!("{}: selected option {option} in {category}", config.id);
    Ok(Toggle::Selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CategoryDef, GroupConfig, NodeDef, OptionDef, SharedBonusDef};
    use crate::ledger::SigilKind;
    use std::collections::BTreeMap;

    fn option(id: &str) -> OptionDef {
        OptionDef {
            id: id.into(),
            name: id.into(),
            requires: vec![],
        }
    }

    /// Two categories, one granting node with benefits, one shared-bonus
    /// node shared between both categories at capacity 1.
    fn shared_group() -> GroupConfig {
        GroupConfig {
            id: "shared".into(),
            name: "Shared".into(),
            special_sigil: SigilKind::Purth,
            nodes: vec![
                NodeDef {
                    id: "grant_a".into(),
                    name: "Grant A".into(),
                    prereqs: vec![],
                    cost_kind: SigilKind::Purth,
                    cost: 1,
                    benefits: BTreeMap::from([("cat_a".to_string(), 1)]),
                },
                NodeDef {
                    id: "shared_node".into(),
                    name: "Shared".into(),
                    prereqs: vec![],
                    cost_kind: SigilKind::Purth,
                    cost: 1,
                    benefits: BTreeMap::new(),
                },
            ],
            categories: vec![
                CategoryDef {
                    id: "cat_a".into(),
                    name: "A".into(),
                    base_quota: 0,
                    options: vec![option("a1"), option("a2"), option("a3")],
                },
                CategoryDef {
                    id: "cat_b".into(),
                    name: "B".into(),
                    base_quota: 0,
                    options: vec![option("b1"), option("b2")],
                },
            ],
            boosts: vec![],
            shared_bonus: Some(SharedBonusDef {
                node: "shared_node".into(),
                categories: vec!["cat_a".into(), "cat_b".into()],
                bonus: 1,
                capacity: 1,
            }),
            slots: vec![],
        }
    }

    #[test]
    fn quota_is_zero_before_any_node() {
        let config = shared_group();
        let state = GroupState::new();
        assert_eq!(available_quota(&config, &state, "cat_a"), 0);
        assert_eq!(available_quota(&config, &state, "cat_b"), 0);
    }

    #[test]
    fn node_benefit_raises_quota() {
        let config = shared_group();
        let mut state = GroupState::new();
        state.selected_nodes.push("grant_a".into());
        assert_eq!(available_quota(&config, &state, "cat_a"), 1);
        assert_eq!(available_quota(&config, &state, "cat_b"), 0);
    }

    #[test]
    fn shared_bonus_offered_to_all_until_consumed() {
        let config = shared_group();
        let mut state = GroupState::new();
        state.selected_nodes.push("shared_node".into());
        // Nobody is using it yet: both categories see it.
        assert_eq!(available_quota(&config, &state, "cat_a"), 1);
        assert_eq!(available_quota(&config, &state, "cat_b"), 1);

        // cat_a takes a pick beyond its base-only quota of 0: it becomes
        // the consumer and cat_b's offer disappears.
        toggle_option(&config, &mut state, "cat_a", "a1").unwrap();
        assert_eq!(shared_bonus_consumers(&config, &state), vec!["cat_a"]);
        assert_eq!(available_quota(&config, &state, "cat_a"), 1);
        assert_eq!(available_quota(&config, &state, "cat_b"), 0);
    }

    #[test]
    fn shared_bonus_frees_up_when_consumer_releases() {
        let config = shared_group();
        let mut state = GroupState::new();
        state.selected_nodes.push("shared_node".into());
        toggle_option(&config, &mut state, "cat_a", "a1").unwrap();
        assert_eq!(available_quota(&config, &state, "cat_b"), 0);

        toggle_option(&config, &mut state, "cat_a", "a1").unwrap(); // deselect
        assert_eq!(available_quota(&config, &state, "cat_b"), 1);
    }

    #[test]
    fn consumer_keeps_bonus_even_at_capacity() {
        let config = shared_group();
        let mut state = GroupState::new();
        state.selected_nodes.push("shared_node".into());
        state.selected_nodes.push("grant_a".into());
        // cat_a fills base-only quota (1 from grant_a) plus the shared
        // bonus; it stays a consumer and keeps quota 2.
        toggle_option(&config, &mut state, "cat_a", "a1").unwrap();
        toggle_option(&config, &mut state, "cat_a", "a2").unwrap();
        assert_eq!(available_quota(&config, &state, "cat_a"), 2);
        assert_eq!(available_quota(&config, &state, "cat_b"), 0);
    }

    #[test]
    fn consumer_list_is_capped_at_capacity() {
        let config = shared_group();
        let mut state = GroupState::new();
        state.selected_nodes.push("shared_node".into());
        // Both categories hold a pick over their base-only quota of 0 —
        // a state only reachable mid-trial, never through the gates.
        state.selections.insert("cat_a".into(), vec!["a1".into()]);
        state.selections.insert("cat_b".into(), vec!["b1".into()]);

        // Capacity 1: only the first category in config order keeps the
        // bonus; the other is left over quota.
        assert_eq!(shared_bonus_consumers(&config, &state), vec!["cat_a"]);
        assert_eq!(available_quota(&config, &state, "cat_a"), 1);
        assert_eq!(available_quota(&config, &state, "cat_b"), 0);
    }

    #[test]
    fn deselect_cannot_double_claim_the_shared_bonus() {
        use crate::graph::{deselect_node, select_node};
        use crate::ledger::{Currency, Ledger};

        let config = shared_group();
        let mut state = GroupState::new();
        let mut ledger = Ledger::new();
        ledger.credit(Currency::Sigil(SigilKind::Purth), 2);

        select_node(&config, &mut state, &mut ledger, "grant_a").unwrap();
        select_node(&config, &mut state, &mut ledger, "shared_node").unwrap();

        // cat_b claims the shared bonus; cat_a fills its base-only quota
        // of 1 from grant_a. One consumer, everything justified.
        toggle_option(&config, &mut state, "cat_b", "b1").unwrap();
        toggle_option(&config, &mut state, "cat_a", "a1").unwrap();
        assert_eq!(shared_bonus_consumers(&config, &state), vec!["cat_b"]);

        // Dropping grant_a would make cat_a a second claimant of the
        // capacity-1 bonus, so the deselect must be refused outright.
        let err = deselect_node(&config, &mut state, &mut ledger, "grant_a").unwrap_err();
        assert!(matches!(err, EngineError::QuotaWouldBeExceeded { .. }));
        assert!(state.is_node_selected("grant_a"));
        assert_eq!(ledger.get(Currency::Sigil(SigilKind::Purth)), 0);
        assert_eq!(shared_bonus_consumers(&config, &state), vec!["cat_b"]);

        // Releasing cat_a's pick clears the way.
        toggle_option(&config, &mut state, "cat_a", "a1").unwrap();
        deselect_node(&config, &mut state, &mut ledger, "grant_a").unwrap();
    }

    #[test]
    fn pick_over_quota_rejected() {
        let config = shared_group();
        let mut state = GroupState::new();
        let err = toggle_option(&config, &mut state, "cat_a", "a1").unwrap_err();
        assert_eq!(
            err,
            EngineError::QuotaExhausted {
                category: "cat_a".into(),
                quota: 0,
            }
        );
        assert_eq!(state.selection_count("cat_a"), 0);
    }

    #[test]
    fn cross_category_requirement_enforced() {
        let mut config = shared_group();
        config.categories[1].options[0].requires = vec!["a1".into()];
        let mut state = GroupState::new();
        state.selected_nodes.push("grant_a".into());
        state.selected_nodes.push("shared_node".into());

        // b1 requires a1, which is not yet picked.
        assert!(!can_select_option(&config, &state, "cat_b", "b1"));
        let err = toggle_option(&config, &mut state, "cat_b", "b1").unwrap_err();
        assert_eq!(
            err,
            EngineError::RequirementNotMet {
                option: "b1".into(),
                missing: "a1".into(),
            }
        );

        toggle_option(&config, &mut state, "cat_a", "a1").unwrap();
        assert_eq!(
            toggle_option(&config, &mut state, "cat_b", "b1").unwrap(),
            Toggle::Selected
        );
    }

    #[test]
    fn requirement_may_name_a_tree_node() {
        let mut config = shared_group();
        config.categories[0].options[0].requires = vec!["grant_a".into()];
        let mut state = GroupState::new();
        state.selected_nodes.push("shared_node".into());
        assert!(!can_select_option(&config, &state, "cat_a", "a1"));

        state.selected_nodes.push("grant_a".into());
        assert!(can_select_option(&config, &state, "cat_a", "a1"));
    }

    #[test]
    fn unknown_ids_rejected() {
        let config = shared_group();
        let mut state = GroupState::new();
        assert!(matches!(
            toggle_option(&config, &mut state, "nope", "a1"),
            Err(EngineError::UnknownCategory(_))
        ));
        assert!(matches!(
            toggle_option(&config, &mut state, "cat_a", "nope"),
            Err(EngineError::UnknownOption { .. })
        ));
    }
}
