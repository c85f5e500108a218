//! Group configuration — the immutable content a Blessing is built from.
//!
//! Configuration is loaded once (from the built-in [`crate::catalog`] or
//! from JSON) and never mutated by the engine. Everything the rules engine
//! derives — quotas, tree costs, boost bonuses — is recomputed from these
//! definitions plus the current [`crate::state::GroupState`].
//!
//! [`validate_group`] checks a configuration up front and returns every
//! problem found, so malformed content fails at load time rather than
//! mid-session.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ledger::SigilKind;

fn default_cost() -> u32 {
    1
}

fn default_capacity() -> u32 {
    1
}

/// One node of a group's sigil tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDef {
    /// Stable identifier, unique within the group.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Node ids that must all be selected before this one.
    #[serde(default)]
    pub prereqs: Vec<String>,
    /// Sigil kind consumed on selection.
    pub cost_kind: SigilKind,
    /// Sigils consumed on selection (almost always 1).
    #[serde(default = "default_cost")]
    pub cost: u32,
    /// Quota increments granted per category while this node is selected.
    #[serde(default)]
    pub benefits: BTreeMap<String, u32>,
}

/// One pickable option inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDef {
    pub id: String,
    pub name: String,
    /// Option or node ids that must be selected anywhere in the group
    /// before this option can be picked. Cross-category references are
    /// allowed.
    #[serde(default)]
    pub requires: Vec<String>,
}

/// A pick-pool: a named selection set bounded by a derived quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub id: String,
    pub name: String,
    /// Quota before any node benefits or boosts (usually 0).
    #[serde(default)]
    pub base_quota: u32,
    pub options: Vec<OptionDef>,
}

/// A toggleable quota boost paid for with one sigil.
///
/// `variants` lists the sigil kinds that can pay for the boost; they are
/// mutually exclusive, with at most one active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostDef {
    pub key: String,
    /// Categories whose quota rises by `bonus` while the boost is active.
    pub categories: Vec<String>,
    pub bonus: u32,
    pub variants: Vec<SigilKind>,
}

/// A bonus granted by one node but shared between several categories:
/// only `capacity` of them may use it at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedBonusDef {
    /// Node whose selection activates the bonus.
    pub node: String,
    /// Categories the bonus can apply to.
    pub categories: Vec<String>,
    pub bonus: u32,
    /// How many categories may consume the bonus simultaneously.
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

/// A cross-reference slot pointing into the external sub-build library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDef {
    pub id: String,
    /// Library category this slot draws from ("companion", "beast", ...).
    pub category: String,
    pub base_budget: u32,
    /// Extra budget while the named boost is active.
    #[serde(default)]
    pub boost_budget: Option<(String, u32)>,
    /// Entry must carry at least one of these tags (empty = no constraint).
    #[serde(default)]
    pub include_tags: Vec<String>,
    /// Entry must carry none of these tags.
    #[serde(default)]
    pub exclude_tags: Vec<String>,
    /// Entry must carry exactly this tag.
    #[serde(default)]
    pub required_tag: Option<String>,
}

/// Complete immutable configuration of one Blessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub id: String,
    pub name: String,
    /// The sigil kind whose node count feeds the magician Fortune Point
    /// charge.
    pub special_sigil: SigilKind,
    pub nodes: Vec<NodeDef>,
    pub categories: Vec<CategoryDef>,
    #[serde(default)]
    pub boosts: Vec<BoostDef>,
    #[serde(default)]
    pub shared_bonus: Option<SharedBonusDef>,
    #[serde(default)]
    pub slots: Vec<SlotDef>,
}

impl GroupConfig {
    pub fn node(&self, id: &str) -> Option<&NodeDef> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn boost(&self, key: &str) -> Option<&BoostDef> {
        self.boosts.iter().find(|b| b.key == key)
    }

    pub fn slot(&self, id: &str) -> Option<&SlotDef> {
        self.slots.iter().find(|s| s.id == id)
    }
}

/// A content problem found by [`validate_group`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    DuplicateNode(String),
    DuplicateCategory(String),
    DuplicateOption(String),
    DuplicateBoost(String),
    DuplicateSlot(String),
    /// Node lists a prerequisite that does not exist.
    DanglingPrereq { node: String, prereq: String },
    /// Node grants a benefit to a category that does not exist.
    DanglingBenefit { node: String, category: String },
    /// Boost names a category that does not exist.
    DanglingBoostCategory { boost: String, category: String },
    /// Shared bonus references a missing node or category.
    DanglingSharedBonus(String),
    /// Slot's boost_budget names a boost that does not exist.
    DanglingSlotBoost { slot: String, boost: String },
    /// Option requires an id that is neither an option nor a node.
    DanglingRequirement { option: String, missing: String },
    /// The prerequisite graph contains a cycle through this node.
    PrereqCycle(String),
    /// Node cost of zero would make debit/credit symmetry vacuous.
    ZeroNodeCost(String),
    /// Boost with no payment variants can never be activated.
    EmptyBoostVariants(String),
    /// Shared bonus with zero capacity or zero bonus is dead content.
    DegenerateSharedBonus(String),
}

/// Validate one group configuration, returning all problems found.
pub fn validate_group(config: &GroupConfig) -> Vec<ContentError> {
    let mut errors = Vec::new();

    let mut node_ids = BTreeSet::new();
    for node in &config.nodes {
        if !node_ids.insert(node.id.as_str()) {
            errors.push(ContentError::DuplicateNode(node.id.clone()));
        }
        if node.cost == 0 {
            errors.push(ContentError::ZeroNodeCost(node.id.clone()));
        }
    }

    let mut category_ids = BTreeSet::new();
    let mut option_ids = BTreeSet::new();
    for category in &config.categories {
        if !category_ids.insert(category.id.as_str()) {
            errors.push(ContentError::DuplicateCategory(category.id.clone()));
        }
        for option in &category.options {
            if !option_ids.insert(option.id.as_str()) {
                errors.push(ContentError::DuplicateOption(option.id.clone()));
            }
        }
    }

    for category in &config.categories {
        for option in &category.options {
            for req in &option.requires {
                if !option_ids.contains(req.as_str()) && !node_ids.contains(req.as_str()) {
                    errors.push(ContentError::DanglingRequirement {
                        option: option.id.clone(),
                        missing: req.clone(),
                    });
                }
            }
        }
    }

    for node in &config.nodes {
        for prereq in &node.prereqs {
            if !node_ids.contains(prereq.as_str()) {
                errors.push(ContentError::DanglingPrereq {
                    node: node.id.clone(),
                    prereq: prereq.clone(),
                });
            }
        }
        for category in node.benefits.keys() {
            if !category_ids.contains(category.as_str()) {
                errors.push(ContentError::DanglingBenefit {
                    node: node.id.clone(),
                    category: category.clone(),
                });
            }
        }
    }

    let mut boost_keys = BTreeSet::new();
    for boost in &config.boosts {
        if !boost_keys.insert(boost.key.as_str()) {
            errors.push(ContentError::DuplicateBoost(boost.key.clone()));
        }
        if boost.variants.is_empty() {
            errors.push(ContentError::EmptyBoostVariants(boost.key.clone()));
        }
        for category in &boost.categories {
            if !category_ids.contains(category.as_str()) {
                errors.push(ContentError::DanglingBoostCategory {
                    boost: boost.key.clone(),
                    category: category.clone(),
                });
            }
        }
    }

    if let Some(shared) = &config.shared_bonus {
        if !node_ids.contains(shared.node.as_str()) {
            errors.push(ContentError::DanglingSharedBonus(shared.node.clone()));
        }
        for category in &shared.categories {
            if !category_ids.contains(category.as_str()) {
                errors.push(ContentError::DanglingSharedBonus(category.clone()));
            }
        }
        if shared.capacity == 0 || shared.bonus == 0 {
            errors.push(ContentError::DegenerateSharedBonus(shared.node.clone()));
        }
    }

    let mut slot_ids = BTreeSet::new();
    for slot in &config.slots {
        if !slot_ids.insert(slot.id.as_str()) {
            errors.push(ContentError::DuplicateSlot(slot.id.clone()));
        }
        if let Some((boost, _)) = &slot.boost_budget {
            if !boost_keys.contains(boost.as_str()) {
                errors.push(ContentError::DanglingSlotBoost {
                    slot: slot.id.clone(),
                    boost: boost.clone(),
                });
            }
        }
    }

    errors.extend(find_cycles(config));
    errors
}

/// Depth-first cycle detection over the prerequisite graph.
fn find_cycles(config: &GroupConfig) -> Vec<ContentError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(
        config: &GroupConfig,
        id: &str,
        marks: &mut BTreeMap<String, Mark>,
        errors: &mut Vec<ContentError>,
    ) {
        match marks.get(id).copied().unwrap_or(Mark::Unvisited) {
            Mark::Done => return,
            Mark::InProgress => {
                errors.push(ContentError::PrereqCycle(id.to_string()));
                return;
            }
            Mark::Unvisited => {}
        }
        marks.insert(id.to_string(), Mark::InProgress);
        if let Some(node) = config.node(id) {
            for prereq in &node.prereqs {
                visit(config, prereq, marks, errors);
            }
        }
        marks.insert(id.to_string(), Mark::Done);
    }

    let mut marks = BTreeMap::new();
    let mut errors = Vec::new();
    for node in &config.nodes {
        visit(config, &node.id, &mut marks, &mut errors);
    }
    errors
}
