//! Uniform action dispatch.
//!
//! Every user-driven mutation is one of a small closed set of actions,
//! dispatched through [`apply`]. Hosts that record or replay user input
//! (the actions serialize as tagged JSON) get the same gate checks as
//! direct calls into the per-module operations — `apply` is a router, not
//! a second rule set.

use serde::{Deserialize, Serialize};

use crate::boost::{set_boost, set_magician, set_override};
use crate::content::GroupConfig;
use crate::crossref::{assign_slot, clear_slot, SubBuildLibrary};
use crate::error::EngineError;
use crate::graph::{deselect_node, select_node};
use crate::ledger::{Ledger, SigilKind};
use crate::quota::toggle_option;
use crate::state::GroupState;

/// One user-driven mutation against a feature group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    SelectNode { node: String },
    DeselectNode { node: String },
    ToggleOption { category: String, option: String },
    SetBoost { key: String, variant: Option<SigilKind> },
    SetOverride { node: String, on: bool },
    SetMagician { on: bool },
    AssignSlot { slot: String, name: String },
    ClearSlot { slot: String },
}

/// Route an action to its operation. Either the whole action applies or
/// nothing does.
pub fn apply(
    config: &GroupConfig,
    state: &mut GroupState,
    ledger: &mut Ledger,
    library: &SubBuildLibrary,
    action: &Action,
) -> Result<(), EngineError> {
    match action {
        Action::SelectNode { node } => select_node(config, state, ledger, node),
        Action::DeselectNode { node } => deselect_node(config, state, ledger, node),
        Action::ToggleOption { category, option } => {
            toggle_option(config, state, category, option).map(|_| ())
        }
        Action::SetBoost { key, variant } => set_boost(config, state, ledger, key, *variant),
        Action::SetOverride { node, on } => set_override(config, state, node, *on),
        Action::SetMagician { on } => set_magician(config, state, ledger, *on),
        Action::AssignSlot { slot, name } => assign_slot(config, state, library, slot, name),
        Action::ClearSlot { slot } => clear_slot(config, state, slot),
    }
}
