//! Engine rejection conditions.
//!
//! Every failure is local and recoverable: an operation that returns an
//! error has mutated nothing, and the engine is still in its last valid
//! state. Nothing here is fatal to the process and there is nothing to
//! retry — the same call against the same state fails the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ledger::{Currency, SigilKind};

/// Why a cross-reference assignment was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IneligibleReason {
    /// Resolved cost exceeds the slot's current budget.
    OverBudget { cost: u32, budget: u32 },
    /// None of the entry's tags appear in the slot's include list.
    NotIncluded,
    /// One of the entry's tags appears in the slot's exclude list.
    ExcludedTag(String),
    /// The slot's required tag is missing from the entry.
    MissingRequiredTag(String),
}

/// A rejected engine operation. Construction of these never partially
/// applies the operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineError {
    /// A debit was attempted beyond the available balance.
    InsufficientBalance {
        currency: Currency,
        required: u32,
        available: u32,
    },
    /// A node was selected before one of its prerequisites.
    PrerequisiteNotMet { node: String, missing: String },
    /// A node was deselected while a dependent node remains selected.
    DependencyViolation { node: String, dependent: String },
    /// A quota-reducing action would leave a category over its new maximum.
    QuotaWouldBeExceeded {
        category: String,
        selected: usize,
        quota: u32,
    },
    /// An option pick was attempted with the category's quota already full.
    QuotaExhausted { category: String, quota: u32 },
    /// An option's `requires` list is not satisfied by current selections.
    RequirementNotMet { option: String, missing: String },
    /// A cross-reference assignment failed its budget or tag gate.
    IneligibleAssignment {
        slot: String,
        name: String,
        reason: IneligibleReason,
    },
    /// Identifier not present in the group's node graph.
    UnknownNode(String),
    /// Identifier not present in the group's categories.
    UnknownCategory(String),
    /// Option identifier not present in the named category.
    UnknownOption { category: String, option: String },
    /// Boost key not defined for the group.
    UnknownBoost(String),
    /// Sigil kind is not one of the boost's declared variants.
    UnknownBoostVariant { key: String, kind: SigilKind },
    /// Slot identifier not defined for the group.
    UnknownSlot(String),
    /// Feature group identifier not present in the session.
    UnknownGroup(String),
    /// No library entry under (category, name).
    UnknownEntry { category: String, name: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InsufficientBalance {
                currency,
                required,
                available,
            } => write!(
                f,
                "insufficient {currency}: need {required}, have {available}"
            ),
            EngineError::PrerequisiteNotMet { node, missing } => {
                write!(f, "node '{node}' requires '{missing}' to be selected first")
            }
            EngineError::DependencyViolation { node, dependent } => {
                write!(f, "cannot deselect '{node}': '{dependent}' depends on it")
            }
            EngineError::QuotaWouldBeExceeded {
                category,
                selected,
                quota,
            } => write!(
                f,
                "category '{category}' holds {selected} selections but quota would drop to {quota}"
            ),
            EngineError::QuotaExhausted { category, quota } => {
                write!(f, "category '{category}' is at its quota of {quota}")
            }
            EngineError::RequirementNotMet { option, missing } => {
                write!(f, "option '{option}' requires '{missing}'")
            }
            EngineError::IneligibleAssignment { slot, name, reason } => {
                write!(f, "'{name}' is ineligible for slot '{slot}': ")?;
                match reason {
                    IneligibleReason::OverBudget { cost, budget } => {
                        write!(f, "cost {cost} exceeds budget {budget}")
                    }
                    IneligibleReason::NotIncluded => write!(f, "no tag in the include list"),
                    IneligibleReason::ExcludedTag(tag) => write!(f, "tag '{tag}' is excluded"),
                    IneligibleReason::MissingRequiredTag(tag) => {
                        write!(f, "missing required tag '{tag}'")
                    }
                }
            }
            EngineError::UnknownNode(id) => write!(f, "unknown node '{id}'"),
            EngineError::UnknownCategory(id) => write!(f, "unknown category '{id}'"),
            EngineError::UnknownOption { category, option } => {
                write!(f, "unknown option '{option}' in category '{category}'")
            }
            EngineError::UnknownBoost(key) => write!(f, "unknown boost '{key}'"),
            EngineError::UnknownBoostVariant { key, kind } => {
                write!(f, "boost '{key}' has no {} variant", kind.name())
            }
            EngineError::UnknownSlot(id) => write!(f, "unknown slot '{id}'"),
            EngineError::UnknownGroup(id) => write!(f, "unknown feature group '{id}'"),
            EngineError::UnknownEntry { category, name } => {
                write!(f, "no library entry '{name}' in category '{category}'")
            }
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SigilKind;

    #[test]
    fn display_is_readable() {
        let err = EngineError::InsufficientBalance {
            currency: Currency::Sigil(SigilKind::Purth),
            required: 2,
            available: 1,
        };
        assert_eq!(err.to_string(), "insufficient Purth: need 2, have 1");

        let err = EngineError::IneligibleAssignment {
            slot: "mount".into(),
            name: "Ashmane".into(),
            reason: IneligibleReason::OverBudget {
                cost: 55,
                budget: 40,
            },
        };
        assert_eq!(
            err.to_string(),
            "'Ashmane' is ineligible for slot 'mount': cost 55 exceeds budget 40"
        );
    }
}
