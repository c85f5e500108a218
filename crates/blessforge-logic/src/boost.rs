//! Boosts, the KP override, and the feature-wide cost multiplier.
//!
//! A boost is a toggle that pays one sigil for a standing quota bonus.
//! Boosts with several payment variants (pay with kind A *or* kind B) keep
//! at most one variant active; switching variants is atomic — the new kind
//! is debited before the old unit is released, so an unaffordable switch
//! rejects cleanly with the old boost untouched.
//!
//! The KP override waives a node's sigil gate in exchange for a payment
//! tracked outside the engine. Toggling it never moves sigils: a node paid
//! before the override went on is not refunded, and a node selected under
//! the override is not charged when it goes off. Deselection settles up
//! according to how the node was originally acquired.

use log::debug;

use crate::content::GroupConfig;
use crate::error::EngineError;
use crate::graph::{special_sigil_count, total_sigil_tree_cost};
use crate::ledger::{Currency, Ledger, MetaKind, SigilKind};
use crate::quota::available_quota;
use crate::state::{GroupState, MagicianCharge};

/// Set a boost's active variant: `Some(kind)` enables (or switches to)
/// payment in `kind`, `None` disables. Re-applying the current state is an
/// accepted no-op.
pub fn set_boost(
    config: &GroupConfig,
    state: &mut GroupState,
    ledger: &mut Ledger,
    key: &str,
    variant: Option<SigilKind>,
) -> Result<(), EngineError> {
    let boost_def = config
        .boost(key)
        .ok_or_else(|| EngineError::UnknownBoost(key.to_string()))?;
    if let Some(kind) = variant {
        if !boost_def.variants.contains(&kind) {
            return Err(EngineError::UnknownBoostVariant {
                key: key.to_string(),
                kind,
            });
        }
    }

    let current = state.active_boost(key);
    if current == variant {
        return Ok(());
    }

    match (current, variant) {
        (None, Some(kind)) => {
            ledger.debit(Currency::Sigil(kind), 1)?;
            state.boosts.insert(key.to_string(), kind);
            debug!("{}: boost {key} on ({})", config.id, kind.name());
        }
        (Some(old), None) => {
            // Losing the bonus must not strand existing picks over quota.
            let mut trial = state.clone();
            trial.boosts.remove(key);
            for category in &boost_def.categories {
                let selected = trial.selection_count(category);
                let reduced = available_quota(config, &trial, category);
                if selected as u32 > reduced {
                    return Err(EngineError::QuotaWouldBeExceeded {
                        category: category.clone(),
                        selected,
                        quota: reduced,
                    });
                }
            }
            state.boosts.remove(key);
            ledger.credit(Currency::Sigil(old), 1);
            debug!("{}: boost {key} off", config.id);
        }
        (Some(old), Some(new)) => {
            // Debit first so an unaffordable switch changes nothing.
            ledger.debit(Currency::Sigil(new), 1)?;
            ledger.credit(Currency::Sigil(old), 1);
            state.boosts.insert(key.to_string(), new);
            debug!(
                "{}: boost {key} switched {} -> {}",
                config.id,
                old.name(),
                new.name()
            );
        }
        (None, None) => unreachable!("handled by the idempotence check"),
    }
    Ok(())
}

/// Toggle the KP override on a node. No ledger effect in either direction.
pub fn set_override(
    config: &GroupConfig,
    state: &mut GroupState,
    node: &str,
    on: bool,
) -> Result<(), EngineError> {
    if config.node(node).is_none() {
        return Err(EngineError::UnknownNode(node.to_string()));
    }
    if on {
        state.overrides.insert(node.to_string());
    } else {
        state.overrides.remove(node);
    }
    debug!("{}: override on {node} set to {on}", config.id);
    Ok(())
}

/// Blessing Point charge for enabling the magician multiplier right now.
pub fn magician_blessing_charge(config: &GroupConfig, state: &GroupState) -> u32 {
    total_sigil_tree_cost(config, state) / 4
}

/// Fortune Point charge for enabling the magician multiplier right now.
pub fn magician_fortune_charge(config: &GroupConfig, state: &GroupState) -> u32 {
    6 * special_sigil_count(config, state) / 4
}

/// Enable or disable the feature-wide cost multiplier.
///
/// Enabling charges a quarter of the tree's current nominal sigil cost in
/// Blessing Points and six quarter-points per special-sigil node in
/// Fortune Points (both floored). Both pools are checked before either is
/// debited. The charged amounts are recorded on the state; disabling
/// credits exactly those amounts back regardless of how the tree changed
/// in between.
///
/// The external precondition for enabling (spec'd outside the engine) is
/// the caller's responsibility to check before invoking this.
pub fn set_magician(
    config: &GroupConfig,
    state: &mut GroupState,
    ledger: &mut Ledger,
    on: bool,
) -> Result<(), EngineError> {
    match (state.magician, on) {
        (None, true) => {
            let blessing = magician_blessing_charge(config, state);
            let fortune = magician_fortune_charge(config, state);
            for (kind, amount) in [
                (MetaKind::BlessingPoints, blessing),
                (MetaKind::FortunePoints, fortune),
            ] {
                let currency = Currency::Meta(kind);
                if !ledger.can_afford(currency, amount) {
                    return Err(EngineError::InsufficientBalance {
                        currency,
                        required: amount,
                        available: ledger.get(currency),
                    });
                }
            }
            ledger.debit(Currency::Meta(MetaKind::BlessingPoints), blessing)?;
            ledger.debit(Currency::Meta(MetaKind::FortunePoints), fortune)?;
            state.magician = Some(MagicianCharge {
                blessing_points: blessing,
                fortune_points: fortune,
            });
            debug!("{}: magician on ({blessing} BP, {fortune} FP)", config.id);
        }
        (Some(charge), false) => {
            ledger.credit(Currency::Meta(MetaKind::BlessingPoints), charge.blessing_points);
            ledger.credit(Currency::Meta(MetaKind::FortunePoints), charge.fortune_points);
            state.magician = None;
            debug!("{}: magician off", config.id);
        }
        _ => {} // already in the requested state
    }
    Ok(())
}
