//! Resource ledger — sigil counters and meta point pools.
//!
//! Every spendable resource in a build session lives here: the six typed
//! sigil counters that gate tree nodes and boosts, and the two meta point
//! pools (Blessing Points, Fortune Points) charged by feature-wide
//! modifiers.
//!
//! All balance mutations in the engine go through [`Ledger::debit`] and
//! [`Ledger::credit`]; `debit` is the single enforcement point for the
//! invariant that no balance ever goes negative. A failed debit leaves the
//! ledger untouched.
//!
//! ```
//! use blessforge_logic::ledger::{Currency, Ledger, SigilKind};
//!
//! let mut ledger = Ledger::new();
//! ledger.credit(Currency::Sigil(SigilKind::Purth), 3);
//! assert!(ledger.can_afford(Currency::Sigil(SigilKind::Purth), 3));
//! assert!(ledger.debit(Currency::Sigil(SigilKind::Purth), 2).is_ok());
//! assert_eq!(ledger.get(Currency::Sigil(SigilKind::Purth)), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The six sigil kinds. Sigils are fungible within a kind and spent 1-for-1
/// (or at a node's declared quantity) on tree nodes and boost activations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SigilKind {
    Purth,
    Solun,
    Verdis,
    Umbra,
    Tessel,
    Kyrrin,
}

impl SigilKind {
    /// All sigil kinds in display order.
    pub const ALL: [SigilKind; 6] = [
        SigilKind::Purth,
        SigilKind::Solun,
        SigilKind::Verdis,
        SigilKind::Umbra,
        SigilKind::Tessel,
        SigilKind::Kyrrin,
    ];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            SigilKind::Purth => "Purth",
            SigilKind::Solun => "Solun",
            SigilKind::Verdis => "Verdis",
            SigilKind::Umbra => "Umbra",
            SigilKind::Tessel => "Tessel",
            SigilKind::Kyrrin => "Kyrrin",
        }
    }
}

/// The two meta point pools charged by feature-wide modifiers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MetaKind {
    BlessingPoints,
    FortunePoints,
}

impl MetaKind {
    pub fn name(self) -> &'static str {
        match self {
            MetaKind::BlessingPoints => "Blessing Points",
            MetaKind::FortunePoints => "Fortune Points",
        }
    }
}

/// A currency identifier: either a sigil kind or a meta point pool.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Currency {
    Sigil(SigilKind),
    Meta(MetaKind),
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Sigil(kind) => write!(f, "{}", kind.name()),
            Currency::Meta(kind) => write!(f, "{}", kind.name()),
        }
    }
}

/// Balances for every currency in a session. Missing entries read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    balances: BTreeMap<Currency, u32>,
}

impl Ledger {
    /// Empty ledger — every balance zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance of a currency.
    pub fn get(&self, currency: Currency) -> u32 {
        self.balances.get(&currency).copied().unwrap_or(0)
    }

    /// Whether `amount` could be debited right now.
    pub fn can_afford(&self, currency: Currency, amount: u32) -> bool {
        self.get(currency) >= amount
    }

    /// Remove `amount` from a balance. Fails with
    /// [`EngineError::InsufficientBalance`] and mutates nothing if the
    /// balance is too low.
    pub fn debit(&mut self, currency: Currency, amount: u32) -> Result<(), EngineError> {
        let available = self.get(currency);
        if amount > available {
            return Err(EngineError::InsufficientBalance {
                currency,
                required: amount,
                available,
            });
        }
        if amount > 0 {
            self.balances.insert(currency, available - amount);
        }
        Ok(())
    }

    /// Add `amount` to a balance.
    pub fn credit(&mut self, currency: Currency, amount: u32) {
        if amount > 0 {
            let balance = self.balances.entry(currency).or_insert(0);
            *balance += amount;
        }
    }

    /// All non-zero balances, for display.
    pub fn balances(&self) -> impl Iterator<Item = (Currency, u32)> + '_ {
        self.balances
            .iter()
            .filter(|(_, &amount)| amount > 0)
            .map(|(&currency, &amount)| (currency, amount))
    }
}
