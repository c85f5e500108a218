//! Pure build-rules engine for Blessforge.
//!
//! This crate contains all character-build logic that is independent of
//! any UI framework or storage backend. Operations take plain data and
//! return named rejection conditions, making them unit-testable and
//! portable across hosts.
//!
//! A build session spends several point currencies across ten "Blessing"
//! feature groups that share one rule shape: a prerequisite-gated sigil
//! tree unlocks pick quotas in option categories, boosts trade a sigil for
//! extra quota, the KP override waives a node's sigil gate, and
//! cross-reference slots point into an externally stored library of
//! budget-constrained sub-builds.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`action`] | Closed action enum and the single dispatcher |
//! | [`boost`] | Quota boosts, KP override, feature-wide cost multiplier |
//! | [`catalog`] | The ten built-in Blessing configurations |
//! | [`content`] | Immutable group configuration and load-time validation |
//! | [`crossref`] | Sub-build library queries and slot assignment gating |
//! | [`error`] | Named, non-fatal rejection conditions |
//! | [`graph`] | Sigil tree evaluation (select/deselect, dependents) |
//! | [`ledger`] | Currency balances with centrally enforced non-negativity |
//! | [`quota`] | Derived pick quotas, shared bonus, option toggles |
//! | [`session`] | Ledger + all group states behind one entry point |
//! | [`snapshot`] | Versioned binary snapshots of session state |
//! | [`state`] | Mutable per-group runtime state |
//!
//! # Invariants
//!
//! - No currency balance ever goes negative; every debit is checked in
//!   [`ledger::Ledger::debit`] and nowhere else.
//! - Quotas and budgets are derived, never stored: every query recomputes
//!   them from current selections, so they cannot drift.
//! - A rejected operation mutates nothing.
//! - Quota-reducing actions (deselecting a granting node, disabling a
//!   boost) are rejected while existing picks depend on them; the engine
//!   never silently drops a selection.

pub mod action;
pub mod boost;
pub mod catalog;
pub mod content;
pub mod crossref;
pub mod error;
pub mod graph;
pub mod ledger;
pub mod quota;
pub mod session;
pub mod snapshot;
pub mod state;

pub use action::Action;
pub use error::EngineError;
pub use ledger::{Currency, Ledger, MetaKind, SigilKind};
pub use session::Session;
