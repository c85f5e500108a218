//! A whole build session: one ledger, one state per feature group.
//!
//! [`Session`] is the object a host owns and drives. It routes
//! [`Action`]s to the right group and exposes the common queries without
//! the caller juggling config/state/ledger triples. Everything is
//! synchronous; any query issued after a mutation sees that mutation.

use std::collections::BTreeMap;

use crate::action::{apply, Action};
use crate::catalog;
use crate::content::GroupConfig;
use crate::crossref::SubBuildLibrary;
use crate::error::EngineError;
use crate::graph;
use crate::ledger::Ledger;
use crate::quota;
use crate::state::GroupState;

/// One single-actor build session.
#[derive(Debug, Clone)]
pub struct Session {
    configs: BTreeMap<String, GroupConfig>,
    pub ledger: Ledger,
    pub groups: BTreeMap<String, GroupState>,
}

impl Session {
    /// Session over an arbitrary set of group configurations, all states
    /// empty.
    pub fn new(configs: Vec<GroupConfig>) -> Self {
        let groups = configs
            .iter()
            .map(|c| (c.id.clone(), GroupState::new()))
            .collect();
        let configs = configs.into_iter().map(|c| (c.id.clone(), c)).collect();
        Self {
            configs,
            ledger: Ledger::new(),
            groups,
        }
    }

    /// Session over the built-in ten-Blessing catalog.
    pub fn standard() -> Self {
        Self::new(catalog::blessings())
    }

    pub fn config(&self, group: &str) -> Option<&GroupConfig> {
        self.configs.get(group)
    }

    pub fn state(&self, group: &str) -> Option<&GroupState> {
        self.groups.get(group)
    }

    /// Route one action to a group. Rejections leave the session exactly
    /// as it was.
    pub fn apply(
        &mut self,
        library: &SubBuildLibrary,
        group: &str,
        action: &Action,
    ) -> Result<(), EngineError> {
        let config = self
            .configs
            .get(group)
            .ok_or_else(|| EngineError::UnknownGroup(group.to_string()))?;
        let state = self
            .groups
            .get_mut(group)
            .ok_or_else(|| EngineError::UnknownGroup(group.to_string()))?;
        apply(config, state, &mut self.ledger, library, action)
    }

    /// See [`graph::is_selectable`]. False for unknown identifiers.
    pub fn is_selectable(&self, group: &str, node: &str) -> bool {
        match (self.configs.get(group), self.groups.get(group)) {
            (Some(config), Some(state)) => {
                graph::is_selectable(config, state, &self.ledger, node)
            }
            _ => false,
        }
    }

    /// See [`quota::available_quota`]. Zero for unknown identifiers.
    pub fn available_quota(&self, group: &str, category: &str) -> u32 {
        match (self.configs.get(group), self.groups.get(group)) {
            (Some(config), Some(state)) => quota::available_quota(config, state, category),
            _ => 0,
        }
    }
}
