//! Delegation links: which account receives each holder's voting power.
//!
//! Delegation is token-weighted and single-hop: a holder's available balance
//! counts toward exactly one delegate. Delegating to yourself is how a holder
//! activates their own votes; a holder who never delegates contributes no
//! voting power to anyone.

use covenant_types::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Forward and reverse delegation index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "DelegationSnapshot", into = "DelegationSnapshot")]
pub struct DelegationRegistry {
    /// Delegator → delegate.
    delegations: HashMap<AccountId, AccountId>,
    /// Reverse index: delegate → set of direct delegators.
    reverse_delegations: HashMap<AccountId, HashSet<AccountId>>,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or update a delegation. Returns the previous delegate, if any.
    pub fn delegate(&mut self, from: &AccountId, to: &AccountId) -> Option<AccountId> {
        let previous = self.delegations.insert(from.clone(), to.clone());
        if let Some(old_to) = &previous {
            self.unindex(from, old_to);
        }
        self.reverse_delegations
            .entry(to.clone())
            .or_default()
            .insert(from.clone());
        previous
    }

    /// Remove a delegation. Returns the delegate it pointed to, if any.
    pub fn undelegate(&mut self, from: &AccountId) -> Option<AccountId> {
        let previous = self.delegations.remove(from);
        if let Some(old_to) = &previous {
            self.unindex(from, old_to);
        }
        previous
    }

    /// The delegate of `delegator` (None if not delegated).
    pub fn delegate_of(&self, delegator: &AccountId) -> Option<&AccountId> {
        self.delegations.get(delegator)
    }

    /// All accounts that delegated to `delegate`, sorted.
    pub fn delegators_of(&self, delegate: &AccountId) -> Vec<AccountId> {
        let mut out: Vec<AccountId> = self
            .reverse_delegations
            .get(delegate)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.delegations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegations.is_empty()
    }

    fn unindex(&mut self, from: &AccountId, old_to: &AccountId) {
        if let Some(set) = self.reverse_delegations.get_mut(old_to) {
            set.remove(from);
            if set.is_empty() {
                self.reverse_delegations.remove(old_to);
            }
        }
    }
}

/// Serializable form of the registry. The reverse index is rebuilt on load.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DelegationSnapshot {
    pub delegations: HashMap<AccountId, AccountId>,
}

impl From<DelegationSnapshot> for DelegationRegistry {
    fn from(snapshot: DelegationSnapshot) -> Self {
        let mut reverse = HashMap::<AccountId, HashSet<AccountId>>::new();
        for (from, to) in &snapshot.delegations {
            reverse.entry(to.clone()).or_default().insert(from.clone());
        }
        Self {
            delegations: snapshot.delegations,
            reverse_delegations: reverse,
        }
    }
}

impl From<DelegationRegistry> for DelegationSnapshot {
    fn from(registry: DelegationRegistry) -> Self {
        Self {
            delegations: registry.delegations,
        }
    }
}
