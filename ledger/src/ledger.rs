//! The vote ledger.

use crate::account::AccountBalance;
use crate::checkpoint::Checkpoints;
use crate::delegation::DelegationRegistry;
use crate::error::LedgerError;
use covenant_types::{AccountId, BlockHeight};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Balances, delegation and vote checkpoints.
///
/// Every mutating call takes the height at which it is applied. Heights must
/// not move backwards across writes that touch the same delegate.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VoteLedger {
    accounts: HashMap<AccountId, AccountBalance>,
    delegation: DelegationRegistry,
    checkpoints: HashMap<AccountId, Checkpoints>,
    total_supply: u128,
}

/// Summary statistics for the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub accounts: usize,
    pub delegations: usize,
    pub total_supply: u128,
    pub total_locked: u128,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Reads ──────────────────────────────────────────────────────────────

    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.account(account).balance
    }

    pub fn available_of(&self, account: &AccountId) -> u128 {
        self.account(account).available()
    }

    pub fn locked_of(&self, account: &AccountId) -> u128 {
        self.account(account).locked
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn delegate_of(&self, account: &AccountId) -> Option<&AccountId> {
        self.delegation.delegate_of(account)
    }

    pub fn delegators_of(&self, delegate: &AccountId) -> Vec<AccountId> {
        self.delegation.delegators_of(delegate)
    }

    /// Voting power currently delegated to `account`.
    pub fn current_votes(&self, account: &AccountId) -> u128 {
        self.checkpoints
            .get(account)
            .map(Checkpoints::latest)
            .unwrap_or(0)
    }

    /// Voting power delegated to `account` as of `at_height`.
    ///
    /// Only settled heights can be read: `at_height` must be strictly below
    /// `current_height`, so nothing done in the current block can change the
    /// answer.
    pub fn voting_power_of(
        &self,
        account: &AccountId,
        at_height: BlockHeight,
        current_height: BlockHeight,
    ) -> Result<u128, LedgerError> {
        if at_height >= current_height {
            return Err(LedgerError::NotYetDetermined {
                requested: at_height,
                current: current_height,
            });
        }
        Ok(self
            .checkpoints
            .get(account)
            .map(|cp| cp.at(at_height))
            .unwrap_or(0))
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            accounts: self.accounts.len(),
            delegations: self.delegation.len(),
            total_supply: self.total_supply,
            total_locked: self.accounts.values().map(|a| a.locked).sum(),
        }
    }

    // ── Writes ─────────────────────────────────────────────────────────────

    /// Create `amount` new tokens for `account`.
    pub fn mint(
        &mut self,
        account: &AccountId,
        amount: u128,
        height: BlockHeight,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let mut entry = self.account(account);
        entry.balance = entry.balance.checked_add(amount).ok_or(LedgerError::Overflow)?;

        let delegate = self.delegate_of(account).cloned();
        self.move_votes(None, delegate.as_ref(), amount, height)?;
        self.accounts.insert(account.clone(), entry);
        self.total_supply = supply;
        debug!(%account, amount, "minted");
        Ok(())
    }

    /// Move `amount` of available balance from `from` to `to`.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
        height: BlockHeight,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        let mut src = self.account(from);
        if src.available() < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available: src.available(),
            });
        }
        if from == to {
            return Ok(());
        }
        let mut dst = self.account(to);
        dst.balance = dst.balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        src.balance -= amount;

        let src_delegate = self.delegate_of(from).cloned();
        let dst_delegate = self.delegate_of(to).cloned();
        self.move_votes(src_delegate.as_ref(), dst_delegate.as_ref(), amount, height)?;
        self.accounts.insert(from.clone(), src);
        self.accounts.insert(to.clone(), dst);
        debug!(%from, %to, amount, "transferred");
        Ok(())
    }

    /// Point `from`'s voting power at `to`.
    pub fn delegate(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        height: BlockHeight,
    ) -> Result<(), LedgerError> {
        let weight = self.available_of(from);
        let previous = self.delegate_of(from).cloned();
        if previous.as_ref() == Some(to) {
            return Ok(());
        }
        self.move_votes(previous.as_ref(), Some(to), weight, height)?;
        self.delegation.delegate(from, to);
        debug!(%from, %to, weight, "delegated");
        Ok(())
    }

    /// Lock `amount` of `account`'s available balance. Locked stake carries
    /// no voting power.
    pub fn lock(
        &mut self,
        account: &AccountId,
        amount: u128,
        height: BlockHeight,
    ) -> Result<(), LedgerError> {
        let mut entry = self.account(account);
        if entry.available() < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available: entry.available(),
            });
        }
        entry.locked += amount;

        let delegate = self.delegate_of(account).cloned();
        self.move_votes(delegate.as_ref(), None, amount, height)?;
        self.accounts.insert(account.clone(), entry);
        debug!(%account, amount, "locked");
        Ok(())
    }

    /// Return `amount` of locked stake to `account`'s available balance.
    pub fn unlock(
        &mut self,
        account: &AccountId,
        amount: u128,
        height: BlockHeight,
    ) -> Result<(), LedgerError> {
        self.settle(account, amount, amount, height)
    }

    /// Release `locked_amount` of locked stake and credit `payout` in its place.
    ///
    /// The released stake leaves circulation and the payout enters it, so
    /// total supply moves by `payout - locked_amount`. `unlock` is the special
    /// case where both are equal.
    pub fn settle(
        &mut self,
        account: &AccountId,
        locked_amount: u128,
        payout: u128,
        height: BlockHeight,
    ) -> Result<(), LedgerError> {
        let mut entry = self.account(account);
        if entry.locked < locked_amount {
            return Err(LedgerError::InsufficientLocked {
                needed: locked_amount,
                locked: entry.locked,
            });
        }
        let supply = (self.total_supply - locked_amount)
            .checked_add(payout)
            .ok_or(LedgerError::Overflow)?;
        entry.locked -= locked_amount;
        entry.balance = (entry.balance - locked_amount)
            .checked_add(payout)
            .ok_or(LedgerError::Overflow)?;

        let delegate = self.delegate_of(account).cloned();
        self.move_votes(None, delegate.as_ref(), payout, height)?;
        self.accounts.insert(account.clone(), entry);
        self.total_supply = supply;
        debug!(%account, locked_amount, payout, "settled locked stake");
        Ok(())
    }

    // ── Persistence ────────────────────────────────────────────────────────

    /// Serialize the ledger to bytes.
    pub fn save_state(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Restore a ledger from serialized bytes.
    pub fn load_state(data: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(data).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn account(&self, account: &AccountId) -> AccountBalance {
        self.accounts.get(account).copied().unwrap_or_default()
    }

    /// Shift `amount` of voting power between delegates. Either side may be
    /// absent (minting, burning, or an undelegated holder). All checks run
    /// before any checkpoint is written.
    fn move_votes(
        &mut self,
        src: Option<&AccountId>,
        dst: Option<&AccountId>,
        amount: u128,
        height: BlockHeight,
    ) -> Result<(), LedgerError> {
        if amount == 0 || src == dst {
            return Ok(());
        }
        let src_new = match src {
            Some(s) => Some(
                self.current_votes(s)
                    .checked_sub(amount)
                    .ok_or(LedgerError::Overflow)?,
            ),
            None => None,
        };
        let dst_new = match dst {
            Some(d) => Some(
                self.current_votes(d)
                    .checked_add(amount)
                    .ok_or(LedgerError::Overflow)?,
            ),
            None => None,
        };
        for delegate in [src, dst].into_iter().flatten() {
            if let Some(last) = self.checkpoints.get(delegate).and_then(Checkpoints::last_height) {
                if last > height {
                    return Err(LedgerError::HeightRegression {
                        last,
                        attempted: height,
                    });
                }
            }
        }
        if let (Some(s), Some(votes)) = (src, src_new) {
            self.checkpoints.entry(s.clone()).or_default().write(height, votes)?;
        }
        if let (Some(d), Some(votes)) = (dst, dst_new) {
            self.checkpoints.entry(d.clone()).or_default().write(height, votes)?;
        }
        Ok(())
    }
}
