//! Accord Incentive - token balances
//!
//! The balance ledger is an external collaborator: the authority layer only
//! ever debits on penalty, credits on reward and reads balances. Anything that
//! implements [`IncentiveLedger`] can be plugged in; [`InMemoryIncentiveLedger`]
//! is the bundled implementation.

#![deny(unsafe_code)]

use accord_types::{MemberId, TokenAmount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

pub trait IncentiveLedger: Send + Sync {
    /// Balance in minimal token units. Unknown accounts hold zero.
    fn balance_of(&self, member: &MemberId) -> TokenAmount;

    /// Remove up to `amount`, clamping at zero.
    fn debit(&mut self, member: &MemberId, amount: TokenAmount) -> Result<Debit, IncentiveError>;

    fn credit(&mut self, member: &MemberId, amount: TokenAmount) -> Result<TokenAmount, IncentiveError>;

    /// Initial issuance to a newly registered member.
    fn mint(&mut self, member: &MemberId, amount: TokenAmount) -> Result<TokenAmount, IncentiveError> {
        self.credit(member, amount)
    }
}

/// Receipt of a clamped debit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debit {
    pub requested: TokenAmount,
    pub applied: TokenAmount,
    /// Part of the request that could not be covered by the balance.
    pub shortfall: TokenAmount,
}

impl Debit {
    pub fn is_partial(&self) -> bool {
        self.shortfall > 0
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InMemoryIncentiveLedger {
    balances: HashMap<MemberId, TokenAmount>,
}

impl InMemoryIncentiveLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }
}

impl IncentiveLedger for InMemoryIncentiveLedger {
    fn balance_of(&self, member: &MemberId) -> TokenAmount {
        self.balances.get(member).copied().unwrap_or(0)
    }

    fn debit(&mut self, member: &MemberId, amount: TokenAmount) -> Result<Debit, IncentiveError> {
        let balance = self.balances.entry(member.clone()).or_insert(0);
        let applied = amount.min(*balance);
        *balance -= applied;

        let receipt = Debit {
            requested: amount,
            applied,
            shortfall: amount - applied,
        };
        if receipt.is_partial() {
            warn!(member = %member, requested = amount, applied, "Debit clamped at zero balance");
        } else {
            debug!(member = %member, amount, "Debit applied");
        }
        Ok(receipt)
    }

    fn credit(&mut self, member: &MemberId, amount: TokenAmount) -> Result<TokenAmount, IncentiveError> {
        let balance = self.balances.entry(member.clone()).or_insert(0);
        let updated = balance.checked_add(amount).ok_or(IncentiveError::Overflow {
            member: member.clone(),
            balance: *balance,
            amount,
        })?;
        *balance = updated;
        debug!(member = %member, amount, balance = updated, "Credit applied");
        Ok(updated)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IncentiveError {
    #[error("credit of {amount} would overflow balance {balance} of {member}")]
    Overflow {
        member: MemberId,
        balance: TokenAmount,
        amount: TokenAmount,
    },

    #[error("incentive ledger unavailable: {0}")]
    Unavailable(String),
}
