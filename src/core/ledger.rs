//! Index share bookkeeping.
//!
//! Issuance is caller-driven: amounts are taken as given and are not priced
//! against the index value.

use super::asset::Holder;
use super::error::{IndexError, Result};
use super::fixed;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLedger {
    balances: BTreeMap<Holder, U256>,
    total_supply: U256,
}

impl ShareLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, holder: &Holder) -> U256 {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Holders with a non-zero balance, in identity order.
    pub fn holders(&self) -> impl Iterator<Item = (&Holder, &U256)> {
        self.balances.iter()
    }

    pub fn mint(&mut self, amount: U256, to: &Holder) -> Result<()> {
        let supply = fixed::checked_add(self.total_supply, amount, "mint")?;
        let balance = fixed::checked_add(self.balance_of(to), amount, "mint")?;
        if !balance.is_zero() {
            self.balances.insert(to.clone(), balance);
        }
        self.total_supply = supply;
        Ok(())
    }

    pub fn burn(&mut self, amount: U256, from: &Holder) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(IndexError::InsufficientBalance {
                holder: from.clone(),
                requested: amount,
                available,
            });
        }
        let supply = self.total_supply.checked_sub(amount).ok_or_else(|| {
            IndexError::Storage(format!(
                "total supply {} is below the balance of {from}",
                self.total_supply
            ))
        })?;
        let remaining = available - amount;
        if remaining.is_zero() {
            self.balances.remove(from);
        } else {
            self.balances.insert(from.clone(), remaining);
        }
        self.total_supply = supply;
        Ok(())
    }
}
