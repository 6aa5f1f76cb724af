//! The weighted index: owns portfolio and share state and serializes every
//! transition on it.
//!
//! Mutations (price refresh, rebalance, weight updates, mint, burn) run one
//! at a time behind a writer gate. Each one computes the complete next
//! snapshot without holding the state lock, saves it to the [`StateStore`],
//! and only then swaps it in. Readers copy one snapshot under a read lock, so they never
//! see prices or weights from two different revisions.

use super::asset::{AssetId, Holder, PortfolioState};
use super::balance::BalanceSource;
use super::error::{IndexError, Result};
use super::ledger::ShareLedger;
use super::price::PriceSource;
use super::rebalance::{self, RemainderPolicy};
use super::snapshot::{IndexSnapshot, StateStore};
use super::valuation;
use crate::store::MemoryStore;
use chrono::Utc;
use futures::future::join_all;
use primitive_types::U256;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

/// How weights are set when an index is first created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialWeights {
    /// Basis points per asset, summing to exactly 10000.
    Explicit(Vec<u16>),
    /// Refresh prices and rebalance once during creation.
    Derived,
}

pub struct IndexBuilder {
    prices: Arc<dyn PriceSource>,
    balances: Arc<dyn BalanceSource>,
    store: Arc<dyn StateStore>,
    policy: RemainderPolicy,
}

impl IndexBuilder {
    pub fn store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = store;
        self
    }

    pub fn remainder_policy(mut self, policy: RemainderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Creates a fresh index over `assets` and saves its initial snapshot.
    pub async fn create(
        self,
        assets: Vec<AssetId>,
        initial: InitialWeights,
    ) -> Result<WeightedIndex> {
        let portfolio = match initial {
            InitialWeights::Explicit(weights) => PortfolioState::with_weights(assets, weights)?,
            InitialWeights::Derived => {
                let unweighted = PortfolioState::unweighted(assets)?;
                let priced = unweighted.with_prices(
                    fetch_prices(self.prices.as_ref(), &unweighted).await?,
                    Utc::now(),
                )?;
                let balances = fetch_balances(self.balances.as_ref(), &priced).await?;
                rebalance::rebalanced(&priced, &balances, self.policy)?
            }
        };
        let snapshot = IndexSnapshot {
            portfolio,
            ledger: ShareLedger::new(),
        };
        self.store.save(&snapshot).await?;
        info!(
            assets = snapshot.portfolio.entries().len(),
            weights = ?snapshot.portfolio.weights(),
            "Created index"
        );
        Ok(self.build(snapshot))
    }

    /// Restores the stored index, or creates one if the store is empty.
    ///
    /// A stored index must hold exactly `assets`, in the same order.
    pub async fn open(
        self,
        assets: Vec<AssetId>,
        initial: InitialWeights,
    ) -> Result<WeightedIndex> {
        match self.store.load().await? {
            Some(snapshot) => {
                let stored: Vec<AssetId> = snapshot.portfolio.assets().cloned().collect();
                if stored != assets {
                    return Err(IndexError::InvalidConfiguration(format!(
                        "stored index holds {stored:?} but {assets:?} were requested"
                    )));
                }
                debug!(
                    revision = snapshot.portfolio.revision(),
                    "Restored index from store"
                );
                Ok(self.build(snapshot))
            }
            None => self.create(assets, initial).await,
        }
    }

    fn build(self, snapshot: IndexSnapshot) -> WeightedIndex {
        WeightedIndex {
            state: RwLock::new(snapshot),
            writer: Mutex::new(()),
            prices: self.prices,
            balances: self.balances,
            store: self.store,
            policy: self.policy,
        }
    }
}

pub struct WeightedIndex {
    state: RwLock<IndexSnapshot>,
    writer: Mutex<()>,
    prices: Arc<dyn PriceSource>,
    balances: Arc<dyn BalanceSource>,
    store: Arc<dyn StateStore>,
    policy: RemainderPolicy,
}

impl WeightedIndex {
    /// Starts building an index. Without an explicit store, state is kept in
    /// memory only.
    pub fn builder(
        prices: Arc<dyn PriceSource>,
        balances: Arc<dyn BalanceSource>,
    ) -> IndexBuilder {
        IndexBuilder {
            prices,
            balances,
            store: Arc::new(MemoryStore::new()),
            policy: RemainderPolicy::default(),
        }
    }

    /// Pulls a price for every asset into the cache. Either all cached
    /// prices change or none do.
    #[instrument(skip(self))]
    pub async fn refresh_prices(&self) -> Result<()> {
        let _writer = self.writer.lock().await;
        let current = self.snapshot().await;

        let prices = fetch_prices(self.prices.as_ref(), &current.portfolio).await?;
        let next = IndexSnapshot {
            portfolio: current.portfolio.with_prices(prices, Utc::now())?,
            ledger: current.ledger,
        };
        self.commit(next, "Refreshed prices").await
    }

    /// Reweights every asset by its share of `price * balance`.
    ///
    /// Uses the cached prices as they are; call [`Self::refresh_prices`]
    /// first when fresh prices matter.
    #[instrument(skip(self))]
    pub async fn rebalance(&self) -> Result<()> {
        let _writer = self.writer.lock().await;
        let current = self.snapshot().await;

        let balances = fetch_balances(self.balances.as_ref(), &current.portfolio).await?;
        let next = IndexSnapshot {
            portfolio: rebalance::rebalanced(&current.portfolio, &balances, self.policy)?,
            ledger: current.ledger,
        };
        self.commit(next, "Rebalanced").await
    }

    /// Replaces every weight with `weights`, given in entry order. They must
    /// sum to exactly 10000; cached prices are left as they are.
    #[instrument(skip(self))]
    pub async fn set_weights(&self, weights: Vec<u16>) -> Result<()> {
        let _writer = self.writer.lock().await;
        let current = self.snapshot().await;

        let next = IndexSnapshot {
            portfolio: current.portfolio.with_assigned_weights(weights)?,
            ledger: current.ledger,
        };
        self.commit(next, "Set weights").await
    }

    pub async fn mint(&self, amount: U256, to: &Holder) -> Result<()> {
        let _writer = self.writer.lock().await;
        let mut next = self.snapshot().await;
        next.ledger.mint(amount, to)?;
        self.commit(next, "Minted shares").await
    }

    pub async fn burn(&self, amount: U256, from: &Holder) -> Result<()> {
        let _writer = self.writer.lock().await;
        let mut next = self.snapshot().await;
        next.ledger.burn(amount, from)?;
        self.commit(next, "Burned shares").await
    }

    /// Weighted value of the portfolio at the current cached prices.
    pub async fn index_value(&self) -> Result<U256> {
        let portfolio = self.state.read().await.portfolio.clone();
        let balances = fetch_balances(self.balances.as_ref(), &portfolio).await?;
        valuation::index_value(portfolio.entries(), &balances)
    }

    pub async fn weights(&self) -> Vec<u16> {
        self.state.read().await.portfolio.weights()
    }

    pub async fn prices(&self) -> Vec<U256> {
        self.state.read().await.portfolio.prices()
    }

    pub async fn revision(&self) -> u64 {
        self.state.read().await.portfolio.revision()
    }

    pub async fn share_balance(&self, holder: &Holder) -> U256 {
        self.state.read().await.ledger.balance_of(holder)
    }

    pub async fn total_supply(&self) -> U256 {
        self.state.read().await.ledger.total_supply()
    }

    /// Current balance of every asset, in entry order.
    pub async fn balances(&self) -> Result<Vec<U256>> {
        let portfolio = self.state.read().await.portfolio.clone();
        fetch_balances(self.balances.as_ref(), &portfolio).await
    }

    pub async fn snapshot(&self) -> IndexSnapshot {
        self.state.read().await.clone()
    }

    async fn commit(&self, next: IndexSnapshot, what: &str) -> Result<()> {
        self.store.save(&next).await?;
        let revision = next.portfolio.revision();
        *self.state.write().await = next;
        info!(revision, "{what}");
        Ok(())
    }
}

async fn fetch_prices(source: &dyn PriceSource, portfolio: &PortfolioState) -> Result<Vec<U256>> {
    let futures = portfolio.assets().map(|asset| source.get_price(asset));
    join_all(futures).await.into_iter().collect()
}

async fn fetch_balances(
    source: &dyn BalanceSource,
    portfolio: &PortfolioState,
) -> Result<Vec<U256>> {
    let futures = portfolio.assets().map(|asset| source.balance_of(asset));
    join_all(futures).await.into_iter().collect()
}
