pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::{AppConfig, PriceSourceKind};
use crate::core::{BalanceSource, PriceSource, WeightedIndex};
use crate::providers::{ManualBalanceSource, ManualPriceSource, YahooPriceSource};
use crate::store::DiskStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Show,
    Refresh,
    Rebalance,
    SetWeights { weights: String },
    Mint { holder: String, amount: String },
    Burn { holder: String, amount: String },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("windex starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let index = open_index(&config).await?;
    match command {
        AppCommand::Show => cli::show::run(&index, &config.index).await,
        AppCommand::Refresh => cli::refresh::run(&index).await,
        AppCommand::Rebalance => cli::rebalance::run(&index).await,
        AppCommand::SetWeights { weights } => cli::rebalance::set_weights(&index, &weights).await,
        AppCommand::Mint { holder, amount } => cli::shares::mint(&index, &holder, &amount).await,
        AppCommand::Burn { holder, amount } => cli::shares::burn(&index, &holder, &amount).await,
    }
}

/// Wires the configured sources and the on-disk store into an index,
/// restoring saved state when there is any.
pub async fn open_index(config: &AppConfig) -> Result<WeightedIndex> {
    let index_config = &config.index;

    let prices: Arc<dyn PriceSource> = match index_config.price_source {
        PriceSourceKind::Manual => Arc::new(ManualPriceSource::new(index_config.manual_prices()?)),
        PriceSourceKind::Yahoo => {
            let base_url = config
                .providers
                .yahoo
                .as_ref()
                .map_or("https://query1.finance.yahoo.com", |p| &p.base_url);
            Arc::new(YahooPriceSource::new(base_url).with_symbols(index_config.symbols()))
        }
    };
    let balances: Arc<dyn BalanceSource> =
        Arc::new(ManualBalanceSource::new(index_config.balances()?));

    let data_path = config.default_data_path()?;
    let store = DiskStore::open(&data_path.join("index"))
        .with_context(|| format!("Failed to open index store at {}", data_path.display()))?;

    let index = WeightedIndex::builder(prices, balances)
        .store(Arc::new(store))
        .remainder_policy(index_config.remainder_policy)
        .open(index_config.asset_ids(), index_config.initial_weights()?)
        .await?;
    Ok(index)
}
