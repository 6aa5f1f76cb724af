use crate::core::asset::AssetId;
use crate::core::error::{IndexError, Result};
use crate::core::fixed;
use crate::core::price::PriceSource;
use crate::providers::util::with_retry;
use async_trait::async_trait;
use primitive_types::U256;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use tracing::{debug, instrument};

const RETRY_DELAY_MS: u64 = 200;

/// Prices assets from Yahoo Finance's chart endpoint.
///
/// Assets are looked up by their configured ticker symbol, falling back to
/// the asset id itself. The quoted market price is converted to 18-decimal
/// fixed point; the quote currency is not converted.
pub struct YahooPriceSource {
    base_url: String,
    symbols: HashMap<AssetId, String>,
    retries: usize,
}

impl YahooPriceSource {
    pub fn new(base_url: &str) -> Self {
        YahooPriceSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            symbols: HashMap::new(),
            retries: 2,
        }
    }

    pub fn with_symbols(mut self, symbols: HashMap<AssetId, String>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    fn symbol_for<'a>(&'a self, asset: &'a AssetId) -> &'a str {
        self.symbols
            .get(asset)
            .map(String::as_str)
            .unwrap_or_else(|| asset.as_str())
    }
}

#[derive(Deserialize, Debug)]
struct YahooPriceResponse {
    chart: PriceChartResult,
}

#[derive(Deserialize, Debug)]
struct PriceChartResult {
    result: Vec<PriceChartItem>,
}

#[derive(Deserialize, Debug)]
struct PriceChartItem {
    meta: PriceChartMeta,
}

#[derive(Deserialize, Debug)]
struct PriceChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
    currency: Option<String>,
}

fn unavailable(asset: &AssetId, reason: impl Display) -> IndexError {
    IndexError::PriceUnavailable {
        asset: asset.clone(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    #[instrument(
        name = "YahooPriceFetch",
        skip(self),
        fields(asset = %asset)
    )]
    async fn get_price(&self, asset: &AssetId) -> Result<U256> {
        let symbol = self.symbol_for(asset);
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        debug!("Requesting price data from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("windex/1.0")
            .build()
            .map_err(|e| unavailable(asset, e))?;
        let response = with_retry(|| client.get(&url).send(), self.retries, RETRY_DELAY_MS)
            .await
            .map_err(|e| unavailable(asset, format!("Request error: {e} for symbol: {symbol}")))?;

        if !response.status().is_success() {
            return Err(unavailable(
                asset,
                format!("HTTP error: {} for symbol: {}", response.status(), symbol),
            ));
        }

        let text = response.text().await.map_err(|e| unavailable(asset, e))?;
        let data: YahooPriceResponse = serde_json::from_str(&text).map_err(|e| {
            unavailable(
                asset,
                format!("Failed to parse JSON response for {symbol}: {e}"),
            )
        })?;
        let item = data
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| {
                unavailable(asset, format!("No price data found for symbol: {symbol}"))
            })?;

        debug!(
            price = item.meta.regular_market_price,
            currency = ?item.meta.currency,
            "Received Yahoo quote"
        );
        fixed::price_from_f64(item.meta.regular_market_price).map_err(|e| unavailable(asset, e))
    }
}
