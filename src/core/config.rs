use super::asset::AssetId;
use super::fixed::{self, PRICE_DECIMALS};
use super::index::InitialWeights;
use super::rebalance::RemainderPolicy;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Valuations carry price plus balance decimals, and 10^77 is the largest
/// power of ten a U256 holds.
pub const MAX_BALANCE_DECIMALS: u32 = 77 - PRICE_DECIMALS;

fn default_balance_decimals() -> u32 {
    18
}

fn default_balance() -> String {
    "0".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssetConfig {
    pub id: String,
    /// Ticker used by quote providers, defaults to `id`.
    pub symbol: Option<String>,
    /// Quantity held, as a decimal string.
    #[serde(default = "default_balance")]
    pub balance: String,
    /// Manual price, as a decimal string.
    pub price: Option<String>,
    /// Initial weight in basis points.
    pub weight: Option<u16>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PriceSourceKind {
    #[default]
    Manual,
    Yahoo,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexConfig {
    pub name: String,
    pub assets: Vec<AssetConfig>,
    #[serde(default = "default_balance_decimals")]
    pub balance_decimals: u32,
    #[serde(default)]
    pub derive_weights: bool,
    #[serde(default)]
    pub remainder_policy: RemainderPolicy,
    #[serde(default)]
    pub price_source: PriceSourceKind,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub index: IndexConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "windex", "windex")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "windex", "windex")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.index.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        if self.balance_decimals > MAX_BALANCE_DECIMALS {
            bail!(
                "balance_decimals is {} but at most {MAX_BALANCE_DECIMALS} is supported",
                self.balance_decimals
            );
        }
        Ok(())
    }

    pub fn asset_ids(&self) -> Vec<AssetId> {
        self.assets.iter().map(|a| AssetId::new(&a.id)).collect()
    }

    /// Explicit weights need a `weight` on every asset; `derive_weights`
    /// ignores them.
    pub fn initial_weights(&self) -> Result<InitialWeights> {
        if self.derive_weights {
            return Ok(InitialWeights::Derived);
        }
        let weights = self
            .assets
            .iter()
            .map(|a| {
                a.weight.with_context(|| {
                    format!("Asset {} has no weight and derive_weights is off", a.id)
                })
            })
            .collect::<Result<Vec<u16>>>()?;
        Ok(InitialWeights::Explicit(weights))
    }

    pub fn balances(&self) -> Result<HashMap<AssetId, U256>> {
        self.validate()?;
        self.assets
            .iter()
            .map(|a| {
                let balance = fixed::parse_decimal(&a.balance, self.balance_decimals)
                    .with_context(|| format!("Invalid balance for asset {}", a.id))?;
                Ok((AssetId::new(&a.id), balance))
            })
            .collect()
    }

    pub fn manual_prices(&self) -> Result<HashMap<AssetId, U256>> {
        let mut prices = HashMap::new();
        for asset in &self.assets {
            if let Some(price) = &asset.price {
                let price = fixed::parse_decimal(price, PRICE_DECIMALS)
                    .with_context(|| format!("Invalid price for asset {}", asset.id))?;
                prices.insert(AssetId::new(&asset.id), price);
            }
        }
        if self.price_source == PriceSourceKind::Manual && prices.len() < self.assets.len() {
            bail!("Manual price source needs a price for every asset");
        }
        Ok(prices)
    }

    pub fn symbols(&self) -> HashMap<AssetId, String> {
        self.assets
            .iter()
            .filter_map(|a| a.symbol.clone().map(|s| (AssetId::new(&a.id), s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
index:
  name: "Two Token Index"
  assets:
    - id: TK1
      balance: "500"
      price: "2"
      weight: 5000
    - id: TK2
      symbol: "TK2-USD"
      balance: "500.5"
      price: "1"
      weight: 5000
"#;

    #[test]
    fn test_config_deserialization() {
        let config: AppConfig = serde_yaml::from_str(YAML).expect("Failed to deserialize");

        assert_eq!(config.index.name, "Two Token Index");
        assert_eq!(config.index.balance_decimals, 18);
        assert!(!config.index.derive_weights);
        assert_eq!(config.index.remainder_policy, RemainderPolicy::Floor);
        assert_eq!(config.index.price_source, PriceSourceKind::Manual);
        assert_eq!(
            config.index.asset_ids(),
            vec![AssetId::from("TK1"), AssetId::from("TK2")]
        );
        assert!(config.providers.yahoo.is_some());
        assert!(config.data_path.is_none());

        assert_eq!(
            config.index.initial_weights().unwrap(),
            InitialWeights::Explicit(vec![5000, 5000])
        );

        let balances = config.index.balances().unwrap();
        assert_eq!(
            balances[&AssetId::from("TK2")],
            U256::from(5005u64) * U256::exp10(17)
        );
        let prices = config.index.manual_prices().unwrap();
        assert_eq!(prices[&AssetId::from("TK1")], U256::from(2u64) * U256::exp10(18));
        assert_eq!(
            config.index.symbols(),
            HashMap::from([(AssetId::from("TK2"), "TK2-USD".to_string())])
        );
    }

    #[test]
    fn test_optional_sections() {
        let yaml_str = r#"
index:
  name: "Derived"
  derive_weights: true
  remainder_policy: largest_value
  price_source: yahoo
  balance_decimals: 6
  assets:
    - id: BTC-USD
      balance: "0.5"
    - id: ETH-USD
providers:
  yahoo:
    base_url: "http://example.com/yahoo"
data_path: "/tmp/windex"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();

        assert_eq!(config.index.initial_weights().unwrap(), InitialWeights::Derived);
        assert_eq!(
            config.index.remainder_policy,
            RemainderPolicy::LargestValue
        );
        assert_eq!(config.index.price_source, PriceSourceKind::Yahoo);
        assert_eq!(
            config.providers.yahoo.as_ref().unwrap().base_url,
            "http://example.com/yahoo"
        );
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/windex")
        );

        let balances = config.index.balances().unwrap();
        assert_eq!(balances[&AssetId::from("BTC-USD")], U256::from(500_000u64));
        assert_eq!(balances[&AssetId::from("ETH-USD")], U256::zero());
        assert!(config.index.manual_prices().unwrap().is_empty());
    }

    #[test]
    fn test_missing_weight_or_price_is_reported() {
        let yaml_str = r#"
index:
  name: "Broken"
  assets:
    - id: TK1
      weight: 10000
    - id: TK2
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();

        let err = config.index.initial_weights().unwrap_err();
        assert!(err.to_string().contains("Asset TK2 has no weight"));
        assert!(config.index.manual_prices().is_err());
    }

    #[test]
    fn test_invalid_balance_is_reported() {
        let yaml_str = r#"
index:
  name: "Broken"
  balance_decimals: 2
  assets:
    - id: TK1
      balance: "1.005"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        let err = config.index.balances().unwrap_err();
        assert!(err.to_string().contains("Invalid balance for asset TK1"));
    }

    #[test]
    fn test_balance_decimals_are_bounded() {
        let yaml_str = r#"
index:
  name: "Too Precise"
  balance_decimals: 60
  assets:
    - id: TK1
      balance: "1"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        let err = config.index.balances().unwrap_err();
        assert!(err.to_string().contains("at most 59 is supported"));

        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), yaml_str).unwrap();
        assert!(AppConfig::load_from_path(file.path()).is_err());

        let mut config = config;
        config.index.balance_decimals = MAX_BALANCE_DECIMALS;
        assert_eq!(
            config.index.balances().unwrap()[&AssetId::from("TK1")],
            U256::exp10(59)
        );
    }

    #[test]
    fn test_load_from_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), YAML).unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.index.assets.len(), 2);

        let missing = AppConfig::load_from_path("/nonexistent/windex.yaml").unwrap_err();
        assert!(missing.to_string().contains("Failed to read config file"));
    }
}
