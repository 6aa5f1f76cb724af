use primitive_types::U256;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use windex::core::Holder;
use windex::core::config::AppConfig;
use windex::{AppCommand, open_index, run_command};

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn mount_quote(server: &MockServer, symbol: &str, price: f64) {
        let body = format!(
            r#"{{"chart": {{"result": [{{"meta": {{"regularMarketPrice": {price}, "currency": "USD"}}}}]}}}}"#
        );
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }
}

fn e18(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

fn write_config(dir: &TempDir, body: &str) -> String {
    let data_path = dir.path().join("data");
    let content = format!("{body}\ndata_path: \"{}\"\n", data_path.display());
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, content).expect("Failed to write config file");
    config_path.to_string_lossy().into_owned()
}

const MANUAL_INDEX: &str = r#"
index:
  name: "Two Token Index"
  assets:
    - id: TK1
      balance: "500"
      price: "2"
      weight: 5000
    - id: TK2
      balance: "500"
      price: "1"
      weight: 5000
"#;

async fn run(command: AppCommand, config_path: &str) {
    let result = run_command(command, Some(config_path)).await;
    assert!(result.is_ok(), "Command failed with: {:?}", result.err());
}

fn load(config_path: &str) -> AppConfig {
    AppConfig::load_from_path(Path::new(config_path)).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_manual_flow_persists_between_runs() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, MANUAL_INDEX);

    run(AppCommand::Show, &config_path).await;
    run(AppCommand::Refresh, &config_path).await;
    run(
        AppCommand::Mint {
            holder: "alice".to_string(),
            amount: "10.5".to_string(),
        },
        &config_path,
    )
    .await;
    run(
        AppCommand::Burn {
            holder: "alice".to_string(),
            amount: "0.5".to_string(),
        },
        &config_path,
    )
    .await;
    run(AppCommand::Show, &config_path).await;

    let index = open_index(&load(&config_path)).await.unwrap();
    assert_eq!(index.revision().await, 1);
    assert_eq!(index.weights().await, vec![5000, 5000]);
    assert_eq!(index.prices().await, vec![e18(2), e18(1)]);
    assert_eq!(
        index.index_value().await.unwrap(),
        U256::from(750u64) * U256::exp10(36)
    );
    assert_eq!(index.share_balance(&Holder::from("alice")).await, e18(10));
    assert_eq!(index.total_supply().await, e18(10));
}

#[test_log::test(tokio::test)]
async fn test_rebalance_from_cached_prices() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, MANUAL_INDEX);

    run(AppCommand::Refresh, &config_path).await;
    run(AppCommand::Rebalance, &config_path).await;

    let index = open_index(&load(&config_path)).await.unwrap();
    assert_eq!(index.weights().await, vec![6666, 3333]);
    assert_eq!(index.revision().await, 2);
}

#[test_log::test(tokio::test)]
async fn test_rebalance_before_refresh_fails() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, MANUAL_INDEX);

    let err = run_command(AppCommand::Rebalance, Some(&config_path))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("zero total value"), "{err}");

    let index = open_index(&load(&config_path)).await.unwrap();
    assert_eq!(index.weights().await, vec![5000, 5000]);
}

#[test_log::test(tokio::test)]
async fn test_overdrawn_burn_leaves_ledger_unchanged() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, MANUAL_INDEX);

    run(
        AppCommand::Mint {
            holder: "bob".to_string(),
            amount: "1".to_string(),
        },
        &config_path,
    )
    .await;
    let err = run_command(
        AppCommand::Burn {
            holder: "bob".to_string(),
            amount: "2".to_string(),
        },
        Some(&config_path),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Insufficient"), "{err}");

    let index = open_index(&load(&config_path)).await.unwrap();
    assert_eq!(index.share_balance(&Holder::from("bob")).await, e18(1));
    assert_eq!(index.total_supply().await, e18(1));
}

#[test_log::test(tokio::test)]
async fn test_changed_asset_list_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, MANUAL_INDEX);
    run(AppCommand::Show, &config_path).await;

    let mut config = load(&config_path);
    config.index.assets.reverse();
    let err = open_index(&config).await.err().unwrap();
    assert!(err.to_string().contains("stored index holds"), "{err}");
}

#[test_log::test(tokio::test)]
async fn test_yahoo_flow_with_derived_weights() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_quote(&server, "AAPL", 150.5).await;
    test_utils::mount_quote(&server, "TK2.NS", 49.5).await;

    let dir = TempDir::new().unwrap();
    let body = format!(
        r#"
index:
  name: "Derived"
  price_source: yahoo
  derive_weights: true
  remainder_policy: largest_value
  assets:
    - id: AAPL
      balance: "1"
    - id: TK2
      symbol: "TK2.NS"
      balance: "1"
providers:
  yahoo:
    base_url: "{}"
"#,
        server.uri()
    );
    let config_path = write_config(&dir, &body);

    run(AppCommand::Show, &config_path).await;

    let index = open_index(&load(&config_path)).await.unwrap();
    // 150.5 / 200 and 49.5 / 200, no remainder to place
    assert_eq!(index.weights().await, vec![7525, 2475]);
    assert_eq!(
        index.prices().await,
        vec![U256::from(1505u64) * U256::exp10(17), U256::from(495u64) * U256::exp10(17)]
    );
    assert_eq!(index.revision().await, 2);
}

#[test_log::test(tokio::test)]
async fn test_failed_quote_keeps_previous_prices() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_quote(&server, "AAPL", 10.0).await;

    let dir = TempDir::new().unwrap();
    let body = format!(
        r#"
index:
  name: "Partial"
  price_source: yahoo
  assets:
    - id: AAPL
      balance: "1"
      weight: 5000
    - id: MISSING
      balance: "1"
      weight: 5000
providers:
  yahoo:
    base_url: "{}"
"#,
        server.uri()
    );
    let config_path = write_config(&dir, &body);

    let err = run_command(AppCommand::Refresh, Some(&config_path))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Price unavailable for MISSING"), "{err}");

    let index = open_index(&load(&config_path)).await.unwrap();
    assert_eq!(index.prices().await, vec![U256::zero(), U256::zero()]);
    assert_eq!(index.revision().await, 0);
}

#[test_log::test(tokio::test)]
async fn test_set_weights_by_hand() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, MANUAL_INDEX);

    run(AppCommand::Refresh, &config_path).await;
    run(
        AppCommand::SetWeights {
            weights: "6000,4000".to_string(),
        },
        &config_path,
    )
    .await;

    let err = run_command(
        AppCommand::SetWeights {
            weights: "6000,3000".to_string(),
        },
        Some(&config_path),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("sum to 9000"), "{err}");

    let index = open_index(&load(&config_path)).await.unwrap();
    assert_eq!(index.weights().await, vec![6000, 4000]);
    assert_eq!(index.revision().await, 2);
    assert_eq!(
        index.index_value().await.unwrap(),
        U256::from(800u64) * U256::exp10(36)
    );
}
