//! Poloniex adapter tests against a scripted transport

use coinbridge_exchanges::poloniex::{PoloniexConfig, PoloniexExchange, PoloniexRestClient};
use coinbridge_exchanges::prelude::*;
use coinbridge_exchanges::{hmac_sha512_hex, HttpMethod};
use coinbridge_tests::{test_nonce, MockHttpTransport, ScriptedTransport};
use rstest::*;
use serde_json::{json, Value};
use serial_test::serial;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn exchange(transport: ScriptedTransport) -> PoloniexExchange<ScriptedTransport> {
    let config = PoloniexConfig::default().with_credentials("KEY", "SECRET");
    let client = PoloniexRestClient::with_transport(config, transport)
        .expect("valid default URLs")
        .with_nonce_source(test_nonce());
    PoloniexExchange::with_client(client)
}

fn amount(value: &str) -> Amount {
    Amount::from_str_exact(value).expect("valid decimal")
}

#[fixture]
fn order_book() -> Value {
    json!({
        "asks": [["0.02", "3"], ["0.03", "4"]],
        "bids": [["0.01", "5"]],
        "isFrozen": "0",
        "seq": 3
    })
}

#[fixture]
fn balances() -> Value {
    json!({"BTC": "0.59098578", "LTC": "3.31117268", "ETH": "0.00000000"})
}

// ============================================================================
// MARKET DATA
// ============================================================================

#[cfg(test)]
mod market_data_tests {
    use super::*;

    #[rstest]
    #[monoio::test]
    async fn test_top_and_bottom(order_book: Value) {
        let exchange = exchange(ScriptedTransport::new().route("command=returnOrderBook", order_book));

        let top = exchange.get_top("LTC", "BTC").await.unwrap();
        let bottom = exchange.get_bottom("LTC", "BTC").await.unwrap();

        assert_eq!(top, vec![BookLevel::new("0.01", "5")]);
        assert_eq!(bottom, vec![BookLevel::new("0.02", "3"), BookLevel::new("0.03", "4")]);
        assert_eq!(
            exchange.rest().transport().calls()[0].target(),
            "https://poloniex.com/public?command=returnOrderBook&currencyPair=BTC_LTC&depth=20"
        );
    }

    #[monoio::test]
    async fn test_book_capped_to_depth() {
        let bids: Vec<Value> = (1..=50).map(|i| json!([format!("0.{i:03}"), "1"])).collect();
        let exchange = exchange(
            ScriptedTransport::new().route("command=returnOrderBook", json!({"asks": [], "bids": bids})),
        );

        let top = exchange.get_top("LTC", "BTC").await.unwrap();

        assert_eq!(top.len(), ORDER_BOOK_DEPTH);
        assert_eq!(top[0].price, "0.001");
    }
}

// ============================================================================
// ACCOUNT
// ============================================================================

#[cfg(test)]
mod account_tests {
    use super::*;

    #[rstest]
    #[monoio::test]
    async fn test_wallet_passthrough(balances: Value) {
        let exchange = exchange(ScriptedTransport::new().route("command=returnBalances", balances));

        let wallet = exchange.get_wallet().await.unwrap();

        assert_eq!(wallet.len(), 3);
        assert_eq!(wallet["LTC"], "3.31117268");
    }

    #[rstest]
    #[case("BTC", "0.59098578")]
    #[case("ETH", "0")]
    #[case("XMR", "0")]
    #[monoio::test]
    async fn test_funds(balances: Value, #[case] currency: &str, #[case] expected: &str) {
        let exchange = exchange(ScriptedTransport::new().route("command=returnBalances", balances));

        assert_eq!(exchange.get_funds(currency).await.unwrap(), amount(expected));
    }

    #[monoio::test]
    async fn test_funds_from_error_payload() {
        let exchange = exchange(
            ScriptedTransport::new().route("command=returnBalances", json!({"error": "Invalid API key/secret pair."})),
        );
        assert_eq!(exchange.get_funds("BTC").await.unwrap(), Amount::ZERO);
    }

    #[monoio::test]
    async fn test_private_request_signature() {
        let exchange = exchange(ScriptedTransport::new().route("command=returnBalances", json!({})));
        exchange.get_wallet().await.unwrap();

        let request = &exchange.rest().transport().calls()[0];
        let body = request.form.as_deref().unwrap();

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://poloniex.com/tradingApi");
        assert!(body.starts_with("command=returnBalances&nonce="));
        assert_eq!(request.header("Key"), Some("KEY"));
        assert_eq!(request.header("Sign").unwrap(), hmac_sha512_hex("SECRET", body).unwrap());
    }
}

// ============================================================================
// ORDERS
// ============================================================================

#[cfg(test)]
mod order_tests {
    use super::*;

    #[rstest]
    #[case(SaleKind::Limit, false)]
    #[case(SaleKind::Market, true)]
    #[monoio::test]
    async fn test_sale(#[case] kind: SaleKind, #[case] immediate: bool) {
        let exchange = exchange(ScriptedTransport::new().route(
            "command=sell",
            json!({"orderNumber": 31226040, "resultingTrades": []}),
        ));

        let order_id = exchange
            .create_sale("LTC", "BTC", amount("5"), amount("0.01"), kind)
            .await
            .unwrap();

        assert_eq!(order_id.as_deref(), Some("31226040"));
        let body = exchange.rest().transport().calls()[0].form.clone().unwrap();
        assert!(body.contains("currencyPair=BTC_LTC"));
        assert!(body.contains("amount=5"));
        assert!(body.contains("rate=0.01"));
        assert_eq!(body.contains("immediateOrCancel=1"), immediate);
    }

    #[monoio::test]
    async fn test_rejected_sale() {
        let exchange = exchange(
            ScriptedTransport::new().route("command=sell", json!({"error": "Not enough LTC."})),
        );

        let order_id = exchange
            .create_sale("LTC", "BTC", amount("5"), amount("0.01"), SaleKind::Limit)
            .await
            .unwrap();
        assert!(order_id.is_none());
    }

    #[rstest]
    #[case(json!({"success": 1}), true)]
    #[case(json!({"success": 0, "error": "Invalid order number, or you are not the person who placed the order."}), false)]
    #[case(json!({"success": true}), false)]
    #[case(json!({"error": "Nonce must be greater than 1."}), false)]
    #[monoio::test]
    async fn test_cancel(#[case] payload: Value, #[case] expected: bool) {
        let exchange = exchange(ScriptedTransport::new().route("command=cancelOrder", payload));

        assert_eq!(exchange.cancel("LTC", "BTC", "12345").await.unwrap(), expected);

        let body = exchange.rest().transport().calls()[0].form.clone().unwrap();
        assert!(body.contains("currencyPair=BTC_LTC"));
        assert!(body.contains("orderNumber=12345"));
    }
}

// ============================================================================
// CREDENTIAL GATE
// ============================================================================

#[cfg(test)]
mod credential_tests {
    use super::*;

    fn assert_auth_error<T: std::fmt::Debug>(result: Result<T>) {
        assert!(
            matches!(result, Err(ExchangeError::Authentication(_))),
            "expected authentication error, got {result:?}"
        );
    }

    #[rstest]
    #[case(PoloniexConfig::default())]
    #[case(PoloniexConfig::default().with_credentials("KEY", ""))]
    #[case(PoloniexConfig::default().with_credentials("", "SECRET"))]
    #[monoio::test]
    async fn test_private_calls_never_reach_transport(#[case] config: PoloniexConfig) {
        let mut transport = MockHttpTransport::new();
        transport.expect_execute().never();
        let exchange = PoloniexExchange::with_client(PoloniexRestClient::with_transport(config, transport).unwrap());
        let ids = vec!["12345".to_string()];

        assert_auth_error(exchange.get_wallet().await);
        assert_auth_error(exchange.get_funds("BTC").await);
        assert_auth_error(
            exchange
                .create_sale("LTC", "BTC", amount("1"), amount("0.1"), SaleKind::Limit)
                .await,
        );
        assert_auth_error(exchange.cancel("LTC", "BTC", "12345").await);
        assert_auth_error(exchange.confirm_sale("LTC", "BTC", &ids, None).await);
    }
}

// ============================================================================
// SALE CONFIRMATION
// ============================================================================

#[cfg(test)]
mod confirm_sale_tests {
    use super::*;

    fn open_orders() -> Value {
        json!([
            {"orderNumber": "100", "type": "sell", "rate": "0.025", "amount": "40", "total": "1"},
            {"orderNumber": "999", "type": "sell", "rate": "0.025", "amount": "1", "total": "0.025"}
        ])
    }

    fn trade_history() -> Value {
        json!([
            {"globalTradeID": 1, "tradeID": "11", "date": "2017-06-01 10:00:00", "rate": "0.02",
             "amount": "10", "total": "0.2", "fee": "0.0025", "orderNumber": "200", "type": "sell", "category": "exchange"},
            {"globalTradeID": 2, "tradeID": "12", "date": "2017-06-01 10:00:01", "rate": "0.02",
             "amount": "5", "total": "0.1", "fee": "0.0025", "orderNumber": "200", "type": "sell", "category": "exchange"},
            {"globalTradeID": 3, "tradeID": "13", "date": "2017-06-01 10:00:02", "rate": "0.03",
             "amount": "10", "total": "0.3", "fee": "0.0025", "orderNumber": 300, "type": "sell", "category": "exchange"},
            {"globalTradeID": 4, "tradeID": "14", "date": "2017-06-01 10:00:03", "rate": "0.05",
             "amount": "100", "total": "5", "fee": "0.0025", "orderNumber": "777", "type": "sell", "category": "exchange"}
        ])
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|id| id.to_string()).collect()
    }

    #[monoio::test(enable_timer = true)]
    async fn test_history_before_open_orders() {
        let transport = ScriptedTransport::new()
            .route_delayed("command=returnOpenOrders", open_orders(), 30)
            .route_delayed("command=returnTradeHistory", trade_history(), 5);
        let exchange = exchange(transport);

        let confirmation = exchange
            .confirm_sale("LTC", "BTC", &ids(&["100", "200", "300", "400"]), None)
            .await
            .unwrap();

        let transport = exchange.rest().transport();
        assert_eq!(
            transport.completion_order(),
            vec!["command=returnTradeHistory", "command=returnOpenOrders"]
        );

        assert_eq!(confirmation.open.len(), 1);
        assert_eq!(confirmation.open["100"], amount("40"));
        assert_eq!(confirmation.sold.len(), 2);
        assert_eq!(confirmation.sold["200"], amount("0.3"));
        assert_eq!(confirmation.sold["300"], amount("0.3"));
        assert!(!confirmation.sold.contains_key("400"));
        assert!(!confirmation.sold.contains_key("777"));
        assert_eq!(confirmation.total, amount("1.6"));
    }

    #[monoio::test]
    async fn test_fills_match_the_requested_order_only() {
        let exchange = exchange(
            ScriptedTransport::new()
                .route("command=returnOpenOrders", json!([]))
                .route("command=returnTradeHistory", trade_history()),
        );

        let confirmation = exchange
            .confirm_sale("LTC", "BTC", &ids(&["300"]), None)
            .await
            .unwrap();

        assert_eq!(confirmation.sold.keys().collect::<Vec<_>>(), vec!["300"]);
        assert_eq!(confirmation.total, amount("0.3"));
    }

    #[monoio::test]
    async fn test_since_forwarded_as_start() {
        let exchange = exchange(
            ScriptedTransport::new()
                .route("command=returnOpenOrders", json!([]))
                .route("command=returnTradeHistory", json!([])),
        );

        exchange
            .confirm_sale("LTC", "BTC", &ids(&["1"]), Some(Timestamp::from_secs(1_496_000_000)))
            .await
            .unwrap();

        let calls = exchange.rest().transport().calls();
        let history = calls
            .iter()
            .filter_map(|call| call.form.as_deref())
            .find(|body| body.contains("command=returnTradeHistory"))
            .unwrap();
        assert!(history.contains("currencyPair=BTC_LTC"));
        assert!(history.contains("start=1496000000"));
    }

    #[monoio::test]
    async fn test_error_payloads_read_as_empty() {
        let exchange = exchange(
            ScriptedTransport::new()
                .route("command=returnOpenOrders", json!({"error": "Invalid currencyPair parameter."}))
                .route("command=returnTradeHistory", json!({"error": "Invalid currencyPair parameter."})),
        );

        let confirmation = exchange
            .confirm_sale("LTC", "BTC", &ids(&["1", "2"]), None)
            .await
            .unwrap();
        assert_eq!(confirmation, SaleConfirmation::default());
    }

    #[monoio::test]
    async fn test_transport_failure() {
        let exchange = exchange(
            ScriptedTransport::new()
                .route("command=returnOpenOrders", json!([]))
                .fail("command=returnTradeHistory", ExchangeError::HttpError(502, "Bad Gateway".into())),
        );

        let err = exchange
            .confirm_sale("LTC", "BTC", &ids(&["1"]), None)
            .await
            .unwrap_err();
        assert_eq!(err, ExchangeError::HttpError(502, "Bad Gateway".into()));
    }
}

// ============================================================================
// ENVIRONMENT CONFIGURATION
// ============================================================================

#[cfg(test)]
mod env_config_tests {
    use super::*;

    #[test]
    #[serial]
    fn test_env_credentials_loaded() {
        std::env::set_var("POLONIEX_API_KEY", "env-key");
        std::env::set_var("POLONIEX_API_SECRET", "env-secret");

        let config = PoloniexConfig::default().with_env_credentials().unwrap();
        assert_eq!(config.credentials().map(|c| c.key().to_string()).as_deref(), Some("env-key"));

        std::env::remove_var("POLONIEX_API_KEY");
        std::env::remove_var("POLONIEX_API_SECRET");
    }

    #[test]
    #[serial]
    fn test_missing_env_credentials() {
        std::env::set_var("POLONIEX_API_KEY", "env-key");
        std::env::remove_var("POLONIEX_API_SECRET");

        let err = PoloniexConfig::default().with_env_credentials().unwrap_err();
        assert!(matches!(err, ExchangeError::Configuration(msg) if msg.contains("POLONIEX_API_SECRET")));

        std::env::remove_var("POLONIEX_API_KEY");
    }
}
