//! Facade behaviour against a recording transport: what goes out on the
//! wire, and what must fail before anything goes out.

use bn_api_types::{PrivateKey, RequestId, Wallet};
use bn_chain_binomena::{
    BinomenaClient, HealthStatus, PaprdBackend, PaprdFacade, PaprdOperation, PaprdRoutes,
};
use bn_chain_client::mock::MockTransport;
use bn_chain_client::{ClientError, Method};
use serde_json::json;
use std::sync::Arc;

fn client(mock: MockTransport) -> (Arc<MockTransport>, BinomenaClient) {
    let mock = Arc::new(mock);
    (mock.clone(), BinomenaClient::new(mock))
}

fn native_facade(mock: MockTransport) -> (Arc<MockTransport>, PaprdFacade) {
    let (mock, client) = client(mock);
    let routes = PaprdRoutes::resolve(PaprdBackend::Direct, "paprd_stablecoin");
    (mock, PaprdFacade::new(client, routes))
}

fn contract_facade(mock: MockTransport) -> (Arc<MockTransport>, PaprdFacade) {
    let (mock, client) = client(mock);
    let routes = PaprdRoutes::resolve(PaprdBackend::ContractCall, "paprd_stablecoin");
    (mock, PaprdFacade::new(client, routes))
}

fn wallet() -> Wallet {
    Wallet::new("AdNeSender", PrivateKey::new("sender-key"))
}

// ============================================================================
// Direct endpoints
// ============================================================================

#[tokio::test]
async fn create_wallet_then_fresh_balance_is_zero() {
    let (mock, client) = client(
        MockTransport::new()
            .on_post("/wallet", json!({"address": "AdNeFresh", "privateKey": "fresh-key"}))
            .on_get("/balance/AdNeFresh", json!({"address": "AdNeFresh", "balance": 0})),
    );

    let wallet = client.create_wallet().await.unwrap();
    assert!(!wallet.address.is_empty());
    assert!(!wallet.private_key.is_empty());

    let balance = client.wallet_balance(&wallet.address).await.unwrap();
    assert_eq!(balance.address, "AdNeFresh");
    assert_eq!(balance.balance, 0.0);

    let requests = mock.requests();
    assert_eq!(requests[0].method, Method::Post);
    assert!(requests[0].body.is_none());
}

#[tokio::test]
async fn import_wallet_sends_key_once() {
    let (mock, client) = client(
        MockTransport::new().on_post("/wallet/import", json!({"address": "AdNeImported", "privateKey": "k"})),
    );

    let wallet = client.import_wallet(&PrivateKey::new("k")).await.unwrap();
    assert_eq!(wallet.address, "AdNeImported");
    assert_eq!(mock.requests()[0].body, Some(json!({"privateKey": "k"})));
}

#[tokio::test]
async fn negative_amount_is_passed_through() {
    let (mock, client) = client(MockTransport::new().on_post(
        "/transaction",
        json!({"status": "accepted", "txId": "tx-1", "node": "node-a"}),
    ));

    let receipt = client
        .send_transaction("AdNeA", "AdNeB", -5.0, &PrivateKey::new("k"))
        .await
        .unwrap();
    assert_eq!(receipt.tx_id.as_deref(), Some("tx-1"));

    let request = &mock.requests()[0];
    assert_eq!(
        request.body,
        Some(json!({"from": "AdNeA", "to": "AdNeB", "amount": -5.0, "privateKey": "k"}))
    );
    assert!(request.idempotency_key.is_some());
}

#[tokio::test]
async fn retry_reuses_request_id() {
    let (mock, client) = client(MockTransport::new().respond(
        Method::Post,
        "/transaction",
        Err(ClientError::Network("connection reset".into())),
    ));

    let request_id = RequestId::new();
    let key = PrivateKey::new("k");
    for _ in 0..2 {
        let err = client
            .send_transaction_with_request_id("AdNeA", "AdNeB", 1.0, &key, &request_id)
            .await
            .unwrap_err();
        assert!(err.is_network());
    }

    let keys: Vec<_> = mock
        .requests()
        .into_iter()
        .map(|r| r.idempotency_key)
        .collect();
    assert_eq!(keys, vec![Some(request_id.to_string()); 2]);
}

#[tokio::test]
async fn history_collects_matching_transactions() {
    let (_, client) = client(MockTransport::new().on_get(
        "/blocks",
        json!({
            "count": 2,
            "blocks": [
                {"index": 0, "data": [{"id": "t0", "from": "AdNeX", "to": "AdNeMe", "amount": 5}]},
                {"index": 1, "data": [
                    {"id": "t1", "from": "AdNeX", "to": "AdNeY", "amount": 1},
                    {"id": "t2", "from": "AdNeMe", "to": "AdNeY", "amount": 2}
                ]}
            ]
        }),
    ));

    let history = client.transaction_history("AdNeMe").await.unwrap();
    let ids: Vec<_> = history.iter().map(|tx| tx.id.as_str()).collect();
    assert_eq!(ids, vec!["t0", "t2"]);
}

#[tokio::test]
async fn null_fields_in_blocks_read_as_empty() {
    let (_, client) = client(MockTransport::new().on_get(
        "/blocks",
        json!({
            "blocks": [
                {"index": 0, "data": null, "previousHash": null},
                {"index": 1, "data": [{"id": "t1", "from": "AdNeMe", "to": "AdNeY", "amount": 4, "signature": null}]}
            ],
            "count": null
        }),
    ));

    let list = client.all_blocks().await.unwrap();
    assert!(list.blocks[0].data.is_empty());
    assert!(list.blocks[0].previous_hash.is_empty());

    let history = client.transaction_history("AdNeMe").await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].signature.is_empty());
}

#[tokio::test]
async fn empty_or_null_payloads_are_success_with_defaults() {
    let (_, client) = client(
        MockTransport::new()
            .on_post("/wallet", serde_json::Value::Null)
            .on_get("/balance/AdNeNew", json!({"address": "AdNeNew", "balance": null})),
    );

    let wallet = client.create_wallet().await.unwrap();
    assert!(wallet.address.is_empty());
    assert!(!wallet.is_complete());

    let balance = client.wallet_balance("AdNeNew").await.unwrap();
    assert_eq!(balance.address, "AdNeNew");
    assert_eq!(balance.balance, 0.0);
}

#[tokio::test]
async fn explorer_overview_keeps_newest_ten() {
    let blocks: Vec<_> = (0..15).map(|index| json!({"index": index})).collect();
    let (_, client) = client(
        MockTransport::new()
            .on_get("/status", json!({"nodeId": "n1", "status": "running", "blocks": 15, "peers": 3}))
            .on_get("/blocks", json!({"blocks": blocks, "count": 15})),
    );

    let overview = client.explorer_overview().await.unwrap();
    assert_eq!(overview.status.node_id, "n1");
    assert_eq!(overview.latest_blocks.len(), 10);
    assert_eq!(overview.latest_blocks[0].index, 14);
    assert_eq!(overview.latest_blocks[9].index, 5);
}

#[tokio::test]
async fn health_check_reports_configuration_gap() {
    let (mock, client) = client(MockTransport::new());
    let health = client.check_health(false).await;
    assert_eq!(health.status, HealthStatus::NotConfigured);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn health_check_uses_timeout_and_reports_status() {
    let (mock, client) = client(MockTransport::new().respond(
        Method::Get,
        "/status",
        Err(ClientError::Rejected {
            status: 503,
            message: "Failed to check node health: Service Unavailable".into(),
        }),
    ));

    let health = client.check_health(true).await;
    assert_eq!(health.status, HealthStatus::Error);
    assert_eq!(health.error.as_deref(), Some("API returned status: 503"));
    assert_eq!(
        mock.requests()[0].timeout,
        Some(std::time::Duration::from_secs(5))
    );
}

#[tokio::test]
async fn deploy_wasm_encodes_code() {
    let (mock, client) = client(
        MockTransport::new().on_post("/contracts/deploy", json!({"contractId": "c-9", "name": "counter"})),
    );

    let receipt = client
        .deploy_wasm("AdNeOwner", "counter", b"\0asm", &PrivateKey::new("k"), 100)
        .await
        .unwrap();
    assert_eq!(receipt.contract_id(), Some("c-9"));

    let body = mock.requests()[0].body.clone().unwrap();
    assert_eq!(body["code"], json!("AGFzbQ=="));
    assert_eq!(body["fee"], json!(100));
}

// ============================================================================
// Generic contract call
// ============================================================================

#[tokio::test]
async fn contract_call_envelope_includes_key_only_when_supplied() {
    let (mock, client) = client(MockTransport::new().on_post("/contracts/call", json!({"ok": true})));

    client
        .call_contract("counter", "get", vec![], None)
        .await
        .unwrap();
    client
        .call_contract("counter", "inc", vec![json!(2)], Some(&PrivateKey::new("k")))
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(
        requests[0].body,
        Some(json!({"contractId": "counter", "function": "get", "args": []}))
    );
    assert_eq!(
        requests[1].body,
        Some(json!({"contractId": "counter", "function": "inc", "args": [2], "privateKey": "k"}))
    );
}

#[tokio::test]
async fn contract_call_returns_result_unmodified() {
    let result = json!({"balance": 12.5, "extra": [1, 2]});
    let (_, client) = client(MockTransport::new().on_post("/contracts/call", result.clone()));
    let value = client
        .call_contract("token", "balance_of", vec![json!("AdNe1")], None)
        .await
        .unwrap();
    assert_eq!(value, result);
}

// ============================================================================
// PAPRD: native endpoints revision
// ============================================================================

#[tokio::test]
async fn burn_is_always_unavailable() {
    let (mock, facade) = native_facade(MockTransport::new());

    for wallet in [wallet(), Wallet::default()] {
        let err = facade.burn(&wallet, 100.0).await.unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(
            err.to_string(),
            "PAPRD burn is not implemented on this node (/paprd/burn endpoint unavailable)"
        );
    }
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn unavailable_operations_never_touch_the_network() {
    let (mock, facade) = native_facade(MockTransport::new());
    let w = wallet();

    let results = vec![
        facade.add_collateral(&w, 1.0, bn_api_types::CollateralType::Bnm).await.map(|_| ()),
        facade.remove_collateral(&w, 1.0).await.map(|_| ()),
        facade.collateral_balance("AdNe1").await.map(|_| ()),
        facade.collateral_ratio().await.map(|_| ()),
        facade.set_collateral_ratio(&w, 150.0).await.map(|_| ()),
        facade.add_minter(&w, "AdNe2").await.map(|_| ()),
        facade.remove_minter(&w, "AdNe2").await.map(|_| ()),
        facade.blacklist(&w, "AdNe2").await.map(|_| ()),
        facade.unblacklist(&w, "AdNe2").await.map(|_| ()),
        facade.pause(&w).await.map(|_| ()),
        facade.unpause(&w).await.map(|_| ()),
        facade.transfer_ownership(&w, "AdNe2").await.map(|_| ()),
        facade.is_blacklisted("AdNe2").await.map(|_| ()),
        facade.is_minter("AdNe2").await.map(|_| ()),
    ];

    for result in results {
        match result.unwrap_err() {
            ClientError::Unavailable { endpoint, .. } => assert!(endpoint.starts_with("/paprd/")),
            other => panic!("expected unavailable, got {other:?}"),
        }
    }
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn transfer_and_mint_require_connected_wallet() {
    let (mock, facade) = native_facade(MockTransport::new());
    let disconnected = Wallet::default();

    let err = facade.transfer(&disconnected, "AdNeB", 1.0).await.unwrap_err();
    assert!(err.to_string().starts_with("wallet not connected"));

    let err = facade.mint(&disconnected, "AdNeB", 1.0).await.unwrap_err();
    assert!(err.to_string().starts_with("wallet not connected"));

    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn native_transfer_and_mint_bodies() {
    let (mock, facade) = native_facade(
        MockTransport::new()
            .on_post("/paprd/transfer", json!({"success": true, "txId": "p-1"}))
            .on_post("/paprd/mint", json!({"success": true, "txId": "p-2"})),
    );
    let w = wallet();

    let outcome = facade.transfer(&w, "AdNeB", 25.0).await.unwrap();
    assert_eq!(outcome.tx_id.as_deref(), Some("p-1"));
    facade.mint(&w, "AdNeC", 10.0).await.unwrap();

    let requests = mock.requests();
    assert_eq!(
        requests[0].body,
        Some(json!({"from": "AdNeSender", "to": "AdNeB", "amount": 25.0, "privateKey": "sender-key"}))
    );
    assert_eq!(
        requests[1].body,
        Some(json!({"caller": "AdNeSender", "to": "AdNeC", "amount": 10.0, "privateKey": "sender-key"}))
    );
    assert!(requests.iter().all(|r| r.idempotency_key.is_some()));
}

#[tokio::test]
async fn info_endpoint_backs_supply_owner_and_pause() {
    let info = json!({"totalSupply": 5000.0, "owner": "AdNeOwner", "paused": false});
    let (mock, facade) = native_facade(
        MockTransport::new()
            .on_get("/paprd/info", info)
            .on_get("/paprd/balance/AdNe1", json!({"address": "AdNe1", "balance": 42.0})),
    );

    assert_eq!(facade.total_supply().await.unwrap().total_supply, Some(5000.0));
    assert_eq!(facade.owner().await.unwrap().owner.as_deref(), Some("AdNeOwner"));
    assert_eq!(facade.is_paused().await.unwrap().paused, Some(false));
    assert_eq!(facade.balance("AdNe1").await.unwrap().balance, Some(42.0));
    assert_eq!(mock.request_count(), 4);
}

#[tokio::test]
async fn overview_settles_each_read_independently() {
    let (_, facade) = native_facade(
        MockTransport::new().on_get("/paprd/info", json!({"totalSupply": 1.0, "owner": "AdNeO"})),
    );

    let overview = facade.overview().await;
    assert_eq!(overview.total_supply.unwrap().total_supply, Some(1.0));
    assert_eq!(overview.owner.unwrap().owner.as_deref(), Some("AdNeO"));
    assert_eq!(overview.paused.unwrap().paused, None);
    assert!(overview.collateral_ratio.unwrap_err().is_unavailable());
}

// ============================================================================
// PAPRD: contract-call revision
// ============================================================================

#[tokio::test]
async fn contract_revision_routes_through_call_rpc() {
    let (mock, facade) = contract_facade(
        MockTransport::new().on_post("/contracts/call", json!({"success": true, "txId": "c-1"})),
    );

    let outcome = facade.burn(&wallet(), 3.0).await.unwrap();
    assert_eq!(outcome.tx_id.as_deref(), Some("c-1"));

    let request = &mock.requests()[0];
    assert_eq!(
        request.body,
        Some(json!({
            "contractId": "paprd_stablecoin",
            "function": "burn",
            "args": ["AdNeSender", 3.0],
            "privateKey": "sender-key"
        }))
    );
}

#[tokio::test]
async fn contract_revision_views_omit_key() {
    let (mock, facade) = contract_facade(
        MockTransport::new().on_post("/contracts/call", json!({"blacklisted": true})),
    );

    let status = facade.is_blacklisted("AdNeBad").await.unwrap();
    assert_eq!(status.blacklisted, Some(true));

    let body = mock.requests()[0].body.clone().unwrap();
    assert!(body.get("privateKey").is_none());
    assert_eq!(body["args"], json!(["AdNeBad"]));
}

#[tokio::test]
async fn contract_schema_rejects_before_submission() {
    let (mock, facade) = contract_facade(MockTransport::new());

    let err = facade.balance("").await.unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains("paprd_stablecoin.balance_of argument 0"));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn contract_revision_transfer_carries_request_id() {
    let (mock, facade) = contract_facade(
        MockTransport::new().on_post("/contracts/call", json!({"success": true})),
    );
    let request_id = RequestId::new();

    facade
        .transfer_with_request_id(&wallet(), "AdNeB", 2.0, &request_id)
        .await
        .unwrap();

    let request = &mock.requests()[0];
    assert_eq!(request.idempotency_key.as_deref(), Some(request_id.as_str()));
    assert_eq!(request.body.as_ref().unwrap()["function"], json!("transfer"));
}

#[tokio::test]
async fn every_operation_has_a_label_and_endpoint() {
    for op in PaprdOperation::ALL {
        assert!(op.label().starts_with("PAPRD "));
        assert!(op.endpoint().starts_with("/paprd/"));
    }
}
