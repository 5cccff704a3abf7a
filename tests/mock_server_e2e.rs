use reqwest::StatusCode;
use serde_json::Value;
use threecommas_mock::{
    Bot, BotEvent, Deal, EntityStore, FaultInjector, InjectedFault, MockError, MockServer,
};

async fn get(server: &MockServer, path: &str) -> reqwest::Response {
    reqwest::get(format!("{}{}", server.url(), path))
        .await
        .expect("request to mock server failed")
}

#[tokio::test]
async fn test_basic_usage_end_to_end() {
    let server = MockServer::start().await.unwrap();
    let state = server.state();

    state.put_bot(Bot::new(1, "Test Bot", 12345, true));
    state
        .put_deal(1, Deal::new(101, 1, "USDT_BTC", "active"))
        .unwrap();
    state
        .append_message_event(101, "Placing base order. Price: 50000.0 USDT Size: 0.0002 BTC")
        .unwrap();

    let resp = get(&server, "/bots?scope=enabled").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bots: Vec<Bot> = resp.json().await.unwrap();
    assert_eq!(bots.len(), 1);
    assert_eq!(bots[0].id, 1);

    let resp = get(&server, "/deals/101/show").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"],
        "application/json",
        "deal responses should be JSON"
    );
    let deal: Deal = resp.json().await.unwrap();
    assert_eq!(deal.id, 101);
    assert_eq!(deal.events.len(), 1);
    assert_eq!(
        deal.events[0].message.as_deref(),
        Some("Placing base order. Price: 50000.0 USDT Size: 0.0002 BTC")
    );

    server.close().await;
}

#[tokio::test]
async fn test_list_bots_empty_and_scoped() {
    let server = MockServer::start().await.unwrap();

    let body: Value = get(&server, "/bots").await.json().await.unwrap();
    assert_eq!(body, Value::Array(vec![]), "empty list must be [] not null");

    server.state().put_bot(Bot::new(1, "Enabled Bot", 123, true));
    server.state().put_bot(Bot::new(2, "Disabled Bot", 123, false));

    let all: Vec<Bot> = get(&server, "/bots").await.json().await.unwrap();
    assert_eq!(all.len(), 2);

    let enabled: Vec<Bot> = get(&server, "/bots?scope=enabled").await.json().await.unwrap();
    assert_eq!(enabled.len(), 1);
    assert!(enabled[0].enabled);

    let disabled: Vec<Bot> = get(&server, "/bots?scope=disabled").await.json().await.unwrap();
    assert_eq!(disabled.len(), 1);
    assert_eq!(disabled[0].id, 2);

    server.close().await;
}

#[tokio::test]
async fn test_list_deals_filter_by_bot_and_scope() {
    let server = MockServer::start().await.unwrap();
    let state = server.state();

    state.put_bot(Bot::new(1, "Bot 1", 123, true));
    state.put_bot(Bot::new(2, "Bot 2", 123, true));
    state.put_deal(1, Deal::new(101, 1, "USDT_BTC", "active")).unwrap();
    state.put_deal(1, Deal::new(102, 1, "USDT_ETH", "completed")).unwrap();
    state.put_deal(2, Deal::new(103, 2, "USDT_BTC", "active")).unwrap();

    let deals: Vec<Deal> = get(&server, "/deals?bot_id=1").await.json().await.unwrap();
    assert_eq!(deals.len(), 2);
    assert!(deals.iter().all(|deal| deal.bot_id == 1));

    let deals: Vec<Deal> = get(&server, "/deals?scope=active").await.json().await.unwrap();
    assert_eq!(deals.len(), 2);

    let deals: Vec<Deal> = get(&server, "/deals?bot_id=1&scope=completed")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].id, 102);

    server.close().await;
}

#[tokio::test]
async fn test_get_deal_not_found() {
    let server = MockServer::start().await.unwrap();

    let resp = get(&server, "/deals/999/show").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "deal not found");

    server.close().await;
}

#[tokio::test]
async fn test_rate_limit_then_clear() {
    let server = MockServer::start().await.unwrap();
    server.state().put_bot(Bot::new(1, "Test Bot", 123, true));
    server.state().set_rate_limit(true, 60);

    let resp = get(&server, "/bots").await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers()["retry-after"], "60");
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "rate limit exceeded");
    assert!(body["error_description"].is_string());

    // Only list bots is throttled
    let resp = get(&server, "/deals").await;
    assert_eq!(resp.status(), StatusCode::OK);

    server.state().clear_all();

    let resp = get(&server, "/bots").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bots: Vec<Bot> = resp.json().await.unwrap();
    assert_eq!(bots.len(), 1);

    server.close().await;
}

#[tokio::test]
async fn test_rate_limit_without_retry_value_omits_header() {
    let server = MockServer::start().await.unwrap();
    server.state().set_rate_limit(true, 0);

    let resp = get(&server, "/bots").await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().get("retry-after").is_none());

    server.close().await;
}

#[tokio::test]
async fn test_forced_deal_error() {
    let server = MockServer::start().await.unwrap();
    let state = server.state();
    state.put_bot(Bot::new(1, "Test Bot", 123, true));
    state.put_deal(1, Deal::new(101, 1, "USDT_BTC", "active")).unwrap();
    state.set_deal_error(101, InjectedFault::internal("exchange unavailable"));

    let resp = get(&server, "/deals/101/show").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "exchange unavailable");

    // Configured for a deal that does not exist: still 500, not 404
    state.set_deal_error(555, InjectedFault::internal("boom"));
    let resp = get(&server, "/deals/555/show").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    state.clear_all();
    let resp = get(&server, "/deals/101/show").await;
    assert_eq!(resp.status(), StatusCode::OK);

    server.close().await;
}

#[tokio::test]
async fn test_reset_clears_state_and_throttling() {
    let server = MockServer::start().await.unwrap();
    let state = server.state();

    state.put_bot(Bot::new(1, "Test Bot", 123, true));
    state.put_deal(1, Deal::new(101, 1, "USDT_BTC", "active")).unwrap();
    state.set_rate_limit(true, 60);

    state.reset();

    assert!(state.list_bots().is_empty());
    assert!(state.list_deals().is_empty());

    let resp = get(&server, "/bots").await;
    assert_eq!(resp.status(), StatusCode::OK);

    server.close().await;
}

#[tokio::test]
async fn test_state_mutations_show_up_over_http() {
    let server = MockServer::start().await.unwrap();
    let state = server.state();

    state.put_bot(Bot::new(1, "Test Bot", 123, true));
    state.put_deal(1, Deal::new(101, 1, "USDT_BTC", "active")).unwrap();

    state.update_bot_enabled(1, false).unwrap();
    let enabled: Vec<Bot> = get(&server, "/bots?scope=enabled").await.json().await.unwrap();
    assert!(enabled.is_empty());

    state.update_deal_status(101, "completed").unwrap();
    let safety = BotEvent::message("Placing safety order. Price: 48750.0 USDT Size: 0.0004 BTC");
    let take_profit =
        BotEvent::message("Placing TakeProfit trade. Price: 50500.0 USDT Size: 0.0006 BTC");
    state.append_event(101, safety).unwrap();
    state.append_event(101, take_profit).unwrap();

    let deal: Deal = get(&server, "/deals/101/show").await.json().await.unwrap();
    assert_eq!(deal.status, "completed");
    assert_eq!(deal.events.len(), 2);
    assert_eq!(
        deal.events[1].message.as_deref(),
        Some("Placing TakeProfit trade. Price: 50500.0 USDT Size: 0.0006 BTC")
    );

    state.remove_bot(1);
    let resp = get(&server, "/deals/101/show").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    server.close().await;
}

#[tokio::test]
async fn test_add_deal_for_unknown_bot_fails() {
    let server = MockServer::start().await.unwrap();

    let err = server
        .state()
        .put_deal(42, Deal::new(101, 42, "USDT_BTC", "active"))
        .unwrap_err();

    assert!(matches!(err, MockError::NotFound { id: 42, .. }));
    let deals: Vec<Deal> = get(&server, "/deals").await.json().await.unwrap();
    assert!(deals.is_empty());

    server.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_during_mutation() {
    let server = MockServer::start().await.unwrap();
    for id in 1..=5 {
        server.state().put_bot(Bot::new(id, "bot", 1, id % 2 == 0));
    }

    let base = server.url();
    let requests: Vec<_> = (0..20)
        .map(|n| {
            let url = if n % 2 == 0 {
                format!("{}/bots", base)
            } else {
                format!("{}/deals", base)
            };
            tokio::spawn(async move { reqwest::get(url).await.map(|r| r.status()) })
        })
        .collect();

    for id in 1..=5 {
        server
            .state()
            .put_deal(id, Deal::new(id * 100, id, "USDT_BTC", "active"))
            .unwrap();
    }

    for request in requests {
        assert_eq!(request.await.unwrap().unwrap(), StatusCode::OK);
    }

    server.close().await;
}
