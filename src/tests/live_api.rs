// Live mode against a mocked carrier API: credential exchange, token reuse
// and propagation of carrier errors to the caller.

#[cfg(test)]
mod test {

    use httpmock::prelude::*;
    use reqwest::StatusCode;

    use crate::tests::common::{build_reqwest_client, json, spawn_live, Value};
    use crate::upstream::exchange::TOKEN_PATH;

    const ORDER: &str = r#"{
        "number": "SHOP-7",
        "tariff_code": 136,
        "recipient": {"name": "Иван", "phones": [{"number": "+79990000000"}]},
        "to_location": {"code": 44, "address": "ул. Тверская, д. 1"},
        "packages": [{"number": "1", "weight": 500}]
    }"#;

    fn order() -> Value {
        serde_json::from_str(ORDER).unwrap()
    }

    #[tokio::test]
    async fn rejected_credentials_surface_as_auth_unavailable() {
        let server = MockServer::start_async().await;
        let token = server
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(400).json_body(json!({"error": "invalid_client"}));
            })
            .await;
        let cities = server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/location/cities");
                then.status(200).json_body(json!([]));
            })
            .await;

        let (_h, base) = spawn_live(&server.base_url(), false).await;
        let resp = build_reqwest_client()
            .get(format!("{}/locations/search?name=Казань", base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "auth_unavailable");
        assert_eq!(body["upstream_status"], 400);

        token.assert_calls_async(1).await;
        cities.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn one_exchange_serves_many_requests() {
        let server = MockServer::start_async().await;
        let token = server
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(200)
                    .json_body(json!({"access_token": "live-token", "token_type": "bearer", "expires_in": 3600}));
            })
            .await;
        let cities = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/location/cities")
                    .header("authorization", "Bearer live-token");
                then.status(200).json_body(json!([{"code": 44, "city": "Москва"}]));
            })
            .await;
        let points = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/deliverypoints")
                    .query_param("city_code", "44")
                    .header("authorization", "Bearer live-token");
                then.status(200).json_body(json!([{"code": "MSK1"}]));
            })
            .await;

        let (_h, base) = spawn_live(&server.base_url(), false).await;
        let client = build_reqwest_client();
        for _ in 0..3 {
            let body: Value = client
                .get(format!("{}/locations/search?name=Мос", base))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert_eq!(body, json!({"data": [{"code": 44, "city": "Москва"}], "meta": {"total": 1}}));
        }
        let body: Value = client
            .get(format!("{}/pickup-points?location_code=44", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["meta"]["total"], 1);

        token.assert_calls_async(1).await;
        cities.assert_calls_async(3).await;
        points.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn invalid_order_never_reaches_the_carrier() {
        let server = MockServer::start_async().await;
        let token = server
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(200).json_body(json!({"access_token": "t", "expires_in": 3600}));
            })
            .await;
        let orders = server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/orders");
                then.status(202).json_body(json!({"entity": {"uuid": "x"}}));
            })
            .await;

        let (_h, base) = spawn_live(&server.base_url(), false).await;
        let resp = build_reqwest_client()
            .post(format!("{}/orders", base))
            .json(&json!({"number": "SHOP-7"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["fields"], json!(["recipient", "to_location", "packages"]));

        token.assert_calls_async(0).await;
        orders.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn order_is_forwarded_verbatim_and_rejections_propagate() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(200).json_body(json!({"access_token": "t", "expires_in": 3600}));
            })
            .await;
        let rejected = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v2/orders")
                    .body_includes(r#""address":"ул. Тверская, д. 1""#);
                then.status(400).json_body(json!({
                    "requests": [{"state": "INVALID", "errors": [{"code": "v2_field_is_empty", "message": "from_location"}]}]
                }));
            })
            .await;

        let (_h, base) = spawn_live(&server.base_url(), false).await;
        let resp = build_reqwest_client()
            .post(format!("{}/orders", base))
            .json(&order())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["requests"][0]["errors"][0]["code"], "v2_field_is_empty");
        rejected.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(200).json_body(json!({"access_token": "t", "expires_in": 3600}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/orders/no-such-order");
                then.status(404).json_body(json!({"requests": [{"state": "INVALID"}]}));
            })
            .await;

        let (_h, base) = spawn_live(&server.base_url(), false).await;
        let resp = build_reqwest_client()
            .get(format!("{}/orders/no-such-order/status", base))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn encoded_traversal_in_order_id_is_rejected() {
        let server = MockServer::start_async().await;
        let token = server
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(200).json_body(json!({"access_token": "t", "expires_in": 3600}));
            })
            .await;
        let webhooks = server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/webhooks");
                then.status(200).json_body(json!([{"uuid": "hook"}]));
            })
            .await;

        let (_h, base) = spawn_live(&server.base_url(), false).await;
        let client = build_reqwest_client();
        for id in ["%2E%2E%2Fwebhooks", "x%3Fcdek_number%3D1", "x%23frag"] {
            let resp = client
                .get(format!("{}/orders/{}/status", base, id))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", id);
            let body: Value = resp.json().await.unwrap();
            assert_eq!(body["fields"], json!(["id"]));
        }
        webhooks.assert_calls_async(0).await;
        token.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn auth_returns_cached_credential() {
        let server = MockServer::start_async().await;
        let token = server
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(200).json_body(json!({"access_token": "live-token", "expires_in": 3600}));
            })
            .await;

        let (_h, base) = spawn_live(&server.base_url(), false).await;
        let client = build_reqwest_client();
        for _ in 0..2 {
            let body: Value = client
                .post(format!("{}/auth", base))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert_eq!(body["access_token"], "live-token");
            assert_eq!(body["token_type"], "bearer");
            let expires_in = body["expires_in"].as_u64().unwrap();
            assert!(expires_in > 3500 && expires_in <= 3600);
        }
        token.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn forwarded_client_token_bypasses_cache() {
        let server = MockServer::start_async().await;
        let token = server
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(200).json_body(json!({"access_token": "server-token", "expires_in": 3600}));
            })
            .await;
        let with_client = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/orders/abc")
                    .header("authorization", "Bearer client-token");
                then.status(200).json_body(json!({"entity": {"uuid": "abc", "statuses": [{"code": "ACCEPTED"}]}}));
            })
            .await;

        let (_h, base) = spawn_live(&server.base_url(), true).await;
        let body: Value = build_reqwest_client()
            .get(format!("{}/orders/abc/status", base))
            .bearer_auth("client-token")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["entity"]["status"], "ACCEPTED");
        with_client.assert_calls_async(1).await;
        token.assert_calls_async(0).await;
    }
}
