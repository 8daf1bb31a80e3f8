//! HTTP gateway integration tests: routing, response shape, error contract.
//! Uses scripted models and the in-memory store so no external services are
//! required.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::body::to_bytes;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use crowdsim_gateway::test_support::{FixedModel, ScriptedModel};
use crowdsim_gateway::{
    CompletionModel, MODEL_ERROR_MESSAGE, SimulationRunner, SimulationStore, router,
};

fn app_with(model: Arc<dyn CompletionModel>) -> (axum::Router, SimulationStore) {
    let store = SimulationStore::in_memory();
    let runner = SimulationRunner::new(model, store.clone(), Duration::ZERO);
    (router(runner, "test-model"), store)
}

fn request_body() -> String {
    serde_json::json!({
        "demographics": [{"count": 2, "occupation": "teacher"}],
        "numberOfTurns": 1,
        "productName": "SolarKettle",
        "productDescription": "a kettle powered by sunlight",
        "productCost": 49,
        "exposureMessage": "Introducing the SolarKettle!"
    })
    .to_string()
}

#[tokio::test]
async fn gateway_returns_404_for_unknown_route() {
    let (app, _store) = app_with(Arc::new(FixedModel::new("ok.*10%*")));

    let response = app
        .oneshot(Request::get("/unknown").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gateway_health_reports_model_and_backend() {
    let (app, _store) = app_with(Arc::new(FixedModel::new("ok.*10%*")));

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(
        payload.get("status").and_then(Value::as_str),
        Some("healthy")
    );
    assert_eq!(
        payload.get("model").and_then(Value::as_str),
        Some("test-model")
    );
    assert_eq!(
        payload.get("store_backend").and_then(Value::as_str),
        Some("memory")
    );
    assert_eq!(
        payload.get("turn_delay_ms").and_then(Value::as_u64),
        Some(0)
    );
}

#[tokio::test]
async fn malformed_body_returns_500_with_error_field() {
    let (app, _store) = app_with(Arc::new(FixedModel::new("ok.*10%*")));

    let response = app
        .oneshot(
            Request::post("/simulation")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&bytes).expect("json body");
    assert!(payload.get("error").and_then(Value::as_str).is_some());
}

#[tokio::test]
async fn full_run_returns_completed_conversation() {
    let (app, store) = app_with(Arc::new(FixedModel::new("Count me in.*75%*")));

    let response = app
        .oneshot(
            Request::post("/simulation")
                .header("content-type", "application/json")
                .body(Body::from(request_body()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&bytes).expect("json body");

    assert_eq!(
        payload.get("status").and_then(Value::as_str),
        Some("completed")
    );
    let simulation = payload.get("simulation").expect("simulation echoed");
    assert!(simulation.get("id").and_then(Value::as_str).is_some());
    assert_eq!(
        simulation.get("numberOfTurns").and_then(Value::as_u64),
        Some(1)
    );

    let conversation = payload
        .get("conversation")
        .and_then(Value::as_array)
        .expect("conversation array");
    let senders: Vec<&str> = conversation
        .iter()
        .filter_map(|entry| entry.get("sender").and_then(Value::as_str))
        .collect();
    assert_eq!(senders, ["Agent 1", "Agent 2"]);

    let simulation_id = simulation
        .get("id")
        .and_then(Value::as_str)
        .expect("simulation id");
    let messages = store.messages_for(simulation_id).await.expect("messages");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].purchase_likelihood, Some(75));
}

#[tokio::test]
async fn model_failure_returns_fixed_error_payload() {
    // Two personas, one round: fail on the second turn.
    let (app, store) = app_with(Arc::new(ScriptedModel::failing_after("Neat.*30%*", 1)));

    let response = app
        .oneshot(
            Request::post("/simulation")
                .header("content-type", "application/json")
                .body(Body::from(request_body()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(
        payload.get("error").and_then(Value::as_str),
        Some(MODEL_ERROR_MESSAGE)
    );

    // Exactly one message (turn 1) was persisted before the abort.
    let simulations = store.simulations().await.expect("simulations");
    assert_eq!(simulations.len(), 1);
    let messages = store
        .messages_for(&simulations[0].id)
        .await
        .expect("messages");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].turn, 1);
}
