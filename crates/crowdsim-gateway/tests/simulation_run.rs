//! Turn loop behavior: turn counts, round-robin senders, persistence,
//! abort-on-model-failure.

use std::sync::Arc;
use std::time::Duration;

use crowdsim_gateway::test_support::{FixedModel, ScriptedModel};
use crowdsim_gateway::{
    DemographicBucket, ProductCost, RunError, SimulationRequest, SimulationRunner,
    SimulationStore, TraitValue,
};

fn request(counts: &[u32], number_of_turns: u32) -> SimulationRequest {
    SimulationRequest {
        demographics: counts
            .iter()
            .map(|&count| DemographicBucket {
                count,
                occupation: Some(TraitValue::One("teacher".to_string())),
                age_range: None,
                gender: None,
                income_range: None,
            })
            .collect(),
        number_of_turns,
        product_name: "SolarKettle".to_string(),
        product_description: "a kettle powered by sunlight".to_string(),
        product_cost: ProductCost::Integer(49),
        exposure_message: "Introducing the SolarKettle!".to_string(),
    }
}

fn runner(model: Arc<dyn crowdsim_gateway::CompletionModel>) -> (SimulationRunner, SimulationStore) {
    let store = SimulationStore::in_memory();
    let runner = SimulationRunner::new(model, store.clone(), Duration::ZERO);
    (runner, store)
}

#[tokio::test]
async fn executes_persona_count_times_turns_with_periodic_senders() {
    let model = Arc::new(FixedModel::new("Sounds useful.*60%*"));
    let (runner, store) = runner(model);

    let outcome = runner.run(request(&[3], 2)).await.expect("run completes");
    assert_eq!(outcome.conversation.len(), 6);
    let senders: Vec<&str> = outcome
        .conversation
        .iter()
        .map(|e| e.sender.as_str())
        .collect();
    assert_eq!(
        senders,
        ["Agent 1", "Agent 2", "Agent 3", "Agent 1", "Agent 2", "Agent 3"]
    );

    let messages = store
        .messages_for(&outcome.simulation.id)
        .await
        .expect("messages readable");
    assert_eq!(messages.len(), 6);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.turn, u32::try_from(i).unwrap() + 1);
        assert_eq!(message.purchase_likelihood, Some(60));
        assert_eq!(message.content, "Sounds useful.*60%*");
        assert_eq!(
            message.sender_details.occupation,
            Some(TraitValue::One("teacher".to_string()))
        );
    }
}

#[tokio::test]
async fn example_scenario_two_personas_one_round() {
    let model = Arc::new(FixedModel::new("Interesting.*40%*"));
    let (runner, _store) = runner(model);

    let outcome = runner.run(request(&[2], 1)).await.expect("run completes");
    let senders: Vec<&str> = outcome
        .conversation
        .iter()
        .map(|e| e.sender.as_str())
        .collect();
    assert_eq!(senders, ["Agent 1", "Agent 2"]);
}

#[tokio::test]
async fn model_failure_aborts_run_and_keeps_prior_messages() {
    // Fails at turn 3 of 4.
    let model = Arc::new(ScriptedModel::failing_after("Fine by me.*55%*", 2));
    let (runner, store) = runner(model);

    let error = runner
        .run(request(&[2], 2))
        .await
        .expect_err("run aborts on model failure");
    match error {
        RunError::Model { turn, .. } => assert_eq!(turn, 3),
        other => panic!("expected model error, got {other:?}"),
    }

    // The simulation record was saved first; exactly k-1 = 2 messages persist.
    let simulations = store.simulations().await.expect("simulations readable");
    assert_eq!(simulations.len(), 1);
    let messages = store
        .messages_for(&simulations[0].id)
        .await
        .expect("messages readable");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].turn, 1);
    assert_eq!(messages[1].turn, 2);
}

#[tokio::test]
async fn completion_without_percentage_stores_null_likelihood() {
    let model = Arc::new(FixedModel::new("Not sure how I feel about this."));
    let (runner, store) = runner(model);

    let outcome = runner.run(request(&[1], 1)).await.expect("run completes");
    let messages = store
        .messages_for(&outcome.simulation.id)
        .await
        .expect("messages readable");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].purchase_likelihood, None);
    assert_eq!(messages[0].content, "Not sure how I feel about this.");
}

#[tokio::test]
async fn empty_demographics_complete_with_no_turns() {
    let model = Arc::new(ScriptedModel::new(Vec::new()));
    let (runner, store) = runner(model);

    let outcome = runner.run(request(&[], 5)).await.expect("run completes");
    assert!(outcome.conversation.is_empty());
    let messages = store
        .messages_for(&outcome.simulation.id)
        .await
        .expect("messages readable");
    assert!(messages.is_empty());
}

#[tokio::test]
async fn raw_completion_is_stored_unmodified() {
    let model = Arc::new(FixedModel::new("  Great value! *85%* extra text  "));
    let (runner, store) = runner(model);

    let outcome = runner.run(request(&[1], 1)).await.expect("run completes");
    let messages = store
        .messages_for(&outcome.simulation.id)
        .await
        .expect("messages readable");
    assert_eq!(messages[0].content, "  Great value! *85%* extra text  ");
    assert_eq!(messages[0].purchase_likelihood, Some(85));
}
