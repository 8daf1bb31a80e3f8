//! Prompt builder contract: required fragments, transcript rendering, cue.

use crowdsim_gateway::{
    ConversationEntry, DemographicBucket, EMPTY_TRANSCRIPT_PLACEHOLDER, ProductCost,
    SimulationRequest, TraitValue, build_turn_prompt, generate_personas,
};

fn request() -> SimulationRequest {
    SimulationRequest {
        demographics: vec![DemographicBucket {
            count: 1,
            occupation: Some(TraitValue::One("teacher".to_string())),
            age_range: Some(TraitValue::One("30-40".to_string())),
            gender: None,
            income_range: None,
        }],
        number_of_turns: 1,
        product_name: "SolarKettle".to_string(),
        product_description: "a kettle powered by sunlight".to_string(),
        product_cost: ProductCost::Integer(49),
        exposure_message: "Introducing the SolarKettle!".to_string(),
    }
}

#[test]
fn prompt_contains_product_cost_and_speaker_verbatim() {
    let request = request();
    let personas = generate_personas(&request.demographics);
    let prompt = build_turn_prompt(&request, &[], &personas[0]);

    assert!(prompt.contains("SolarKettle"));
    assert!(prompt.contains("cost: $49"));
    assert!(prompt.contains("Agent 1"));
    assert!(prompt.contains("Introducing the SolarKettle!"));
    assert!(prompt.ends_with("Agent 1 is about to speak."));
}

#[test]
fn empty_transcript_uses_placeholder() {
    let request = request();
    let personas = generate_personas(&request.demographics);
    let prompt = build_turn_prompt(&request, &[], &personas[0]);
    assert!(prompt.contains(EMPTY_TRANSCRIPT_PLACEHOLDER));
}

#[test]
fn transcript_renders_sender_content_lines() {
    let request = request();
    let personas = generate_personas(&request.demographics);
    let history = vec![
        ConversationEntry {
            sender: "Agent 1".to_string(),
            content: "Looks handy.*60%*".to_string(),
        },
        ConversationEntry {
            sender: "Agent 2".to_string(),
            content: "Too pricey.*20%*".to_string(),
        },
    ];
    let prompt = build_turn_prompt(&request, &history, &personas[0]);
    assert!(prompt.contains("Agent 1: Looks handy.*60%*\nAgent 2: Too pricey.*20%*"));
    assert!(!prompt.contains(EMPTY_TRANSCRIPT_PLACEHOLDER));
}

#[test]
fn speaker_traits_render_in_prompt() {
    let request = request();
    let personas = generate_personas(&request.demographics);
    let prompt = build_turn_prompt(&request, &[], &personas[0]);
    assert!(prompt.contains("This persona's traits are: occupation: teacher. ageRange: 30-40."));
}

#[test]
fn fixed_instruction_block_demands_asterisk_percentage() {
    let request = request();
    let personas = generate_personas(&request.demographics);
    let prompt = build_turn_prompt(&request, &[], &personas[0]);
    assert!(prompt.contains("no more than 40 words"));
    assert!(prompt.contains("*50%*"));
    assert!(prompt.contains("Do not repeat any message."));
}

#[test]
fn string_cost_renders_verbatim() {
    let mut request = request();
    request.product_cost = ProductCost::Text("19.99".to_string());
    let personas = generate_personas(&request.demographics);
    let prompt = build_turn_prompt(&request, &[], &personas[0]);
    assert!(prompt.contains("cost: $19.99"));
}
