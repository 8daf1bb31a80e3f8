//! Turn prompt construction: scenario framing, transcript, speaker cue.
//!
//! Pure string formatting with no error conditions. The output format
//! contract (asterisk-wrapped percentage, 40-word cap) is what the
//! likelihood extractor later parses back out of the completion.

use std::fmt::Write as _;

use crate::persona::Persona;
use crate::simulation::{ConversationEntry, SimulationRequest};

/// Literal used in place of the transcript before anyone has spoken.
pub const EMPTY_TRANSCRIPT_PLACEHOLDER: &str = "No conversation yet";

fn render_transcript(history: &[ConversationEntry]) -> String {
    if history.is_empty() {
        return EMPTY_TRANSCRIPT_PLACEHOLDER.to_string();
    }
    history
        .iter()
        .map(|entry| format!("{}: {}", entry.sender, entry.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the full prompt for one turn. Always contains the product name, the
/// product cost, and the speaker's name verbatim.
pub fn build_turn_prompt(
    request: &SimulationRequest,
    history: &[ConversationEntry],
    speaker: &Persona,
) -> String {
    let mut context = format!(
        "You are simulating a society reacting to a new product: {} ({}, cost: ${}). \
         The initial message was: \"{}\". Here's the current conversation:\n{}\n",
        request.product_name,
        request.product_description,
        request.product_cost,
        request.exposure_message,
        render_transcript(history),
    );
    let _ = write!(
        context,
        "The next person to speak is {}. This persona's traits are: {}.",
        speaker.name,
        speaker.traits.render(),
    );
    context.push_str(
        " Think according to this persona's interests and either contribute something new \
         to the chat or agree or argue with previous messages. Do not repeat any message. \
         Entire response must put value to the conversation and be human-like, not a single \
         phrase should be said that suggests the response is generated by an AI. Respond in \
         no more than 40 words, and also estimate the likelihood (in percentage) of this \
         persona buying the product based on their message, enclosed within asterisks \
         (e.g., *50%*); don't include \"** **\", \"\\n\" or any unnecessary characters \
         anywhere in your response.",
    );
    format!("{context}\n\n{} is about to speak.", speaker.name)
}
