// src/conversation.rs
use crate::completion::Turn;
use crate::models::chat::ChatMessage;

/// Reply used when the completion service answers without any text.
pub const NO_RESPONSE_REPLY: &str = "No response from chat bot";

/// Number of stored exchanges that fit in a window of `turns` turns.
/// Each exchange contributes one user turn and one model turn.
pub fn pairs_for_turns(turns: usize) -> usize {
    turns / 2
}

/// Flattens prior exchanges (oldest first) into alternating user/model turns
/// and appends the new user message.
pub fn build_turns(history: &[ChatMessage], message: &str) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(history.len() * 2 + 1);
    for exchange in history {
        turns.push(Turn::user(exchange.message.as_str()));
        turns.push(Turn::model(exchange.reply.as_str()));
    }
    turns.push(Turn::user(message));
    turns
}

pub fn reply_or_placeholder(reply: Option<String>) -> String {
    match reply {
        Some(text) if !text.trim().is_empty() => text,
        _ => NO_RESPONSE_REPLY.to_string(),
    }
}
