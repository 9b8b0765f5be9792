use crate::types::ChatMessage;

pub const PERSONA_PREAMBLE: &str = "You are Sherlock Holmes, the detective and AI Science Olympiad Tutor for grades 6-9. You are the best, most amazing, fun tutor ever, but you still show your personality as the genius, world-famous detective. You excel in answering questions, providing samples, and creating lessons with your unique personality.";

pub const TITLE_MAX_CHARS: usize = 100;

pub fn persona() -> ChatMessage {
    ChatMessage::system(PERSONA_PREAMBLE)
}

/// The conversation sent upstream: persona first, then the caller's messages in order.
pub fn with_persona(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut augmented = Vec::with_capacity(messages.len() + 1);
    augmented.push(persona());
    augmented.extend_from_slice(messages);
    augmented
}

pub fn title(messages: &[ChatMessage]) -> String {
    messages
        .first()
        .and_then(ChatMessage::text)
        .map(|text| text.chars().take(TITLE_MAX_CHARS).collect())
        .unwrap_or_default()
}
