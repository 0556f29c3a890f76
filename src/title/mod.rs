pub mod generator;

use chrono::{ DateTime, Utc };
use log::warn;

use crate::locale::{
    generic_title,
    is_placeholder_title,
    normalize_language,
    LanguageCode,
};
use crate::models::chat::{ Conversation, Message, MessageType };
use self::generator::{ TitleGenerator, TranscriptMessage, TranscriptRole };

/// Transcript cap; bounds both payload size and token cost of a title call.
pub const MAX_TRANSCRIPT_MESSAGES: usize = 8;
/// Per-message content cap applied after whitespace collapsing.
pub const MAX_MESSAGE_CHARS: usize = 400;
/// Hard cap on the stored title.
pub const MAX_TITLE_CHARS: usize = 60;
/// Token budget handed to the AI backend for the title completion.
pub const TITLE_MAX_TOKENS: u32 = 40;

/// Decides whether a fresh AI title attempt is due. Pure; also usable from
/// read paths that want to show a "title pending" hint.
///
/// Three gates, all required:
/// 1. the title was never manually set (a human edit is permanent),
/// 2. the current title is empty or still a placeholder,
/// 3. the history holds at least one user query and one assistant-side
///    response, in any order.
pub fn should_generate_title(conversation: &Conversation) -> bool {
    if conversation.title_manually_set {
        return false;
    }

    let language = normalize_language(conversation.title_language.as_deref());
    if
        !conversation.title.trim().is_empty() &&
        !is_placeholder_title(&conversation.title, language)
    {
        return false;
    }

    let mut has_user_query = false;
    let mut has_assistant_response = false;
    for msg in &conversation.messages {
        if msg.message_type == MessageType::UserQuery {
            has_user_query = true;
        } else if msg.message_type.is_assistant_response() {
            has_assistant_response = true;
        }
        if has_user_query && has_assistant_response {
            return true;
        }
    }
    false
}

/// Result of a successful generation attempt, applied to the conversation
/// by the caller at the entry point rather than mutated from inside the
/// decision logic.
#[derive(Clone, Debug)]
pub struct TitleUpdate {
    pub title: String,
    pub title_language: LanguageCode,
    pub generated_at: DateTime<Utc>,
}

/// Single entry point for conversation-turn handlers. Consults the
/// eligibility gates, builds a bounded transcript, asks the backend for a
/// title, and merges the sanitized result into `conversation`. Every
/// failure path resolves to `None` with the conversation's title left
/// untouched; nothing escapes as an error to the parent request.
///
/// `forward_headers` carries request-scoped headers (auth context from the
/// inbound request) through to the transport.
pub async fn maybe_generate_conversation_title(
    conversation: &mut Conversation,
    generator: &dyn TitleGenerator,
    forward_headers: &[(String, String)],
    request_id: Option<&str>
) -> Option<String> {
    if !should_generate_title(conversation) {
        return None;
    }

    let language = normalize_language(conversation.title_language.as_deref());
    conversation.title_language = Some(language.as_str().to_string());

    let update = request_title(
        &conversation.id,
        language,
        &conversation.messages,
        generator,
        forward_headers,
        request_id
    ).await?;

    conversation.title = update.title.clone();
    conversation.title_generated_at = Some(update.generated_at);
    Some(update.title)
}

/// The generation attempt itself, separated from conversation mutation.
async fn request_title(
    conversation_id: &str,
    language: LanguageCode,
    messages: &[Message],
    generator: &dyn TitleGenerator,
    forward_headers: &[(String, String)],
    request_id: Option<&str>
) -> Option<TitleUpdate> {
    let transcript = build_transcript(messages);
    if transcript.is_empty() {
        return None;
    }

    let response = match generator.generate(language, &transcript, forward_headers).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(
                "Title generation failed for conversation {} (request {}): {}",
                conversation_id,
                request_id.unwrap_or("-"),
                e
            );
            return None;
        }
    };

    let raw = match response.title {
        Some(t) => t,
        None => {
            warn!(
                "Title endpoint returned no title for conversation {} (request {})",
                conversation_id,
                request_id.unwrap_or("-")
            );
            return None;
        }
    };

    let mut title = sanitize_title(&raw);
    if title.is_empty() || is_placeholder_title(&title, language) {
        // A generic fallback beats keeping the placeholder.
        title = generic_title(language).to_string();
    }
    if title.trim().is_empty() {
        return None;
    }

    let title = truncate_chars(&title, MAX_TITLE_CHARS).trim().to_string();
    Some(TitleUpdate {
        title,
        title_language: language,
        generated_at: Utc::now(),
    })
}

/// Chronological transcript of the first `MAX_TRANSCRIPT_MESSAGES`
/// qualifying messages. Only user queries and assistant-side responses
/// qualify; content is whitespace-collapsed and capped per message, and
/// entries that sanitize to nothing are dropped.
pub fn build_transcript(messages: &[Message]) -> Vec<TranscriptMessage> {
    let mut transcript = Vec::new();
    for msg in messages {
        let role = if msg.message_type == MessageType::UserQuery {
            TranscriptRole::User
        } else if msg.message_type.is_assistant_response() {
            TranscriptRole::Assistant
        } else {
            continue;
        };

        let content = sanitize_content(&msg.content);
        if content.is_empty() {
            continue;
        }

        transcript.push(TranscriptMessage { role, content });
        if transcript.len() >= MAX_TRANSCRIPT_MESSAGES {
            break;
        }
    }
    transcript
}

fn sanitize_content(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, MAX_MESSAGE_CHARS)
}

fn sanitize_title(raw: &str) -> String {
    let unbroken = raw.replace(['\r', '\n'], " ");
    unbroken
        .trim()
        .trim_matches(|c| {
            matches!(c, '"' | '\'' | '`' | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}')
        })
        .trim()
        .to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
