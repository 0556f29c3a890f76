use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };

use crate::locale::{ normalize_language, placeholder_title };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    UserQuery,
    BotResponse,
    Error,
    Feedback,
    System,
    Clarification,
    ResearchPlan,
}

impl MessageType {
    /// True for the assistant-side types that count toward title readiness.
    pub fn is_assistant_response(&self) -> bool {
        matches!(
            self,
            MessageType::BotResponse | MessageType::ResearchPlan | MessageType::Clarification
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message_type: MessageType,
    pub content: String,
    pub timestamp: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_language: Option<String>,
    #[serde(default)]
    pub title_manually_set: bool,
    #[serde(default)]
    pub title_generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// New conversation carrying the localized placeholder title.
    pub fn new(id: String, language: Option<&str>) -> Self {
        let lang = normalize_language(language);
        Self {
            id,
            title: placeholder_title(lang).to_string(),
            title_language: Some(lang.as_str().to_string()),
            title_manually_set: false,
            title_generated_at: None,
            messages: Vec::new(),
        }
    }

    pub fn push_message(&mut self, message_type: MessageType, content: String) {
        self.messages.push(Message {
            message_type,
            content,
            timestamp: Utc::now().timestamp(),
        });
    }
}
