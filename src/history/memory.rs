use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use tokio::sync::Mutex;

use crate::history::ConversationStore;
use crate::models::chat::Conversation;

/// In-process store for development and tests.
pub struct MemoryConversationStore {
    conversations: Mutex<HashMap<String, Conversation>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn load(
        &self,
        conversation_id: &str
    ) -> Result<Option<Conversation>, Box<dyn Error + Send + Sync>> {
        let conversations = self.conversations.lock().await;
        Ok(conversations.get(conversation_id).cloned())
    }

    async fn save(
        &self,
        conversation: &Conversation
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conversations = self.conversations.lock().await;
        conversations.insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::MessageType;

    #[tokio::test]
    async fn saves_and_loads_round_trip() {
        let store = MemoryConversationStore::new();
        let mut conv = Conversation::new("abc".to_string(), Some("en"));
        conv.push_message(MessageType::UserQuery, "Hi".to_string());
        store.save(&conv).await.unwrap();

        let loaded = store.load("abc").await.unwrap().expect("conversation");
        assert_eq!(loaded.title, "New conversation");
        assert_eq!(loaded.messages.len(), 1);
    }

    #[tokio::test]
    async fn missing_conversation_is_none() {
        let store = MemoryConversationStore::new();
        assert!(store.load("nope").await.unwrap().is_none());
    }
}
