use async_trait::async_trait;
use redis::{ AsyncCommands, Client };
use std::error::Error;

use crate::cli::Args;
use crate::history::ConversationStore;
use crate::models::chat::Conversation;

/// Stores each conversation as a single JSON document under a prefixed key.
pub struct RedisConversationStore {
    client: Client,
    key_prefix: String,
}

impl RedisConversationStore {
    pub fn new(args: Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self {
            client: Client::open(args.history_host.as_str())?,
            key_prefix: args.history_redis_prefix,
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    fn key_for(&self, conversation_id: &str) -> String {
        format!("{}{}", self.key_prefix, conversation_id)
    }
}

#[async_trait]
impl ConversationStore for RedisConversationStore {
    async fn load(
        &self,
        conversation_id: &str
    ) -> Result<Option<Conversation>, Box<dyn Error + Send + Sync>> {
        let mut conn = self.get_connection().await?;
        let raw: Option<String> = conn.get(self.key_for(conversation_id)).await?;
        match raw {
            Some(json) => {
                let conversation: Conversation = serde_json::from_str(&json)?;
                Ok(Some(conversation))
            }
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        conversation: &Conversation
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conn = self.get_connection().await?;
        let json = serde_json::to_string(conversation)?;
        let _: () = conn.set(self.key_for(&conversation.id), json).await?;
        Ok(())
    }
}
