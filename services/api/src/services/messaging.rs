//! Direct messages between two users

use chrono::Utc;
use common::store::Storage;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult, require, user_not_found};
use crate::models::{
    collections,
    messaging::{Conversation, ConversationBook, Message},
    user::UserBook,
};

#[derive(Clone)]
pub struct MessagingService {
    storage: Storage,
}

impl MessagingService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Append a message to the conversation between sender and recipient
    ///
    /// `conversation_id` names the conversation only when it is first
    /// created; later messages join the existing conversation for the pair.
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        content: &str,
        conversation_id: Option<String>,
    ) -> ServiceResult<Message> {
        require(content, "Message content is required")?;
        if sender_id == recipient_id {
            return Err(ServiceError::Validation(
                "Cannot send a message to yourself".to_string(),
            ));
        }

        let users: UserBook = self.storage.load(collections::USERS).await?;
        if users.find_by_id(sender_id).is_none() || users.find_by_id(recipient_id).is_none() {
            return Err(user_not_found());
        }

        let message = Message {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            content: content.to_string(),
            timestamp: Utc::now(),
            read: false,
        };

        let _lock = self.storage.lock([collections::CONVERSATIONS]).await;
        let mut book: ConversationBook = self.storage.load(collections::CONVERSATIONS).await?;
        let conversation = book.open(sender_id, recipient_id, conversation_id);
        conversation.messages.push(message.clone());
        conversation.last_activity = message.timestamp;
        let conversation_id = conversation.id.clone();
        self.storage.save(collections::CONVERSATIONS, &book).await?;

        info!(
            "User {} messaged user {} in conversation {}",
            sender_id, recipient_id, conversation_id
        );
        Ok(message)
    }

    /// Conversations a user takes part in, most recently active first
    pub async fn conversations(&self, user_id: Uuid) -> ServiceResult<Vec<Conversation>> {
        let book: ConversationBook = self.storage.load(collections::CONVERSATIONS).await?;
        Ok(book.view_for(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        UserService,
        test_support::{passwords, storage},
    };

    async fn setup() -> (MessagingService, Uuid, Uuid, Uuid) {
        let storage = storage();
        let users = UserService::new(storage.clone(), passwords());
        let a = users.register("a", "a@example.com", "pw").await.unwrap().id;
        let b = users.register("b", "b@example.com", "pw").await.unwrap().id;
        let c = users.register("c", "c@example.com", "pw").await.unwrap().id;
        (MessagingService::new(storage), a, b, c)
    }

    #[tokio::test]
    async fn test_both_participants_see_the_same_conversation() {
        let (messaging, a, b, _) = setup().await;

        messaging
            .send_message(a, b, "hi", Some("chat-ab".to_string()))
            .await
            .unwrap();
        messaging
            .send_message(b, a, "hello back", Some("ignored".to_string()))
            .await
            .unwrap();

        let for_a = messaging.conversations(a).await.unwrap();
        let for_b = messaging.conversations(b).await.unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].id, "chat-ab");
        assert_eq!(for_a[0].messages.len(), 2);
        assert_eq!(for_a[0].messages[1].content, "hello back");
        assert_eq!(for_b[0].messages.len(), 2);
        assert_eq!(for_a[0].last_activity, for_a[0].messages[1].timestamp);
    }

    #[tokio::test]
    async fn test_views_are_ordered_by_activity() {
        let (messaging, a, b, c) = setup().await;

        messaging.send_message(a, b, "first", None).await.unwrap();
        messaging.send_message(a, c, "second", None).await.unwrap();

        let for_a = messaging.conversations(a).await.unwrap();
        assert_eq!(for_a.len(), 2);
        assert!(for_a[0].includes(c));
        assert_eq!(messaging.conversations(b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_empty_self_and_unknown() {
        let (messaging, a, b, _) = setup().await;

        assert!(matches!(
            messaging.send_message(a, b, "  ", None).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            messaging.send_message(a, a, "echo", None).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            messaging.send_message(a, Uuid::new_v4(), "hey", None).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
