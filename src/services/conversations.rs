// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Direct messages with live delivery over SSE.

use crate::db::Database;
use crate::error::AppError;
use crate::models::conversation::{Conversation, ConversationResponse, Message};
use crate::models::cursor::{Page, PageRequest};
use crate::models::notification::NotificationKind;
use crate::models::user::UserSummary;
use crate::services::notifications::NotificationService;
use crate::services::sse::{PushEvent, SseRegistry, Subscription};
use serde_json::json;
use std::sync::Arc;

pub const MESSAGE_EVENT: &str = "message";

#[derive(Clone)]
pub struct ConversationService {
    db: Database,
    notifications: NotificationService,
    registry: Arc<SseRegistry>,
}

impl ConversationService {
    pub fn new(db: Database, notifications: NotificationService) -> Self {
        Self {
            db,
            notifications,
            registry: SseRegistry::new(),
        }
    }

    /// Conversation with `other_id`, created on first use.
    pub async fn open(
        &self,
        user_id: i64,
        other_id: i64,
    ) -> Result<ConversationResponse, AppError> {
        if user_id == other_id {
            return Err(AppError::BadRequest(
                "Cannot start a conversation with yourself".to_string(),
            ));
        }
        if self.db.get_active_user(other_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if self.db.is_blocked_either_way(user_id, other_id).await? {
            return Err(AppError::Forbidden("User is blocked".to_string()));
        }

        let conversation = self.db.get_or_create_conversation(user_id, other_id).await?;
        self.to_response(user_id, conversation).await
    }

    /// The caller's conversations, most recently active first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<ConversationResponse>, AppError> {
        let conversations = self.db.list_conversations(user_id).await?;
        let mut responses = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            responses.push(self.to_response(user_id, conversation).await?);
        }
        Ok(responses)
    }

    pub async fn messages(
        &self,
        user_id: i64,
        conversation_id: i64,
        page: &PageRequest,
    ) -> Result<Page<Message>, AppError> {
        self.participant_conversation(user_id, conversation_id)
            .await?;
        let rows = self.db.list_messages(conversation_id, page).await?;
        Ok(Page::from_rows(rows, page))
    }

    /// Store a message, push it to both participants and notify the recipient.
    pub async fn send(
        &self,
        user_id: i64,
        conversation_id: i64,
        body: &str,
    ) -> Result<Message, AppError> {
        let conversation = self
            .participant_conversation(user_id, conversation_id)
            .await?;
        let recipient_id = conversation.other_participant(user_id);

        if self.db.is_blocked_either_way(user_id, recipient_id).await? {
            return Err(AppError::Forbidden("User is blocked".to_string()));
        }

        let message = self.db.insert_message(conversation_id, user_id, body).await?;

        match serde_json::to_value(&message) {
            Ok(data) => {
                for participant in [user_id, recipient_id] {
                    self.registry
                        .publish(participant, PushEvent::new(MESSAGE_EVENT, data.clone()));
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize message"),
        }

        self.notifications
            .notify(
                recipient_id,
                user_id,
                NotificationKind::Message,
                json!({ "conversationId": conversation_id, "messageId": message.id }),
            )
            .await;

        Ok(message)
    }

    /// End every live stream `user_id` holds.
    pub fn close_streams(&self, user_id: i64) -> usize {
        self.registry.disconnect_user(user_id)
    }

    /// Open a live message stream for `user_id`.
    pub fn subscribe(&self, user_id: i64) -> Subscription {
        self.registry.connect(user_id)
    }

    /// Load a conversation, hiding it from non-participants.
    async fn participant_conversation(
        &self,
        user_id: i64,
        conversation_id: i64,
    ) -> Result<Conversation, AppError> {
        self.db
            .get_conversation(conversation_id)
            .await?
            .filter(|c| c.has_participant(user_id))
            .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))
    }

    async fn to_response(
        &self,
        user_id: i64,
        conversation: Conversation,
    ) -> Result<ConversationResponse, AppError> {
        let other_id = conversation.other_participant(user_id);
        let other = self
            .db
            .get_user(other_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(ConversationResponse {
            id: conversation.id,
            other_user: UserSummary::from(&other),
            created_at: conversation.created_at,
            last_message_at: conversation.last_message_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;

    async fn user(db: &Database, account: &str) -> i64 {
        db.find_or_create_user(&NewUser {
            provider: "kakao".to_string(),
            provider_account_id: account.to_string(),
            email: None,
            name: account.to_string(),
            profile_image: None,
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_send_pushes_to_both_participants() {
        let db = Database::connect_in_memory().await.unwrap();
        let service = ConversationService::new(db.clone(), NotificationService::new(db.clone()));
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;

        let conversation = service.open(alice, bob).await.unwrap();
        assert_eq!(service.open(bob, alice).await.unwrap().id, conversation.id);

        let mut alice_live = service.subscribe(alice);
        let mut bob_live = service.subscribe(bob);

        let message = service.send(alice, conversation.id, "6am tomorrow?").await.unwrap();

        for live in [&mut alice_live, &mut bob_live] {
            let event = live.recv().await.unwrap();
            assert_eq!(event.name, MESSAGE_EVENT);
            assert_eq!(event.data["id"], message.id);
        }

        assert_eq!(db.unread_notification_count(bob).await.unwrap(), 1);
        assert_eq!(db.unread_notification_count(alice).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_outsiders_cannot_read() {
        let db = Database::connect_in_memory().await.unwrap();
        let service = ConversationService::new(db.clone(), NotificationService::new(db.clone()));
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;
        let eve = user(&db, "eve").await;

        let conversation = service.open(alice, bob).await.unwrap();
        let page = PageRequest::first(10);

        assert!(matches!(
            service.messages(eve, conversation.id, &page).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.send(eve, conversation.id, "hi").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.open(alice, alice).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
