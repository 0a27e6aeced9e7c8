//! Modelos de Conversation y Message
//!
//! Mensajería comprador/vendedor sobre un anuncio. Una conversación es única
//! por (listing, buyer, seller); los mensajes son append-only y llevan el
//! score de fraude calculado al momento de enviarse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Conversation principal - mapea a la tabla conversations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }
}

/// Message principal - mapea a la tabla messages
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub fraud_score: i32,
    pub flagged: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request para iniciar una conversación sobre un anuncio
#[derive(Debug, Deserialize, Validate)]
pub struct StartConversationRequest {
    pub listing_id: Uuid,

    #[validate(length(min = 1, max = 4000))]
    pub message: String,
}

/// Request para enviar un mensaje
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000))]
    pub body: String,
}

/// Paginación de mensajes
#[derive(Debug, Deserialize)]
pub struct MessagePagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response de mensaje para la API
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    pub flagged: bool,
    pub read_at: Option<String>,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation_id.to_string(),
            sender_id: message.sender_id.to_string(),
            body: message.body,
            flagged: message.flagged,
            read_at: message.read_at.map(|t| t.to_rfc3339()),
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Fila de listado de conversaciones con preview del último mensaje
#[derive(Debug, FromRow)]
pub struct ConversationPreviewRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_message_body: Option<String>,
    pub unread_count: i64,
}

/// Response de conversación para el listado
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub listing_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub last_message: Option<String>,
    pub last_message_at: Option<String>,
    pub unread_count: i64,
    pub created_at: String,
}

impl From<ConversationPreviewRow> for ConversationResponse {
    fn from(row: ConversationPreviewRow) -> Self {
        Self {
            id: row.id.to_string(),
            listing_id: row.listing_id.to_string(),
            buyer_id: row.buyer_id.to_string(),
            seller_id: row.seller_id.to_string(),
            last_message: row.last_message_body,
            last_message_at: row.last_message_at.map(|t| t.to_rfc3339()),
            unread_count: row.unread_count,
            created_at: row.created_at.to_rfc3339(),
        }
    }
}
