use crate::dto::common::ApiResponse;
use crate::models::conversation::{
    ConversationResponse, MessagePagination, MessageResponse, SendMessageRequest,
    StartConversationRequest,
};
use crate::repositories::conversation_repository::ConversationRepository;
use crate::repositories::listing_repository::ListingRepository;
use crate::services::fraud_service;
use crate::utils::errors::AppError;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Los primeros mensajes de una conversación se consideran "tempranos"
/// para el scoring de fraude (compartir contacto ahí pesa más)
const EARLY_MESSAGE_THRESHOLD: i64 = 3;

pub struct MessageController {
    conversations: ConversationRepository,
    listings: ListingRepository,
}

impl MessageController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            conversations: ConversationRepository::new(pool.clone()),
            listings: ListingRepository::new(pool),
        }
    }

    /// Iniciar (u obtener) la conversación de un comprador sobre un anuncio
    /// y enviar el primer mensaje
    pub async fn start_conversation(
        &self,
        buyer_id: Uuid,
        request: StartConversationRequest,
    ) -> Result<ApiResponse<MessageResponse>, AppError> {
        request.validate()?;

        let listing = self
            .listings
            .find_by_id(request.listing_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Anuncio no encontrado".to_string()))?;

        if listing.status != "active" {
            return Err(AppError::Conflict(
                "El anuncio ya no está disponible".to_string(),
            ));
        }

        if listing.seller_id == buyer_id {
            return Err(AppError::ValidationError(
                "No puedes iniciar una conversación sobre tu propio anuncio".to_string(),
            ));
        }

        let conversation = self
            .conversations
            .find_or_create(listing.id, buyer_id, listing.seller_id)
            .await?;

        let message = self
            .store_message(conversation.id, buyer_id, &request.message)
            .await?;

        Ok(ApiResponse::success_with_message(
            message,
            "Conversación iniciada".to_string(),
        ))
    }

    /// Enviar un mensaje en una conversación existente
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        conversation_id: Uuid,
        request: SendMessageRequest,
    ) -> Result<MessageResponse, AppError> {
        request.validate()?;

        let conversation = self
            .conversations
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conversación no encontrada".to_string()))?;

        if !conversation.is_participant(sender_id) {
            return Err(AppError::Forbidden(
                "No participas de esta conversación".to_string(),
            ));
        }

        self.store_message(conversation_id, sender_id, &request.body)
            .await
    }

    /// Scoring de fraude + inserción. Los mensajes marcados se guardan
    /// igual: moderación, no bloqueo.
    async fn store_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) -> Result<MessageResponse, AppError> {
        let message_count = self.conversations.count_messages(conversation_id).await?;
        let is_early = message_count < EARLY_MESSAGE_THRESHOLD;

        let assessment = fraud_service::score_message(body, is_early);

        let message = self
            .conversations
            .insert_message(
                conversation_id,
                sender_id,
                body,
                assessment.score as i32,
                assessment.flagged,
            )
            .await?;

        Ok(MessageResponse::from(message))
    }

    pub async fn list_conversations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConversationResponse>, AppError> {
        let rows = self.conversations.list_for_user(user_id).await?;
        Ok(rows.into_iter().map(ConversationResponse::from).collect())
    }

    /// Listar mensajes y marcar como leídos los del otro participante
    pub async fn list_messages(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        pagination: MessagePagination,
    ) -> Result<Vec<MessageResponse>, AppError> {
        let conversation = self
            .conversations
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Conversación no encontrada".to_string()))?;

        if !conversation.is_participant(user_id) {
            return Err(AppError::Forbidden(
                "No participas de esta conversación".to_string(),
            ));
        }

        let limit = pagination.limit.unwrap_or(50).clamp(1, 200);
        let offset = pagination.offset.unwrap_or(0).max(0);

        self.conversations
            .mark_read(conversation_id, user_id)
            .await?;

        let messages = self
            .conversations
            .list_messages(conversation_id, limit, offset)
            .await?;

        Ok(messages.into_iter().map(MessageResponse::from).collect())
    }
}
