use crate::models::conversation::{Conversation, ConversationPreviewRow, Message};
use crate::utils::errors::AppError;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Obtener o crear la conversación del triple (listing, buyer, seller).
    /// El upsert garantiza unicidad sin carrera check-then-insert.
    pub async fn find_or_create(
        &self,
        listing_id: Uuid,
        buyer_id: Uuid,
        seller_id: Uuid,
    ) -> Result<Conversation, AppError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (id, listing_id, buyer_id, seller_id, created_at, last_message_at)
            VALUES ($1, $2, $3, $4, $5, NULL)
            ON CONFLICT (listing_id, buyer_id, seller_id)
            DO UPDATE SET listing_id = EXCLUDED.listing_id
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(buyer_id)
        .bind(seller_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error creating conversation: {}", e)))?;

        Ok(conversation)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, AppError> {
        let conversation =
            sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Error finding conversation: {}", e)))?;

        Ok(conversation)
    }

    /// Conversaciones del usuario con preview del último mensaje y
    /// cantidad de mensajes sin leer
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConversationPreviewRow>, AppError> {
        let rows = sqlx::query_as::<_, ConversationPreviewRow>(
            r#"
            SELECT c.id, c.listing_id, c.buyer_id, c.seller_id, c.created_at, c.last_message_at,
                   m.body AS last_message_body,
                   (SELECT COUNT(*) FROM messages um
                     WHERE um.conversation_id = c.id
                       AND um.sender_id <> $1
                       AND um.read_at IS NULL) AS unread_count
            FROM conversations c
            LEFT JOIN LATERAL (
                SELECT body FROM messages
                WHERE conversation_id = c.id
                ORDER BY created_at DESC
                LIMIT 1
            ) m ON true
            WHERE c.buyer_id = $1 OR c.seller_id = $1
            ORDER BY c.last_message_at DESC NULLS LAST
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing conversations: {}", e)))?;

        Ok(rows)
    }

    pub async fn insert_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        body: &str,
        fraud_score: i32,
        flagged: bool,
    ) -> Result<Message, AppError> {
        let now = Utc::now();

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, body, fraud_score, flagged, read_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NULL, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(sender_id)
        .bind(body)
        .bind(fraud_score)
        .bind(flagged)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error inserting message: {}", e)))?;

        sqlx::query("UPDATE conversations SET last_message_at = $2 WHERE id = $1")
            .bind(conversation_id)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Error updating conversation: {}", e)))?;

        Ok(message)
    }

    pub async fn list_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error listing messages: {}", e)))?;

        Ok(messages)
    }

    /// Marcar como leídos los mensajes del otro participante
    pub async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE messages
            SET read_at = $3
            WHERE conversation_id = $1 AND sender_id <> $2 AND read_at IS NULL
            "#,
        )
        .bind(conversation_id)
        .bind(reader_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Error marking messages read: {}", e)))?;

        Ok(())
    }

    /// Cantidad de mensajes de la conversación (para el scoring de fraude:
    /// los primeros mensajes pesan distinto)
    pub async fn count_messages(&self, conversation_id: Uuid) -> Result<i64, AppError> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Error counting messages: {}", e)))?;

        Ok(result.0)
    }
}
