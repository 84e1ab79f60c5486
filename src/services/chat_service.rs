// Chat service: message CRUD and conversation history between two users.
// Every operation takes the authenticated caller's id explicitly; nothing in
// here knows how that identity was established.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{message_repo, user_repo};
use crate::error::AppError;
use crate::models::Message;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Case-insensitive; anything other than "desc" sorts ascending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }

    fn is_descending(self) -> bool {
        matches!(self, SortOrder::Descending)
    }
}

/// Knobs for a history query. `before` is an exclusive cutoff defaulting to
/// now; `count` defaults to [`DEFAULT_PAGE_SIZE`].
#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    pub sort: SortOrder,
    pub before: Option<DateTime<Utc>>,
    pub count: Option<i64>,
}

pub struct ChatService {
    pool: PgPool,
}

impl ChatService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new message from the caller to `receiver_id`. The receiver
    /// must exist; nothing is written otherwise.
    pub async fn send_message(
        &self,
        caller: Uuid,
        receiver_id: Uuid,
        content: &str,
    ) -> Result<Message, AppError> {
        let receiver_exists = user_repo::user_exists(&self.pool, receiver_id).await?;
        if !receiver_exists {
            return Err(AppError::BadRequest("Receiver user not found".to_string()));
        }

        let message =
            message_repo::insert_message(&self.pool, caller, receiver_id, content, Utc::now())
                .await?;

        tracing::debug!(message_id = %message.id, sender = %caller, "message stored");
        Ok(message)
    }

    /// Overwrite a message's content. Only the sender may edit; the stored
    /// timestamp is not bumped. Existence is settled before ownership, so an
    /// unknown id is NotFound, never an ownership failure.
    pub async fn edit_message(
        &self,
        caller: Uuid,
        message_id: Uuid,
        content: &str,
    ) -> Result<Message, AppError> {
        let message = message_repo::find_by_id(&self.pool, message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

        if message.sender_id != caller {
            return Err(AppError::Ownership(
                "Unauthorized access - you can only edit messages you sent".to_string(),
            ));
        }

        // The row can vanish between the check and the update; treat that the
        // same as not having found it.
        message_repo::update_content(&self.pool, message_id, content)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))
    }

    /// Permanently delete a message. Only the sender may delete. Same
    /// existence-before-ownership ordering as edit.
    pub async fn delete_message(&self, caller: Uuid, message_id: Uuid) -> Result<(), AppError> {
        let message = message_repo::find_by_id(&self.pool, message_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

        if message.sender_id != caller {
            return Err(AppError::Ownership(
                "Unauthorized access - you can only delete messages you sent".to_string(),
            ));
        }

        let deleted = message_repo::delete_message(&self.pool, message_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Message not found".to_string()));
        }

        tracing::debug!(message_id = %message_id, "message deleted");
        Ok(())
    }

    /// Fetch the conversation between the caller and `receiver_id`: messages
    /// in either direction, strictly older than the cutoff, ordered by
    /// timestamp per `sort`, at most `count` rows.
    pub async fn conversation(
        &self,
        caller: Uuid,
        receiver_id: Uuid,
        options: HistoryOptions,
    ) -> Result<Vec<Message>, AppError> {
        let receiver_exists = user_repo::user_exists(&self.pool, receiver_id).await?;
        if !receiver_exists {
            return Err(AppError::NotFound("Receiver user not found".to_string()));
        }

        let before = options.before.unwrap_or_else(Utc::now);
        // A non-positive count yields an empty page rather than a store fault.
        let count = options.count.unwrap_or(DEFAULT_PAGE_SIZE).max(0);

        let messages = message_repo::conversation(
            &self.pool,
            caller,
            receiver_id,
            before,
            count,
            options.sort.is_descending(),
        )
        .await?;

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_defaults_to_ascending() {
        assert_eq!(SortOrder::parse(None), SortOrder::Ascending);
        assert_eq!(SortOrder::parse(Some("")), SortOrder::Ascending);
        assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Ascending);
        assert_eq!(SortOrder::parse(Some("ascending")), SortOrder::Ascending);
        assert_eq!(SortOrder::parse(Some("garbage")), SortOrder::Ascending);
    }

    #[test]
    fn sort_desc_is_case_insensitive() {
        assert_eq!(SortOrder::parse(Some("desc")), SortOrder::Descending);
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Descending);
        assert_eq!(SortOrder::parse(Some("Desc")), SortOrder::Descending);
        assert_eq!(SortOrder::parse(Some(" desc ")), SortOrder::Descending);
    }

    #[test]
    fn history_options_default_shape() {
        let options = HistoryOptions::default();
        assert_eq!(options.sort, SortOrder::Ascending);
        assert!(options.before.is_none());
        assert!(options.count.is_none());
    }
}
