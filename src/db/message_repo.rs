/// Message repository - all database operations for direct messages
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Message;

pub async fn insert_message(
    pool: &PgPool,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: &str,
    timestamp: DateTime<Utc>,
) -> Result<Message, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (id, sender_id, receiver_id, content, timestamp)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, sender_id, receiver_id, content, timestamp
        "#,
    )
    .bind(id)
    .bind(sender_id)
    .bind(receiver_id)
    .bind(content)
    .bind(timestamp)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, receiver_id, content, timestamp
        FROM messages
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Overwrite a message's content. The stored timestamp is left untouched;
/// edits do not bump it. Returns None when the row no longer exists.
pub async fn update_content(
    pool: &PgPool,
    id: Uuid,
    content: &str,
) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        UPDATE messages
        SET content = $1
        WHERE id = $2
        RETURNING id, sender_id, receiver_id, content, timestamp
        "#,
    )
    .bind(content)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Permanently remove a message. Returns the number of rows deleted.
pub async fn delete_message(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM messages
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Fetch the bidirectional conversation between two users: messages sent in
/// either direction, strictly older than `before`, limited to `count` rows.
/// The direction of ORDER BY cannot be bound as a parameter, hence the two
/// query strings.
pub async fn conversation(
    pool: &PgPool,
    user_a: Uuid,
    user_b: Uuid,
    before: DateTime<Utc>,
    count: i64,
    descending: bool,
) -> Result<Vec<Message>, sqlx::Error> {
    let query = if descending {
        r#"
        SELECT id, sender_id, receiver_id, content, timestamp
        FROM messages
        WHERE ((sender_id = $1 AND receiver_id = $2)
            OR (sender_id = $2 AND receiver_id = $1))
          AND timestamp < $3
        ORDER BY timestamp DESC
        LIMIT $4
        "#
    } else {
        r#"
        SELECT id, sender_id, receiver_id, content, timestamp
        FROM messages
        WHERE ((sender_id = $1 AND receiver_id = $2)
            OR (sender_id = $2 AND receiver_id = $1))
          AND timestamp < $3
        ORDER BY timestamp ASC
        LIMIT $4
        "#
    };

    sqlx::query_as::<_, Message>(query)
        .bind(user_a)
        .bind(user_b)
        .bind(before)
        .bind(count)
        .fetch_all(pool)
        .await
}
