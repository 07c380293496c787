// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread link operations over the `thread_links` table.
//!
//! A source message has at most one link; the first recorded link wins.

use std::str::FromStr;

use parley_core::{ChatId, LinkKind, MessageId, MessageRef, ParleyError, ThreadLink};
use rusqlite::params;
use tracing::warn;

use crate::database::Database;

const LINK_COLUMNS: &str =
    "id, from_chat_id, from_message_id, to_chat_id, to_message_id, kind";

fn row_to_link(row: &rusqlite::Row<'_>) -> Result<ThreadLink, rusqlite::Error> {
    let kind: String = row.get(5)?;
    let kind = LinkKind::from_str(&kind).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(ThreadLink {
        id: row.get(0)?,
        source: MessageRef::new(ChatId(row.get(1)?), MessageId(row.get(2)?)),
        destination: MessageRef::new(ChatId(row.get(3)?), MessageId(row.get(4)?)),
        kind,
    })
}

/// Record a link. Returns `false` if the source already had one.
pub async fn record_link(
    db: &Database,
    source: MessageRef,
    destination: MessageRef,
    kind: LinkKind,
) -> Result<bool, ParleyError> {
    let inserted = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO thread_links
                 (from_chat_id, from_message_id, to_chat_id, to_message_id, kind)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    source.chat.0,
                    source.id.0,
                    destination.chat.0,
                    destination.id.0,
                    kind.to_string(),
                ],
            )?;
            tx.commit()?;
            Ok(inserted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if !inserted {
        warn!(
            source_chat = source.chat.0,
            source_message = source.id.0,
            %kind,
            "thread link already recorded for source, keeping the first"
        );
    }
    Ok(inserted)
}

/// Earliest link whose destination is `destination`.
pub async fn find_by_destination(
    db: &Database,
    destination: MessageRef,
) -> Result<Option<ThreadLink>, ParleyError> {
    db.connection()
        .call(move |conn| -> Result<Option<ThreadLink>, rusqlite::Error> {
            let sql = format!(
                "SELECT {LINK_COLUMNS} FROM thread_links
                 WHERE to_chat_id = ?1 AND to_message_id = ?2
                 ORDER BY id ASC LIMIT 1"
            );
            let result = conn.query_row(
                &sql,
                params![destination.chat.0, destination.id.0],
                row_to_link,
            );
            match result {
                Ok(link) => Ok(Some(link)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The link recorded for `source`, if any.
pub async fn find_by_source(
    db: &Database,
    source: MessageRef,
) -> Result<Option<ThreadLink>, ParleyError> {
    db.connection()
        .call(move |conn| -> Result<Option<ThreadLink>, rusqlite::Error> {
            let sql = format!(
                "SELECT {LINK_COLUMNS} FROM thread_links
                 WHERE from_chat_id = ?1 AND from_message_id = ?2"
            );
            let result = conn.query_row(&sql, params![source.chat.0, source.id.0], row_to_link);
            match result {
                Ok(link) => Ok(Some(link)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Source of the message that `destination` is a copy of.
pub async fn resolve_forward(
    db: &Database,
    destination: MessageRef,
) -> Result<Option<MessageRef>, ParleyError> {
    Ok(find_by_destination(db, destination)
        .await?
        .map(|link| link.source))
}

/// Copy made of `source` on the other side of the relay.
pub async fn resolve_reverse(
    db: &Database,
    source: MessageRef,
) -> Result<Option<MessageRef>, ParleyError> {
    Ok(find_by_source(db, source).await?.map(|link| link.destination))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn at(chat: i64, id: i64) -> MessageRef {
        MessageRef::new(ChatId(chat), MessageId(id))
    }

    async fn open(dir: &tempfile::TempDir) -> Database {
        let path = dir.path().join("links.db");
        Database::open(path.to_str().unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn resolves_in_both_directions() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;

        assert!(
            record_link(&db, at(111, 5), at(-100, 42), LinkKind::Request)
                .await
                .unwrap()
        );

        assert_eq!(resolve_forward(&db, at(-100, 42)).await.unwrap(), Some(at(111, 5)));
        assert_eq!(resolve_reverse(&db, at(111, 5)).await.unwrap(), Some(at(-100, 42)));
        assert_eq!(resolve_forward(&db, at(-100, 43)).await.unwrap(), None);
        assert_eq!(resolve_reverse(&db, at(-100, 42)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn first_link_for_a_source_wins() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;

        assert!(
            record_link(&db, at(111, 5), at(-100, 42), LinkKind::Request)
                .await
                .unwrap()
        );
        assert!(
            !record_link(&db, at(111, 5), at(-100, 77), LinkKind::Request)
                .await
                .unwrap()
        );
        assert_eq!(resolve_reverse(&db, at(111, 5)).await.unwrap(), Some(at(-100, 42)));
    }

    #[tokio::test]
    async fn kind_is_persisted() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;

        record_link(&db, at(-100, 43), at(111, 6), LinkKind::Response)
            .await
            .unwrap();
        let link = find_by_source(&db, at(-100, 43)).await.unwrap().unwrap();
        assert_eq!(link.kind, LinkKind::Response);
        assert_eq!(link.destination, at(111, 6));
    }

    #[tokio::test]
    async fn same_message_id_in_different_chats_is_distinct() {
        let dir = tempdir().unwrap();
        let db = open(&dir).await;

        record_link(&db, at(111, 5), at(-100, 42), LinkKind::Request)
            .await
            .unwrap();
        assert!(
            record_link(&db, at(222, 5), at(-100, 44), LinkKind::Request)
                .await
                .unwrap()
        );
        assert_eq!(resolve_forward(&db, at(-100, 44)).await.unwrap(), Some(at(222, 5)));
    }
}
