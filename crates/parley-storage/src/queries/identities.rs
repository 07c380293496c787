// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity store operations over the `users` table.

use parley_core::{Identity, ParleyError, UserProfile};
use rusqlite::params;

use crate::database::Database;

/// Insert the sender if unknown. Returns `true` when a row was created.
///
/// Known identities are left untouched: reputation, ban flag and the
/// stored profile survive later messages.
pub async fn ensure_registered(db: &Database, profile: &UserProfile) -> Result<bool, ParleyError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO users (tid, first_name, last_name, username)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    profile.id,
                    profile.first_name,
                    profile.last_name,
                    profile.username,
                ],
            )?;
            tx.commit()?;
            Ok(inserted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch an identity by its platform id.
pub async fn get_identity(db: &Database, id: i64) -> Result<Option<Identity>, ParleyError> {
    db.connection()
        .call(move |conn| -> Result<Option<Identity>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT tid, first_name, last_name, username, reputation, ban, registered_at
                 FROM users WHERE tid = ?1",
            )?;
            let result = stmt.query_row(params![id], |row| {
                Ok(Identity {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    username: row.get(3)?,
                    reputation: row.get(4)?,
                    banned: row.get(5)?,
                    registered_at: row.get(6)?,
                })
            });
            match result {
                Ok(identity) => Ok(Some(identity)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Ban flag of a registered identity; `NotFound` if the id is unknown.
pub async fn is_banned(db: &Database, id: i64) -> Result<bool, ParleyError> {
    let flag = db
        .connection()
        .call(move |conn| -> Result<Option<bool>, rusqlite::Error> {
            let result = conn.query_row(
                "SELECT ban FROM users WHERE tid = ?1",
                params![id],
                |row| row.get::<_, bool>(0),
            );
            match result {
                Ok(flag) => Ok(Some(flag)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    flag.ok_or_else(|| ParleyError::NotFound {
        entity: "identity",
        key: id.to_string(),
    })
}

/// Set or clear the ban flag. Returns `false` when no identity matched.
pub async fn set_ban(db: &Database, id: i64, banned: bool) -> Result<bool, ParleyError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let updated = conn.execute(
                "UPDATE users SET ban = ?1 WHERE tid = ?2",
                params![banned, id],
            )?;
            Ok(updated > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All identity ids in registration order.
pub async fn list_identity_ids(db: &Database) -> Result<Vec<i64>, ParleyError> {
    db.connection()
        .call(|conn| -> Result<Vec<i64>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT tid FROM users ORDER BY registered_at, rowid")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<i64>, _>>()?;
            Ok(ids)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
