//! Note table access.
//!
//! Every lookup and update is filtered by `owner_id` in SQL.

use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::model::Note;
use crate::{Database, Error};

const NOTE_COLUMNS: &str = "id, title, content, owner_id, created_at, updated_at";

fn note_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        owner_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn find(conn: &rusqlite::Connection, id: &str, owner_id: &str) -> Result<Option<Note>, Error> {
    let sql = format!("SELECT {NOTE_COLUMNS} FROM note WHERE id = ?1 AND owner_id = ?2");
    match conn.query_row(&sql, params![id, owner_id], note_from_row) {
        Ok(note) => Ok(Some(note)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// Get a note by id, visible only to its owner.
    pub async fn note_find(&self, id: &str, owner_id: &str) -> Result<Option<Note>, Error> {
        let id = id.to_string();
        let owner_id = owner_id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Note>, Error> { find(conn, &id, &owner_id) })
            .await
            .map_err(Error::from)
    }

    /// Insert a new note row.
    pub async fn note_insert(&self, note: &Note) -> Result<(), Error> {
        let note = note.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO note (id, title, content, owner_id, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![note.id, note.title, note.content, note.owner_id, note.created_at, note.updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Replace title and content of an owned note.
    ///
    /// Returns the updated row, or None when no note with that id belongs to `owner_id`.
    pub async fn note_update(
        &self, id: &str, owner_id: &str, title: &str, content: &str, updated_at: &str,
    ) -> Result<Option<Note>, Error> {
        let (id, owner_id) = (id.to_string(), owner_id.to_string());
        let (title, content, updated_at) = (title.to_string(), content.to_string(), updated_at.to_string());
        self.conn
            .call(move |conn| -> Result<Option<Note>, Error> {
                let tx = conn.transaction()?;
                let changed = tx.execute(
                    "UPDATE note SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4 AND owner_id = ?5",
                    params![title, content, updated_at, id, owner_id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                let note = find(&tx, &id, &owner_id)?;
                tx.commit()?;
                Ok(note)
            })
            .await
            .map_err(Error::from)
    }

    /// All notes of `owner_id`, most recently updated first.
    pub async fn note_list(&self, owner_id: &str) -> Result<Vec<Note>, Error> {
        let owner_id = owner_id.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<Note>, Error> {
                let sql =
                    format!("SELECT {NOTE_COLUMNS} FROM note WHERE owner_id = ?1 ORDER BY updated_at DESC, id ASC");
                let mut stmt = conn.prepare(&sql)?;
                let notes = stmt
                    .query_map(params![owner_id], note_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await
            .map_err(Error::from)
    }
}
