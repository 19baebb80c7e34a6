use crate::Database;
use crate::models::{MediaFileRow, SplashRow, TideRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, ffi};
use tidewave_core::InsertOutcome;
use tidewave_types::models::Splash;

impl Database {
    // -- Users --

    /// Returns false when the username (case-insensitive) is already taken.
    pub fn create_user(&self, username: &str, public_id: &str, password_hash: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO users (username, public_id, password, joined_at)
                 VALUES (?1, ?2, ?3, ?4)",
                (username, public_id, password_hash, chrono::Utc::now().to_rfc3339()),
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(conn, "SELECT username, public_id, password, joined_at FROM users WHERE username = ?1", username)
        })
    }

    pub fn get_user_by_public_id(&self, public_id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            query_user(conn, "SELECT username, public_id, password, joined_at FROM users WHERE public_id = ?1", public_id)
        })
    }

    /// Users sorted alphabetically, ignoring case.
    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT username, public_id, password, joined_at FROM users ORDER BY username COLLATE NOCASE",
            )?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Store a fresh password hash and public id after a successful login.
    pub fn rotate_credentials(&self, username: &str, password_hash: &str, public_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET password = ?1, public_id = ?2 WHERE username = ?3",
                (password_hash, public_id, username),
            )?;
            Ok(())
        })
    }

    // -- Tides --

    pub fn list_tides(&self) -> Result<Vec<TideRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT name, created_at FROM tides ORDER BY name")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(TideRow {
                        name: row.get(0)?,
                        created_at: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Single-statement append. Returns false when the tide already exists.
    pub fn add_tide(&self, name: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute("INSERT OR IGNORE INTO tides (name) VALUES (?1)", [name])?;
            Ok(inserted == 1)
        })
    }

    pub fn tide_exists(&self, name: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM tides WHERE name = ?1", [name], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }

    // -- Splashes --

    pub fn count_splashes(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM splashes", [], |r| r.get(0))?))
    }

    pub fn splash_id_taken(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM splashes WHERE id = ?1", [id], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Insert under `splash.id`. A primary key collision is reported as
    /// [`InsertOutcome::IdTaken`], any other failure as an error.
    pub fn insert_splash(&self, splash: &Splash) -> Result<InsertOutcome<()>> {
        let tides = serde_json::to_string(&splash.tides)?;
        let media = splash.media.as_ref().map(serde_json::to_string).transpose()?;

        self.with_conn_mut(|conn| {
            let result = conn.execute(
                "INSERT INTO splashes (id, author, body, tides, media, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    splash.id,
                    splash.author,
                    splash.body,
                    tides,
                    media,
                    splash.created_at.to_rfc3339()
                ],
            );
            match result {
                Ok(_) => Ok(InsertOutcome::Inserted(())),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation
                        && e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                {
                    Ok(InsertOutcome::IdTaken)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Every splash, in storage order. Feed ordering is applied by the caller.
    pub fn list_splashes(&self) -> Result<Vec<SplashRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, author, body, tides, media, created_at FROM splashes")?;
            let rows = stmt
                .query_map([], splash_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_splash(&self, id: i64) -> Result<Option<SplashRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, author, body, tides, media, created_at FROM splashes WHERE id = ?1",
                    [id],
                    splash_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Media files --

    /// Files are content-addressed, so re-uploading the same bytes is a no-op.
    pub fn insert_media_file(&self, id: &str, uploader: &str, content_type: &str, size: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO media_files (id, uploader, content_type, size) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, uploader, content_type, size],
            )?;
            Ok(())
        })
    }

    pub fn get_media_file(&self, id: &str) -> Result<Option<MediaFileRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, uploader, content_type, size, created_at FROM media_files WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(MediaFileRow {
                            id: row.get(0)?,
                            uploader: row.get(1)?,
                            content_type: row.get(2)?,
                            size: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }
}

fn query_user(conn: &Connection, sql: &str, key: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let row = stmt.query_row([key], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        username: row.get(0)?,
        public_id: row.get(1)?,
        password: row.get(2)?,
        joined_at: row.get(3)?,
    })
}

fn splash_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SplashRow> {
    Ok(SplashRow {
        id: row.get(0)?,
        author: row.get(1)?,
        body: row.get(2)?,
        tides: row.get(3)?,
        media: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
