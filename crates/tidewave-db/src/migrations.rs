use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                username    TEXT PRIMARY KEY COLLATE NOCASE,
                public_id   TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                joined_at   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- One row per tide, so adding a tide never rewrites the others
            CREATE TABLE tides (
                name        TEXT PRIMARY KEY COLLATE NOCASE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- id is the rowid alias: inserting a taken id fails with
            -- SQLITE_CONSTRAINT_PRIMARYKEY
            CREATE TABLE splashes (
                id          INTEGER PRIMARY KEY,
                author      TEXT NOT NULL COLLATE NOCASE,
                body        TEXT NOT NULL,
                tides       TEXT NOT NULL DEFAULT '[]',
                media       TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_splashes_author ON splashes(author);

            CREATE TABLE media_files (
                id              TEXT PRIMARY KEY,
                uploader        TEXT NOT NULL,
                content_type    TEXT NOT NULL,
                size            INTEGER NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO tides (name) VALUES ('general');

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
