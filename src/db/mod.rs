pub mod models;
pub mod queries;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Extension appended to a database name to locate its file.
pub const DB_EXTENSION: &str = "db";

/// Busy timeout used when none is configured.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Could not connect with {path}: {source}")]
    Connection {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Table ChipSeqTable could not be created: {0}")]
    Schema(#[source] rusqlite::Error),
    #[error("Write rejected: {0}")]
    Write(#[source] rusqlite::Error),
    #[error("Read rejected: {0}")]
    Read(#[source] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

pub struct Database {
    pub conn: Connection,
}

/// Resolve `<name>.db`, inside `dir` when one is given.
pub fn db_file_path(name: &str, dir: Option<&Path>) -> PathBuf {
    let file = format!("{name}.{DB_EXTENSION}");
    match dir {
        Some(d) => d.join(file),
        None => PathBuf::from(file),
    }
}

impl Database {
    /// Open (creating if absent) the database called `name`.
    pub fn open(name: &str, dir: Option<&Path>, busy_timeout: Duration) -> Result<Self> {
        Self::open_path(&db_file_path(name, dir), busy_timeout)
    }

    /// Open (creating if absent) the database file at `path`.
    /// Missing parent directories are not created.
    pub fn open_path(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let connect = || -> rusqlite::Result<Connection> {
            let conn = Connection::open(path)?;
            conn.busy_timeout(busy_timeout)?;
            Ok(conn)
        };

        match connect() {
            Ok(conn) => {
                log::info!("Connection established with DB: {}", path.display());
                Ok(Self { conn })
            }
            Err(source) => {
                log::error!(
                    "Could not connect with {}. Make sure the DB name is right: {}",
                    path.display(),
                    source
                );
                Err(DbError::Connection {
                    path: path.display().to_string(),
                    source,
                })
            }
        }
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| DbError::Connection {
            path: ":memory:".to_string(),
            source,
        })?;
        Ok(Self { conn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_db_file_path_appends_extension() {
        assert_eq!(db_file_path("encode", None), PathBuf::from("encode.db"));
        assert_eq!(
            db_file_path("encode", Some(Path::new("/data/tracks"))),
            PathBuf::from("/data/tracks/encode.db")
        );
    }

    #[test]
    fn test_open_creates_file() {
        let dir = TempDir::new().unwrap();
        let expected = dir.path().join("blueprint.db");
        assert!(!expected.exists());

        let db = Database::open("blueprint", Some(dir.path()), DEFAULT_BUSY_TIMEOUT).unwrap();
        db.create_table().unwrap();
        assert!(expected.exists());
    }

    #[test]
    fn test_open_reuses_existing_file() {
        let dir = TempDir::new().unwrap();
        {
            let db = Database::open("reuse", Some(dir.path()), DEFAULT_BUSY_TIMEOUT).unwrap();
            db.create_table().unwrap();
        }
        let db = Database::open("reuse", Some(dir.path()), DEFAULT_BUSY_TIMEOUT).unwrap();
        assert_eq!(db.count_rows().unwrap(), 0);
    }

    #[test]
    fn test_open_missing_directory_is_connection_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no").join("such").join("dir");

        let err = Database::open("tracks", Some(&missing), DEFAULT_BUSY_TIMEOUT)
            .err()
            .expect("open should fail");
        match err {
            DbError::Connection { path, .. } => assert!(path.ends_with("tracks.db")),
            other => panic!("expected connection error, got {other:?}"),
        }
    }
}
