//! SQLite-backed song store.
//!
//! Writes go through a single connection; reads are spread round-robin over a
//! small pool of read-only connections. The database runs in WAL mode so
//! readers never block on the writer.

use super::error::{SongStoreError, SongStoreResult};
use super::filter::{build_where, register_fold_case};
use super::models::{Pagination, Song, SongFilter};
use super::schema::SONG_VERSIONED_SCHEMAS;
use super::SongStore;
use crate::server::metrics::{adjust_song_count, record_db_error, record_db_query};
use crate::sqlite_persistence::prepare_database;
use anyhow::{anyhow, Context};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, ToSql};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, info};

const SONG_COLUMNS: &str = "artist, title, release_date, lyrics, link";

#[derive(Clone)]
pub struct SqliteSongStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn lock(conn: &Mutex<Connection>) -> SongStoreResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| SongStoreError::Store(anyhow!("song database connection is poisoned")))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl SqliteSongStore {
    /// Opens (creating if needed) the song database at `db_path`, bringing its
    /// schema up to date.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `read_pool_size` - Number of read-only connections (at least 1 is used)
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> anyhow::Result<Self> {
        let db_path = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open song database at {:?}", db_path))?;

        let version = prepare_database(&mut write_conn, SONG_VERSIONED_SCHEMAS, "song")?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        register_fold_case(&write_conn)?;

        let song_count: i64 = write_conn.query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))?;
        info!(
            "Opened song database {:?} (schema v{}): {} songs",
            db_path, version, song_count
        );

        let pool_size = read_pool_size.max(1);
        let mut read_pool = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let read_conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .context("Failed to open read connection to song database")?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            register_fold_case(&read_conn)?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteSongStore {
            read_pool,
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    /// Runs `f`, recording its latency under `operation` and counting store failures.
    fn timed<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce() -> SongStoreResult<T>,
    ) -> SongStoreResult<T> {
        let start = Instant::now();
        let result = f();
        record_db_query(operation, start.elapsed());
        if let Err(SongStoreError::Store(_)) = &result {
            record_db_error(operation);
        }
        result
    }

    fn parse_song_row(row: &rusqlite::Row) -> rusqlite::Result<Song> {
        Ok(Song {
            artist: row.get(0)?,
            title: row.get(1)?,
            release_date: row.get(2)?,
            lyrics: row.get(3)?,
            link: row.get(4)?,
        })
    }
}

impl SongStore for SqliteSongStore {
    fn list(&self, filter: &SongFilter, pagination: Pagination) -> SongStoreResult<Vec<Song>> {
        self.timed("list", || {
            let condition = build_where(filter)?;
            let sql = format!(
                "SELECT {} FROM songs {} ORDER BY artist, title, id LIMIT ? OFFSET ?",
                SONG_COLUMNS, condition.clause
            );
            debug!("Listing songs: {}", sql);

            let limit = i64::try_from(pagination.limit).unwrap_or(i64::MAX);
            let offset = i64::try_from(pagination.offset).unwrap_or(i64::MAX);
            let mut params: Vec<&dyn ToSql> = condition.param_refs();
            params.push(&limit);
            params.push(&offset);

            let read_conn = self.get_read_conn();
            let conn = lock(&read_conn)?;
            let mut stmt = conn.prepare(&sql)?;
            let songs = stmt
                .query_map(params.as_slice(), Self::parse_song_row)?
                .collect::<rusqlite::Result<Vec<Song>>>()?;
            Ok(songs)
        })
    }

    fn get(&self, artist: &str, title: &str) -> SongStoreResult<Song> {
        self.timed("get", || {
            let read_conn = self.get_read_conn();
            let conn = lock(&read_conn)?;
            conn.query_row(
                &format!(
                    "SELECT {} FROM songs WHERE artist = ?1 AND title = ?2",
                    SONG_COLUMNS
                ),
                params![artist, title],
                Self::parse_song_row,
            )
            .optional()?
            .ok_or_else(|| SongStoreError::not_found(artist, title))
        })
    }

    fn add(&self, song: &Song) -> SongStoreResult<()> {
        self.timed("add", || {
            let conn = lock(&self.write_conn)?;
            let inserted = conn.execute(
                "INSERT INTO songs (artist, title, release_date, lyrics, link) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    &song.artist,
                    &song.title,
                    song.release_date,
                    non_empty(&song.lyrics),
                    non_empty(&song.link),
                ],
            );
            match inserted {
                Ok(_) => {
                    adjust_song_count(1);
                    Ok(())
                }
                Err(e) if is_unique_violation(&e) => Err(SongStoreError::AlreadyExists {
                    artist: song.artist.clone(),
                    title: song.title.clone(),
                }),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn update(&self, song: &Song) -> SongStoreResult<()> {
        if !song.has_updatable_fields() {
            return Err(SongStoreError::NoChange);
        }

        self.timed("update", || {
            let lyrics = non_empty(&song.lyrics);
            let link = non_empty(&song.link);

            let mut assignments: Vec<&str> = Vec::new();
            let mut values: Vec<&dyn ToSql> = Vec::new();

            if let Some(release_date) = &song.release_date {
                assignments.push("release_date = ?");
                values.push(release_date);
            }
            if let Some(lyrics) = &lyrics {
                assignments.push("lyrics = ?");
                values.push(lyrics);
            }
            if let Some(link) = &link {
                assignments.push("link = ?");
                values.push(link);
            }
            assignments.push("updated_at = cast(strftime('%s','now') as int)");
            values.push(&song.artist);
            values.push(&song.title);

            let sql = format!(
                "UPDATE songs SET {} WHERE artist = ? AND title = ?",
                assignments.join(", ")
            );

            let conn = lock(&self.write_conn)?;
            let changed = conn.execute(&sql, values.as_slice())?;
            if changed == 0 {
                return Err(SongStoreError::not_found(&song.artist, &song.title));
            }
            Ok(())
        })
    }

    fn delete(&self, artist: &str, title: &str) -> SongStoreResult<()> {
        self.timed("delete", || {
            let conn = lock(&self.write_conn)?;
            let deleted = conn.execute(
                "DELETE FROM songs WHERE artist = ?1 AND title = ?2",
                params![artist, title],
            )?;
            if deleted == 0 {
                return Err(SongStoreError::not_found(artist, title));
            }
            adjust_song_count(-1);
            Ok(())
        })
    }

    fn count(&self) -> SongStoreResult<usize> {
        self.timed("count", || {
            let read_conn = self.get_read_conn();
            let conn = lock(&read_conn)?;
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))?;
            Ok(count as usize)
        })
    }
}
