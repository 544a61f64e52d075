//! SQLite schema definitions for the song library database.

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};
use anyhow::Result;
use rusqlite::Connection;

// =============================================================================
// Version 1 - Songs table
// =============================================================================

const SONGS_TABLE_V1: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        // ISO 8601 calendar date, NULL when unknown
        sqlite_column!("release_date", &SqlType::Text),
        sqlite_column!("lyrics", &SqlType::Text),
        sqlite_column!("link", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated_at", &SqlType::Integer),
    ],
    indices: &[],
    unique_constraints: &[&["artist", "title"]],
};

// =============================================================================
// Version 2 - Lookup indices
// =============================================================================

const SONGS_TABLE_V2: Table = Table {
    name: "songs",
    columns: SONGS_TABLE_V1.columns,
    indices: &[
        ("idx_songs_artist", "artist"),
        ("idx_songs_title", "title"),
        ("idx_songs_release_date", "release_date"),
    ],
    unique_constraints: &[&["artist", "title"]],
};

fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    SONGS_TABLE_V2.create_indices(conn)
}

pub const SONG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[SONGS_TABLE_V1],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[SONGS_TABLE_V2],
        migration: Some(migrate_v1_to_v2),
    },
];
