//! Test fixture creation for the song database

use super::constants::*;
use anyhow::Result;
use chrono::NaiveDate;
use song_library::song_store::{Song, SongStore, SqliteSongStore};
use std::path::PathBuf;
use tempfile::TempDir;

fn wire_date(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value, "%d.%m.%Y")?)
}

fn supermassive_lyrics() -> String {
    [
        SUPERMASSIVE_VERSE_1,
        SUPERMASSIVE_VERSE_2,
        SUPERMASSIVE_VERSE_3,
    ]
    .join("\n\n")
}

fn seeded_songs() -> Result<Vec<Song>> {
    Ok(vec![
        Song {
            artist: MUSE.to_string(),
            title: SUPERMASSIVE.to_string(),
            release_date: Some(wire_date(SUPERMASSIVE_RELEASE_DATE)?),
            lyrics: Some(supermassive_lyrics()),
            link: Some(SUPERMASSIVE_LINK.to_string()),
        },
        Song {
            artist: MUSE.to_string(),
            title: UPRISING.to_string(),
            release_date: Some(wire_date(UPRISING_RELEASE_DATE)?),
            lyrics: None,
            link: None,
        },
        Song {
            artist: QUEEN.to_string(),
            title: BOHEMIAN.to_string(),
            release_date: Some(wire_date(BOHEMIAN_RELEASE_DATE)?),
            lyrics: Some(BOHEMIAN_LYRICS.to_string()),
            link: None,
        },
        Song::new(DAFT_PUNK, ONE_MORE_TIME),
    ])
}

/// Creates a temporary song database, optionally seeded with the songs in
/// `constants.rs`. Returns (temp_dir, db_path).
pub fn create_test_db(seeded: bool) -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("songs.db");

    let store = SqliteSongStore::new(&db_path, 1)?;
    if seeded {
        for song in seeded_songs()? {
            store.add(&song)?;
        }
    }

    Ok((dir, db_path))
}
