mod error;
mod filter;
mod models;
mod schema;
mod store;

pub use error::{SongStoreError, SongStoreResult};
pub use filter::{build_where, fold_case, register_fold_case, SqlCondition, FOLD_CASE_FN};
pub use models::*;
pub use schema::SONG_VERSIONED_SCHEMAS;
pub use store::SqliteSongStore;

/// Persistent catalog of songs keyed by `(artist, title)`.
///
/// Key lookups (`get`, `update`, `delete`) are exact and case-sensitive.
/// `list` matches text predicates as case-insensitive substrings.
pub trait SongStore: Send + Sync {
    /// Songs matching `filter`, ordered by artist, title and insertion order,
    /// windowed by `pagination`.
    fn list(&self, filter: &SongFilter, pagination: Pagination) -> SongStoreResult<Vec<Song>>;

    fn get(&self, artist: &str, title: &str) -> SongStoreResult<Song>;

    /// Fails with `AlreadyExists` when the key is taken.
    fn add(&self, song: &Song) -> SongStoreResult<()>;

    /// Overwrites only the fields present in `song`. Fails with `NoChange` when
    /// there is nothing to write, and with `NotFound` when the key is unknown.
    fn update(&self, song: &Song) -> SongStoreResult<()>;

    fn delete(&self, artist: &str, title: &str) -> SongStoreResult<()>;

    fn count(&self) -> SongStoreResult<usize>;
}
