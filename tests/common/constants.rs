//! Shared constants for end-to-end tests
//!
//! When the seeded library changes, update only this file and `fixtures.rs`.

// ============================================================================
// Seeded Artists
// ============================================================================

pub const MUSE: &str = "Muse";
pub const QUEEN: &str = "Queen";
pub const DAFT_PUNK: &str = "Daft Punk";

// ============================================================================
// Seeded Songs
// ============================================================================

/// Muse, released 16.07.2006, three verses of lyrics and a link
pub const SUPERMASSIVE: &str = "Supermassive Black Hole";
pub const SUPERMASSIVE_RELEASE_DATE: &str = "16.07.2006";
pub const SUPERMASSIVE_LINK: &str = "https://www.youtube.com/watch?v=Xsp3_a-PMTw";
pub const SUPERMASSIVE_VERSE_1: &str =
    "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?";
pub const SUPERMASSIVE_VERSE_2: &str = "Ooh\nYou set my soul alight";
pub const SUPERMASSIVE_VERSE_3: &str = "Glaciers melting in the dead of night";

/// Muse, released 07.09.2009, no lyrics, no link
pub const UPRISING: &str = "Uprising";
pub const UPRISING_RELEASE_DATE: &str = "07.09.2009";

/// Queen, released 31.10.1975, lyrics without link
pub const BOHEMIAN: &str = "Bohemian Rhapsody";
pub const BOHEMIAN_RELEASE_DATE: &str = "31.10.1975";
pub const BOHEMIAN_LYRICS: &str = "Is this the real life?\nIs this just fantasy?";

/// Daft Punk, no release date, lyrics or link
pub const ONE_MORE_TIME: &str = "One More Time";

pub const SEEDED_SONG_COUNT: usize = 4;

// ============================================================================
// Timing
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness checks (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 25;

/// Default timeout for HTTP requests in tests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
