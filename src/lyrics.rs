/// Separator between verses in stored lyrics.
pub const VERSE_DELIMITER: &str = "\n\n";

/// Returns the verses `[offset, offset + limit)` of `lyrics`, joined back with
/// `VERSE_DELIMITER`. An offset past the last verse yields an empty string.
///
/// Any run of blank lines separates verses; verses never start or end with a
/// newline.
pub fn paginate_verses(lyrics: &str, limit: usize, offset: usize) -> String {
    lyrics
        .split(VERSE_DELIMITER)
        .map(|verse| verse.trim_matches('\n'))
        .filter(|verse| !verse.is_empty())
        .skip(offset)
        .take(limit)
        .collect::<Vec<_>>()
        .join(VERSE_DELIMITER)
}
