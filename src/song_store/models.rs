use chrono::NaiveDate;

/// Limit used when the caller gives none, or one that is not positive.
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    pub artist: String,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub lyrics: Option<String>,
    pub link: Option<String>,
}

impl Song {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Song {
            artist: artist.into(),
            title: title.into(),
            release_date: None,
            lyrics: None,
            link: None,
        }
    }

    /// Whether any field that an update may overwrite is present.
    pub fn has_updatable_fields(&self) -> bool {
        self.release_date.is_some()
            || self.lyrics.as_deref().is_some_and(|s| !s.is_empty())
            || self.link.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseDateFilter {
    On(NaiveDate),
    /// Inclusive on both ends.
    Between(NaiveDate, NaiveDate),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LyricsFilter {
    NonEmpty,
    Contains(String),
}

/// Predicates applied by `SongStore::list`. All present predicates must hold.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub release_date: Option<ReleaseDateFilter>,
    pub lyrics: Option<LyricsFilter>,
    pub link_non_empty: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Builds a window from raw query values. A limit that does not parse or is
    /// not positive becomes `DEFAULT_LIMIT`; an offset that does not parse or is
    /// negative becomes 0.
    pub fn from_raw(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = limit
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .map(|l| l as usize)
            .unwrap_or(DEFAULT_LIMIT);
        let offset = offset
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|o| *o >= 0)
            .map(|o| o as usize)
            .unwrap_or(0);
        Pagination { limit, offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_from_raw_uses_defaults_for_garbage() {
        assert_eq!(Pagination::from_raw(None, None), Pagination::default());
        assert_eq!(
            Pagination::from_raw(Some("abc"), Some("xyz")),
            Pagination {
                limit: 10,
                offset: 0
            }
        );
        assert_eq!(
            Pagination::from_raw(Some("0"), Some("-3")),
            Pagination {
                limit: 10,
                offset: 0
            }
        );
        assert_eq!(Pagination::from_raw(Some("-5"), None).limit, 10);
    }

    #[test]
    fn pagination_from_raw_keeps_valid_values() {
        assert_eq!(
            Pagination::from_raw(Some("3"), Some("7")),
            Pagination {
                limit: 3,
                offset: 7
            }
        );
        assert_eq!(Pagination::from_raw(Some("1"), Some("0")).offset, 0);
    }

    #[test]
    fn updatable_fields_ignore_empty_strings() {
        let mut song = Song::new("Muse", "Uprising");
        assert!(!song.has_updatable_fields());

        song.lyrics = Some(String::new());
        song.link = Some(String::new());
        assert!(!song.has_updatable_fields());

        song.link = Some("https://example.com".to_string());
        assert!(song.has_updatable_fields());

        let mut dated = Song::new("Muse", "Uprising");
        dated.release_date = NaiveDate::from_ymd_opt(2009, 9, 7);
        assert!(dated.has_updatable_fields());
    }
}
