//! Conversion between the JSON/query wire shapes and the internal song model.
//!
//! On the wire a song is `{group, song, release_date, text, link}` with dates
//! written as `DD.MM.YYYY`. Internally dates are `NaiveDate` and optional text
//! fields are `None` rather than empty.

use crate::song_store::{LyricsFilter, Pagination, ReleaseDateFilter, Song, SongFilter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const WIRE_DATE_FORMAT: &str = "%d.%m.%Y";

/// Query value selecting rows whose lyrics or link are present.
pub const NOT_NULL_MARKER: &str = "not_null";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("invalid release_date format: {0}")]
    InvalidFormat(String),

    #[error("missing required parameters: group and song")]
    MissingField,
}

/// Parses a strict `DD.MM.YYYY` date. Unpadded days or months, other
/// separators and impossible dates are rejected.
pub fn parse_wire_date(value: &str) -> Result<NaiveDate, MappingError> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'.',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(MappingError::InvalidFormat(format!(
            "'{}', expected DD.MM.YYYY",
            value
        )));
    }
    NaiveDate::parse_from_str(value, WIRE_DATE_FORMAT)
        .map_err(|_| MappingError::InvalidFormat(format!("'{}' is not a valid date", value)))
}

pub fn format_wire_date(date: &NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn require_key<'a>(
    artist: Option<&'a str>,
    title: Option<&'a str>,
) -> Result<(&'a str, &'a str), MappingError> {
    match (artist, title) {
        (Some(artist), Some(title)) if !artist.trim().is_empty() && !title.trim().is_empty() => {
            Ok((artist, title))
        }
        _ => Err(MappingError::MissingField),
    }
}

/// A song as sent and received over HTTP.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    #[serde(rename = "group", alias = "artist", default)]
    pub artist: String,

    #[serde(rename = "song", alias = "title", default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    #[serde(
        rename = "text",
        alias = "lyrics",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lyrics: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl SongRecord {
    pub fn key(&self) -> Result<(&str, &str), MappingError> {
        require_key(Some(self.artist.as_str()), Some(self.title.as_str()))
    }

    pub fn into_song(self) -> Result<Song, MappingError> {
        self.key()?;
        let release_date = match self.release_date.as_deref() {
            None | Some("") => None,
            Some(date) => Some(parse_wire_date(date)?),
        };
        Ok(Song {
            artist: self.artist,
            title: self.title,
            release_date,
            lyrics: non_empty(self.lyrics),
            link: non_empty(self.link),
        })
    }
}

impl From<Song> for SongRecord {
    fn from(song: Song) -> Self {
        SongRecord {
            artist: song.artist,
            title: song.title,
            release_date: song.release_date.as_ref().map(format_wire_date),
            lyrics: song.lyrics,
            link: song.link,
        }
    }
}

/// Song details without the key, as returned by `/info`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl From<Song> for SongInfo {
    fn from(song: Song) -> Self {
        SongInfo {
            release_date: song.release_date.as_ref().map(format_wire_date),
            text: song.lyrics,
            link: song.link,
        }
    }
}

/// Raw query parameters shared by the song endpoints. Every value is kept as
/// text so that malformed numbers fall back to defaults instead of failing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SongsQuery {
    #[serde(rename = "group", alias = "artist")]
    pub artist: Option<String>,

    #[serde(rename = "song", alias = "title")]
    pub title: Option<String>,

    pub release_date: Option<String>,

    #[serde(alias = "text")]
    pub lyrics: Option<String>,

    pub link: Option<String>,

    pub limit: Option<String>,

    pub offset: Option<String>,
}

impl SongsQuery {
    pub fn key(&self) -> Result<(&str, &str), MappingError> {
        require_key(self.artist.as_deref(), self.title.as_deref())
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_raw(self.limit.as_deref(), self.offset.as_deref())
    }

    pub fn to_filter(&self) -> Result<SongFilter, MappingError> {
        let release_date = match self.release_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(parse_release_date_filter(value)?),
        };

        let lyrics = match self.lyrics.as_deref() {
            None | Some("") => None,
            Some(NOT_NULL_MARKER) => Some(LyricsFilter::NonEmpty),
            Some(needle) => Some(LyricsFilter::Contains(needle.to_string())),
        };

        Ok(SongFilter {
            artist: non_empty(self.artist.clone()),
            title: non_empty(self.title.clone()),
            release_date,
            lyrics,
            link_non_empty: self.link.as_deref() == Some(NOT_NULL_MARKER),
        })
    }
}

/// Parses `DATE` or `DATE,DATE` (inclusive range).
pub fn parse_release_date_filter(value: &str) -> Result<ReleaseDateFilter, MappingError> {
    match value.split_once(',') {
        None => Ok(ReleaseDateFilter::On(parse_wire_date(value.trim())?)),
        Some((from, to)) => {
            let from = parse_wire_date(from.trim())?;
            let to = parse_wire_date(to.trim())?;
            if from > to {
                return Err(MappingError::InvalidFormat(format!(
                    "range start {} is after its end {}",
                    format_wire_date(&from),
                    format_wire_date(&to)
                )));
            }
            Ok(ReleaseDateFilter::Between(from, to))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn wire_date_survives_internal_form() {
        let parsed = parse_wire_date("16.07.2006").unwrap();
        assert_eq!(parsed, date(2006, 7, 16));
        assert_eq!(format_wire_date(&parsed), "16.07.2006");
    }

    #[test]
    fn malformed_wire_dates_are_rejected() {
        for value in [
            "2006-07-16",
            "1.7.2006",
            "01.7.2006",
            "31.02.2006",
            "16/07/2006",
            "16.07.06",
            "",
            "aa.bb.cccc",
        ] {
            assert!(
                matches!(parse_wire_date(value), Err(MappingError::InvalidFormat(_))),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn record_json_uses_wire_names() {
        let record: SongRecord = serde_json::from_str(
            r#"{"group":"Muse","song":"Supermassive Black Hole","release_date":"16.07.2006","text":"Ooh baby","link":"https://x"}"#,
        )
        .unwrap();
        let song = record.clone().into_song().unwrap();
        assert_eq!(song.artist, "Muse");
        assert_eq!(song.release_date, Some(date(2006, 7, 16)));
        assert_eq!(song.lyrics.as_deref(), Some("Ooh baby"));

        let back = SongRecord::from(song);
        assert_eq!(back, record);
        let json = serde_json::to_value(&back).unwrap();
        assert_eq!(json["group"], "Muse");
        assert_eq!(json["text"], "Ooh baby");
    }

    #[test]
    fn record_accepts_canonical_aliases() {
        let record: SongRecord =
            serde_json::from_str(r#"{"artist":"Muse","title":"Uprising","lyrics":"x"}"#).unwrap();
        assert_eq!(record.artist, "Muse");
        assert_eq!(record.title, "Uprising");
        assert_eq!(record.lyrics.as_deref(), Some("x"));
    }

    #[test]
    fn record_without_key_is_missing_field() {
        let record: SongRecord = serde_json::from_str(r#"{"group":"Muse"}"#).unwrap();
        assert_eq!(record.into_song(), Err(MappingError::MissingField));

        let blank = SongRecord {
            artist: "  ".to_string(),
            title: "Uprising".to_string(),
            ..Default::default()
        };
        assert_eq!(blank.into_song(), Err(MappingError::MissingField));
    }

    #[test]
    fn record_empty_optionals_become_absent() {
        let record = SongRecord {
            artist: "Muse".to_string(),
            title: "Uprising".to_string(),
            release_date: Some(String::new()),
            lyrics: Some(String::new()),
            link: Some(String::new()),
        };
        let song = record.into_song().unwrap();
        assert_eq!(song, Song::new("Muse", "Uprising"));

        let json = serde_json::to_value(SongRecord::from(song)).unwrap();
        assert!(json.get("text").is_none());
        assert!(json.get("release_date").is_none());
    }

    #[test]
    fn song_info_omits_absent_fields() {
        let mut song = Song::new("Muse", "Uprising");
        song.link = Some("https://x".to_string());
        let json = serde_json::to_value(SongInfo::from(song)).unwrap();
        assert_eq!(json, serde_json::json!({"link": "https://x"}));
    }

    #[test]
    fn query_builds_filter() {
        let query = SongsQuery {
            artist: Some("Muse".to_string()),
            release_date: Some("01.01.2000,31.12.2010".to_string()),
            lyrics: Some("not_null".to_string()),
            link: Some("not_null".to_string()),
            ..Default::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.artist.as_deref(), Some("Muse"));
        assert_eq!(
            filter.release_date,
            Some(ReleaseDateFilter::Between(date(2000, 1, 1), date(2010, 12, 31)))
        );
        assert_eq!(filter.lyrics, Some(LyricsFilter::NonEmpty));
        assert!(filter.link_non_empty);
    }

    #[test]
    fn query_lyrics_substring_and_link_other_values() {
        let query = SongsQuery {
            lyrics: Some("soul".to_string()),
            link: Some("youtube".to_string()),
            ..Default::default()
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.lyrics, Some(LyricsFilter::Contains("soul".to_string())));
        assert!(!filter.link_non_empty);
    }

    #[test]
    fn query_single_date_and_bad_dates() {
        let single = SongsQuery {
            release_date: Some("16.07.2006".to_string()),
            ..Default::default()
        };
        assert_eq!(
            single.to_filter().unwrap().release_date,
            Some(ReleaseDateFilter::On(date(2006, 7, 16)))
        );

        for bad in ["2006-07-16", "16.07.2006,", "31.12.2010,01.01.2000"] {
            let query = SongsQuery {
                release_date: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(
                matches!(query.to_filter(), Err(MappingError::InvalidFormat(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn query_pagination_and_key() {
        let query: SongsQuery = serde_json::from_value(serde_json::json!({
            "group": "Muse",
            "song": "Uprising",
            "limit": "abc",
            "offset": "4",
            "unknown": "ignored"
        }))
        .unwrap();
        assert_eq!(
            query.pagination(),
            Pagination {
                limit: 10,
                offset: 4
            }
        );
        assert_eq!(query.key().unwrap(), ("Muse", "Uprising"));
        assert_eq!(SongsQuery::default().key(), Err(MappingError::MissingField));
    }
}
